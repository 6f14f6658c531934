#[macro_use] extern crate derive_is_enum_variant;

pub mod address;
pub mod charset;
pub mod config;
pub mod errors;
pub mod part;
pub mod pdu;
pub mod sms;
pub mod timestamp;
pub mod transport;

pub use config::Config;
pub use errors::{SmsError, SmsResult};
pub use pdu::{decode_pdu, encode_submit_pdu, SmsPart};
pub use sms::{Sms, SmsEvent, SmsList};
pub use transport::{Storage, StorageGuard, Transport};
