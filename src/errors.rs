//! Error kinds for the codec, the assembly engine and the transport surface.
use thiserror::Error;

/// Errors raised while decoding a binary PDU.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PduError {
    #[error("PDU too short at {at}: need {need} byte(s), have {have}")]
    TooShort {
        need: usize,
        have: usize,
        at: &'static str,
    },
    #[error("unknown TP-MTI value {0:#04x}")]
    UnknownType(u8),
    #[error("malformed field {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },
    #[error("character could not be mapped under the active charset policy")]
    Charset,
    #[error("text cannot be encoded under the requested scheme: {reason}")]
    EncodeUnsupported { reason: String },
    #[error("invalid address: {0}")]
    InvalidAddress(&'static str),
    #[error("invalid parameter {what}")]
    InvalidParameter { what: &'static str },
}

/// Errors raised while folding a part into an in-progress or complete message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("part already held at storage {storage:?} index {index}")]
    Duplicate { storage: crate::transport::Storage, index: u32 },
    #[error("concat sequence {sequence} already occupied for this multipart message")]
    SlotOccupied { sequence: u8 },
    #[error("no unused local multipart reference available for this destination")]
    NoReferenceAvailable,
}

/// Errors surfaced by the transport trait.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport operation timed out")]
    Timeout,
    #[error("operation not supported by this transport")]
    NotSupported,
    #[error("modem refused the operation (code {0})")]
    Refused(u32),
    #[error("modem returned a malformed reply")]
    Malformed,
}

/// The store/send/delete state machines aggregate per-part transport
/// failures rather than failing on the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageOpError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{failed} of {total} part(s) failed to delete")]
    PartialDelete { failed: usize, total: usize },
}

/// Top-level error, wrapping every layer so callers that don't care about
/// provenance can use a single `Result<T, SmsError>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    #[error(transparent)]
    Pdu(#[from] PduError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    StorageOp(#[from] StorageOpError),
}

pub type SmsResult<T> = Result<T, SmsError>;
