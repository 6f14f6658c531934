//! SMS PDU data model, decoder and encoder (3GPP TS 23.040).
mod decode;
mod encode;
pub mod udh;

pub use decode::decode_pdu;
pub use encode::encode_submit_pdu;

use crate::address::Address;

/// TP-MTI plus the CDMA family tags (decode-only range validation; CDMA
/// payload parsing itself is out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, is_enum_variant)]
pub enum PduType {
    Deliver,
    Submit,
    StatusReport,
    CdmaDeliver,
    CdmaSubmit,
    CdmaCancellation,
    CdmaDeliveryAcknowledgement,
    CdmaUserAcknowledgement,
    CdmaReadAcknowledgement,
    Unknown,
}

impl PduType {
    /// `true` for any of the five CDMA tags (range-check only; CDMA
    /// payload decode stays out of scope).
    pub fn is_cdma(self) -> bool {
        matches!(
            self,
            PduType::CdmaDeliver
                | PduType::CdmaSubmit
                | PduType::CdmaCancellation
                | PduType::CdmaDeliveryAcknowledgement
                | PduType::CdmaUserAcknowledgement
                | PduType::CdmaReadAcknowledgement
        )
    }
}

/// TP-DCS-derived character scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gsm7,
    Ucs2,
    EightBit,
    Unknown,
}

/// A single decoded or to-be-encoded SMS PDU.
#[derive(Debug, Clone)]
pub struct SmsPart {
    pub pdu_type: PduType,
    pub storage_index: Option<u32>,
    pub smsc: Option<Address>,
    pub number: Option<Address>,
    pub timestamp: Option<String>,
    pub discharge_timestamp: Option<String>,
    pub encoding: Encoding,
    pub text: Option<String>,
    pub data: Option<Vec<u8>>,
    /// -1 means absent.
    pub class: i8,
    /// 0 means absent.
    pub validity_relative: u32,
    pub delivery_report_request: bool,
    pub delivery_state: u8,
    pub message_reference: u8,
    pub concat_reference: u16,
    pub concat_max: u8,
    pub concat_sequence: u8,
    pub should_concat: bool,
}

impl SmsPart {
    /// A blank SUBMIT part ready to have its destination/text filled in.
    pub fn new_submit() -> SmsPart {
        SmsPart {
            pdu_type: PduType::Submit,
            storage_index: None,
            smsc: None,
            number: None,
            timestamp: None,
            discharge_timestamp: None,
            encoding: Encoding::Gsm7,
            text: None,
            data: None,
            class: -1,
            validity_relative: 0,
            delivery_report_request: false,
            delivery_state: 0,
            message_reference: 0,
            concat_reference: 0,
            concat_max: 0,
            concat_sequence: 0,
            should_concat: false,
        }
    }
}

pub(crate) fn decode_dcs(dcs: u8) -> (Encoding, i8) {
    let group = (dcs >> 4) & 0x0F;
    match group {
        0x0..=0x3 => {
            let encoding = match dcs & 0x0C {
                0x08 => Encoding::Ucs2,
                0x04 => Encoding::EightBit,
                _ => Encoding::Gsm7,
            };
            let class = if dcs & 0x10 != 0 { (dcs & 0x03) as i8 } else { -1 };
            (encoding, class)
        }
        0xC | 0xD => (Encoding::Gsm7, -1),
        0xE => (Encoding::Ucs2, -1),
        0xF => {
            let encoding = if dcs & 0x04 != 0 { Encoding::EightBit } else { Encoding::Gsm7 };
            (encoding, (dcs & 0x03) as i8)
        }
        _ => (Encoding::Gsm7, -1),
    }
}
