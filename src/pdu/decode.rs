use super::udh::UserDataHeader;
use super::{decode_dcs, Encoding, PduType, SmsPart};
use crate::address::{decode_address, LengthConvention};
use crate::charset::{gsm_to_utf8, gsm_unpack, utf16be_to_utf8, CharsetPolicy};
use crate::errors::PduError;
use crate::timestamp::{decode_timestamp, relative_to_validity};

fn need(buf: &[u8], at: usize, n: usize, field: &'static str) -> Result<(), PduError> {
    if buf.len() < at + n {
        return Err(PduError::TooShort { need: at + n, have: buf.len(), at: field });
    }
    Ok(())
}

fn read_timestamp(buf: &[u8], offset: usize, field: &'static str) -> Result<([u8; 7], usize), PduError> {
    need(buf, offset, 7, field)?;
    let mut bytes = [0u8; 7];
    bytes.copy_from_slice(&buf[offset..offset + 7]);
    Ok((bytes, offset + 7))
}

/// Decode a binary SMS TPDU. `pdu` is the complete PDU including the
/// leading SMSC length byte, as delivered by the modem.
pub fn decode_pdu(pdu: &[u8]) -> Result<SmsPart, PduError> {
    // --- SMSC ---
    need(pdu, 0, 1, "smsc length")?;
    let smsc_len = pdu[0] as usize;
    let (smsc, mut offset) = if smsc_len > 0 {
        need(pdu, 1, smsc_len, "smsc")?;
        let (addr, _) = decode_address(&pdu[1..], LengthConvention::OctetCount)?;
        (Some(addr), 1 + smsc_len)
    } else {
        (None, 1)
    };

    // --- first TPDU octet ---
    need(pdu, offset, 1, "first octet")?;
    let first = pdu[offset];
    offset += 1;
    let mti = first & 0x03;
    let udhi = first & 0x40 != 0;
    let vpf = (first >> 3) & 0x03;

    let pdu_type = match mti {
        0 => PduType::Deliver,
        1 => PduType::Submit,
        2 => PduType::StatusReport,
        _ => return Err(PduError::UnknownType(first)),
    };

    let mut part = SmsPart::new_submit();
    part.pdu_type = pdu_type;
    part.smsc = smsc;
    part.delivery_report_request = first & 0x20 != 0;

    if let PduType::Submit | PduType::StatusReport = pdu_type {
        need(pdu, offset, 1, "message reference")?;
        part.message_reference = pdu[offset];
        offset += 1;
    }

    // --- address ---
    need(pdu, offset, 1, "address")?;
    let (addr, consumed) = decode_address(&pdu[offset..], LengthConvention::DigitCount)?;
    part.number = Some(addr);
    offset += consumed;

    match pdu_type {
        PduType::Deliver => {
            // --- TP-PID, TP-DCS, timestamp ---
            need(pdu, offset, 2, "pid/dcs")?;
            offset += 1; // TP-PID, validated implicitly, not surfaced
            let dcs = pdu[offset];
            offset += 1;
            let (encoding, class) = decode_dcs(dcs);
            part.encoding = encoding;
            part.class = class;

            let (ts, new_offset) = read_timestamp(pdu, offset, "timestamp")?;
            part.timestamp = Some(decode_timestamp(&ts)?);
            offset = new_offset;
        }
        PduType::Submit => {
            need(pdu, offset, 2, "pid/dcs")?;
            offset += 1; // TP-PID
            let dcs = pdu[offset];
            offset += 1;
            let (encoding, class) = decode_dcs(dcs);
            part.encoding = encoding;
            part.class = class;

            match vpf {
                0b10 => {
                    need(pdu, offset, 1, "validity period")?;
                    part.validity_relative = relative_to_validity(pdu[offset]);
                    offset += 1;
                }
                0b01 | 0b11 => {
                    // enhanced / absolute validity: 7 bytes, not modelled further
                    need(pdu, offset, 7, "validity period")?;
                    offset += 7;
                }
                _ => {}
            }
        }
        PduType::StatusReport => {
            let (ts, new_offset) = read_timestamp(pdu, offset, "timestamp")?;
            part.timestamp = Some(decode_timestamp(&ts)?);
            offset = new_offset;

            let (disc, new_offset) = read_timestamp(pdu, offset, "discharge timestamp")?;
            part.discharge_timestamp = Some(decode_timestamp(&disc)?);
            offset = new_offset;

            need(pdu, offset, 1, "delivery status")?;
            part.delivery_state = pdu[offset];
            offset += 1;

            // optional TP-PI byte: bit0 = PID present, bit1 = DCS present, bit2 = UDL/UD present
            if offset < pdu.len() {
                let pi = pdu[offset];
                offset += 1;
                if pi & 0x01 != 0 {
                    need(pdu, offset, 1, "optional pid")?;
                    offset += 1;
                }
                if pi & 0x02 != 0 {
                    need(pdu, offset, 1, "optional dcs")?;
                    let dcs = pdu[offset];
                    offset += 1;
                    let (encoding, class) = decode_dcs(dcs);
                    part.encoding = encoding;
                    part.class = class;
                }
                if pi & 0x04 != 0 {
                    need(pdu, offset, 1, "optional udl")?;
                    let udl = pdu[offset] as usize;
                    offset += 1;
                    decode_user_data(pdu, offset, udl, udhi, &mut part)?;
                }
            }
            return Ok(part);
        }
        _ => unreachable!("mti range already validated"),
    }

    // --- TP-UDL + TP-UD, common to DELIVER/SUBMIT ---
    need(pdu, offset, 1, "user data length")?;
    let udl = pdu[offset] as usize;
    offset += 1;
    decode_user_data(pdu, offset, udl, udhi, &mut part)?;

    Ok(part)
}

/// Parse the UDH (if present) and the user-data body starting at `offset`.
/// `udl` is in septets for GSM-7, octets otherwise.
fn decode_user_data(
    pdu: &[u8],
    offset: usize,
    udl: usize,
    udhi: bool,
    part: &mut SmsPart,
) -> Result<(), PduError> {
    let mut body_offset = offset;
    let mut reduced_septets = udl;
    let mut bit_offset: u8 = 0;
    let mut udh_octets = 0usize;

    if udhi {
        need(pdu, offset, 1, "udh length")?;
        let udhl = pdu[offset] as usize;
        need(pdu, offset + 1, udhl, "udh")?;
        let udh = UserDataHeader::parse(&pdu[offset + 1..offset + 1 + udhl])?;
        if let Some(concat) = udh.concatenated_sms_data()? {
            part.should_concat = true;
            part.concat_reference = concat.reference;
            part.concat_max = concat.parts;
            part.concat_sequence = concat.sequence;
        }
        udh_octets = 1 + udhl;
        body_offset = offset + udh_octets;

        if part.encoding == Encoding::Gsm7 {
            bit_offset = (7 - ((udh_octets * 8) % 7)) % 7;
            let udh_septets = ((udh_octets * 8) + bit_offset as usize) / 7;
            reduced_septets = udl.saturating_sub(udh_septets);
        }
    }

    match part.encoding {
        Encoding::Gsm7 => {
            let septet_count = reduced_septets;
            let available = pdu.len().saturating_sub(body_offset);
            let max_septets = (available * 8).saturating_sub(bit_offset as usize) / 7;
            let septet_count = septet_count.min(max_septets);
            let septets = gsm_unpack(&pdu[body_offset..], septet_count, bit_offset);
            part.text = Some(gsm_to_utf8(&septets, CharsetPolicy::Replace)?);
        }
        Encoding::Ucs2 => {
            let data_len = udl.saturating_sub(udh_octets);
            need(pdu, body_offset, data_len, "user data")?;
            part.text = Some(utf16be_to_utf8(&pdu[body_offset..body_offset + data_len])?);
        }
        Encoding::EightBit | Encoding::Unknown => {
            let data_len = udl.saturating_sub(udh_octets);
            need(pdu, body_offset, data_len, "user data")?;
            part.data = Some(pdu[body_offset..body_offset + data_len].to_vec());
        }
    }

    Ok(())
}
