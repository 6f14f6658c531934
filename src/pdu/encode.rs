use super::udh::UserDataHeader;
use super::{Encoding, PduType, SmsPart};
use crate::address::{encode_address, Address, LengthConvention};
use crate::charset::{gsm_pack, utf8_to_gsm, utf8_to_utf16be};
use crate::errors::PduError;
use crate::timestamp::validity_to_relative;

/// Encode a SUBMIT `SmsPart` into wire bytes. Returns `(pdu, tpdu_start)`
/// where `tpdu_start` is the offset of the first TPDU byte, letting a
/// transport submit only the TPDU when it reports SMSC length separately.
pub fn encode_submit_pdu(part: &SmsPart) -> Result<(Vec<u8>, usize), PduError> {
    if part.pdu_type != PduType::Submit {
        return Err(PduError::InvalidParameter { what: "encode_submit_pdu requires pdu_type == Submit" });
    }
    let number = part
        .number
        .as_ref()
        .ok_or(PduError::InvalidParameter { what: "submit part has no destination number" })?;

    let mut pdu = Vec::with_capacity(160);

    // --- SMSC ---
    match &part.smsc {
        Some(addr) => pdu.extend(encode_address(addr, LengthConvention::OctetCount)?),
        None => pdu.push(0x00),
    }
    let tpdu_start = pdu.len();

    // --- first TPDU byte ---
    let mut first = 0x01u8; // TP-MTI = SUBMIT
    if part.validity_relative > 0 {
        first |= 0x10;
    }
    let is_last_or_single = part.concat_sequence == 0 || part.concat_max == part.concat_sequence;
    if part.concat_sequence != 0 {
        first |= 0x40; // TP-UDHI
    }
    if part.delivery_report_request && is_last_or_single {
        first |= 0x20;
    }
    pdu.push(first);

    // --- TP-MR ---
    pdu.push(0x00);

    // --- destination address ---
    pdu.extend(encode_numeric_address(number)?);

    // --- TP-PID ---
    pdu.push(0x00);

    // --- TP-DCS ---
    let mut dcs = 0u8;
    if part.class >= 0 && part.class <= 3 {
        dcs |= 0x10;
        dcs |= part.class as u8;
    }
    dcs |= match part.encoding {
        Encoding::Ucs2 => 0x08,
        Encoding::Gsm7 => 0x00,
        Encoding::EightBit | Encoding::Unknown => 0x04,
    };
    pdu.push(dcs);

    // --- TP-VP ---
    if part.validity_relative > 0 {
        pdu.push(validity_to_relative(part.validity_relative));
    }

    // --- TP-UDL placeholder, patched once the body length is known ---
    let udl_index = pdu.len();
    pdu.push(0);

    // --- UDH ---
    let mut gsm7_shift = 0u8;
    let mut udh_octets = 0usize;
    let mut udh_septets = 0usize;
    if part.concat_sequence != 0 {
        let udh = UserDataHeader::with_concatenation(part.concat_reference, part.concat_max, part.concat_sequence);
        let udh_bytes = udh.to_bytes();
        pdu.extend(&udh_bytes);
        // udh_bytes already includes the leading UDHL octet, so its length
        // is the total octet count the UDH occupies on the wire: 6 for an
        // 8-bit reference, 7 for a 16-bit one.
        udh_octets = udh_bytes.len();
        gsm7_shift = (7 - ((udh_octets * 8) % 7)) as u8 % 7;
        udh_septets = ((udh_octets * 8) + gsm7_shift as usize) / 7;
    }

    // --- UD ---
    let udl = match part.encoding {
        Encoding::Gsm7 => {
            let text = part
                .text
                .as_ref()
                .ok_or(PduError::InvalidParameter { what: "GSM7 part has no text" })?;
            let septets = utf8_to_gsm(text)?;
            if septets.is_empty() {
                return Err(PduError::EncodeUnsupported { reason: "empty GSM7 text".into() });
            }
            let packed = gsm_pack(&septets, gsm7_shift);
            pdu.extend(&packed);
            udh_septets + septets.len()
        }
        Encoding::Ucs2 => {
            let text = part
                .text
                .as_ref()
                .ok_or(PduError::InvalidParameter { what: "UCS2 part has no text" })?;
            let bytes = utf8_to_utf16be(text);
            pdu.extend(&bytes);
            udh_octets + bytes.len()
        }
        Encoding::EightBit | Encoding::Unknown => {
            let data = part
                .data
                .as_ref()
                .ok_or(PduError::InvalidParameter { what: "8-bit part has no data" })?;
            pdu.extend(data);
            udh_octets + data.len()
        }
    };
    pdu[udl_index] = udl as u8;

    Ok((pdu, tpdu_start))
}

fn encode_numeric_address(addr: &Address) -> Result<Vec<u8>, PduError> {
    match addr {
        Address::Number { .. } => encode_address(addr, LengthConvention::DigitCount),
        Address::Alphanumeric(_) => Err(PduError::InvalidAddress("destination must be numeric")),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pdu::decode_pdu;

    #[test]
    fn encodes_scenario_4_submit_pdu() {
        let mut part = SmsPart::new_submit();
        part.number = Some(Address::phone_number("+15556661234"));
        part.text = Some("This is really cool ΔΔΔΔΔ".to_string());
        part.validity_relative = 25;

        let (pdu, tpdu_start) = encode_submit_pdu(&part).unwrap();
        assert_eq!(tpdu_start, 1);
        assert_eq!(pdu[0], 0x00); // no SMSC
        assert_eq!(pdu[tpdu_start] & 0x01, 0x01); // MTI = SUBMIT
        assert_eq!(pdu[tpdu_start] & 0x10, 0x10); // VPF = relative
    }

    #[test]
    fn submit_round_trips_through_decode() {
        let mut part = SmsPart::new_submit();
        part.number = Some(Address::phone_number("+16175046925"));
        part.text = Some("Hello!".to_string());

        let (pdu, _) = encode_submit_pdu(&part).unwrap();
        let decoded = decode_pdu(&pdu).unwrap();
        assert_eq!(decoded.pdu_type, PduType::Submit);
        assert_eq!(decoded.text.as_deref(), Some("Hello!"));
        assert_eq!(decoded.number, Some(Address::phone_number("+16175046925")));
    }

    #[test]
    fn concatenated_part_sets_udhi_and_udl() {
        let mut part = SmsPart::new_submit();
        part.number = Some(Address::phone_number("+15556661234"));
        part.text = Some("part one of two".to_string());
        part.concat_reference = 0x4C;
        part.concat_max = 2;
        part.concat_sequence = 1;

        let (pdu, tpdu_start) = encode_submit_pdu(&part).unwrap();
        assert_eq!(pdu[tpdu_start] & 0x40, 0x40); // UDHI set
        let decoded = decode_pdu(&pdu).unwrap();
        assert!(decoded.should_concat);
        assert_eq!(decoded.concat_reference, 0x4C);
        assert_eq!(decoded.concat_max, 2);
        assert_eq!(decoded.concat_sequence, 1);
        assert_eq!(decoded.text.as_deref(), Some("part one of two"));
    }

    #[test]
    fn sixteen_bit_concat_reference_uses_seven_byte_udh() {
        let mut part = SmsPart::new_submit();
        part.number = Some(Address::phone_number("+15556661234"));
        part.text = Some("part one of two".to_string());
        part.concat_reference = 0x1234; // > 0xFF, forces the 16-bit UDH form
        part.concat_max = 2;
        part.concat_sequence = 1;

        let (pdu, tpdu_start) = encode_submit_pdu(&part).unwrap();
        assert_eq!(pdu[tpdu_start] & 0x40, 0x40); // UDHI set
        let decoded = decode_pdu(&pdu).unwrap();
        assert!(decoded.should_concat);
        assert_eq!(decoded.concat_reference, 0x1234);
        assert_eq!(decoded.concat_max, 2);
        assert_eq!(decoded.concat_sequence, 1);
        assert_eq!(decoded.text.as_deref(), Some("part one of two"));
    }
}
