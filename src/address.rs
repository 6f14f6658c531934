//! Semi-octet BCD address codec (3GPP TS 23.040 §9.1.2.5).
use crate::charset::{gsm_pack, gsm_septet_len, gsm_to_utf8, gsm_unpack, utf8_to_gsm, CharsetPolicy};
use crate::errors::PduError;

/// Bits 6..4 of the type-of-address byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Unknown,
    International,
    National,
    NetworkSpecific,
    Subscriber,
    Alphanumeric,
    Abbreviated,
}

impl AddressType {
    fn from_bits(bits: u8) -> AddressType {
        match bits {
            0 => AddressType::Unknown,
            1 => AddressType::International,
            2 => AddressType::National,
            3 => AddressType::NetworkSpecific,
            4 => AddressType::Subscriber,
            5 => AddressType::Alphanumeric,
            6 => AddressType::Abbreviated,
            _ => AddressType::Unknown,
        }
    }
    fn to_bits(self) -> u8 {
        match self {
            AddressType::Unknown => 0,
            AddressType::International => 1,
            AddressType::National => 2,
            AddressType::NetworkSpecific => 3,
            AddressType::Subscriber => 4,
            AddressType::Alphanumeric => 5,
            AddressType::Abbreviated => 6,
        }
    }
}

/// Bits 3..0 of the type-of-address byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingPlan {
    Unknown,
    Isdn,
    Data,
    Telex,
    National,
    Private,
    Ermes,
    Other(u8),
}

impl NumberingPlan {
    fn from_bits(bits: u8) -> NumberingPlan {
        match bits {
            0 => NumberingPlan::Unknown,
            1 => NumberingPlan::Isdn,
            3 => NumberingPlan::Data,
            4 => NumberingPlan::Telex,
            8 => NumberingPlan::National,
            9 => NumberingPlan::Private,
            10 => NumberingPlan::Ermes,
            other => NumberingPlan::Other(other),
        }
    }
    fn to_bits(self) -> u8 {
        match self {
            NumberingPlan::Unknown => 0,
            NumberingPlan::Isdn => 1,
            NumberingPlan::Data => 3,
            NumberingPlan::Telex => 4,
            NumberingPlan::National => 8,
            NumberingPlan::Private => 9,
            NumberingPlan::Ermes => 10,
            NumberingPlan::Other(b) => b,
        }
    }
}

/// A decoded SMSC / destination / originating / recipient address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Number {
        ty: AddressType,
        plan: NumberingPlan,
        /// Decimal digits only; a leading `+` is added for international
        /// numbers when rendered with `Address::to_string`-equivalent use.
        digits: String,
    },
    Alphanumeric(String),
}

impl Address {
    /// Convenience constructor for an ISDN number, inferring
    /// international/national from a leading `+`.
    pub fn phone_number(number: &str) -> Address {
        if let Some(stripped) = number.strip_prefix('+') {
            Address::Number {
                ty: AddressType::International,
                plan: NumberingPlan::Isdn,
                digits: stripped.to_string(),
            }
        } else {
            Address::Number {
                ty: AddressType::National,
                plan: NumberingPlan::Isdn,
                digits: number.to_string(),
            }
        }
    }

    /// Render with a leading `+` for international numbers, matching what
    /// the decoder produces for `SmsPart::number`/`smsc`.
    pub fn display(&self) -> String {
        match self {
            Address::Number { ty, digits, .. } => {
                if *ty == AddressType::International {
                    format!("+{}", digits)
                } else {
                    digits.clone()
                }
            }
            Address::Alphanumeric(s) => s.clone(),
        }
    }
}

/// Which convention governs the leading length byte: SMSC addresses count
/// the octets that follow it, destination/originating addresses count
/// decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthConvention {
    OctetCount,
    DigitCount,
}

const BCD_PAD: u8 = 0xF;

fn bcd_decode_digits(octets: &[u8], digit_count: usize) -> String {
    let mut out = String::with_capacity(digit_count);
    'outer: for &byte in octets {
        for nibble in [byte & 0x0F, byte >> 4] {
            if out.len() == digit_count {
                break 'outer;
            }
            if nibble == BCD_PAD {
                break 'outer;
            }
            out.push((b'0' + nibble) as char);
        }
    }
    out
}

fn bcd_encode_digits(digits: &str) -> Result<Vec<u8>, PduError> {
    let mut nibbles: Vec<u8> = Vec::with_capacity(digits.len());
    for c in digits.chars() {
        let d = c
            .to_digit(10)
            .ok_or(PduError::InvalidAddress("non-decimal digit in address"))?;
        nibbles.push(d as u8);
    }
    if nibbles.len() % 2 != 0 {
        nibbles.push(BCD_PAD);
    }
    Ok(nibbles
        .chunks_exact(2)
        .map(|pair| pair[0] | (pair[1] << 4))
        .collect())
}

/// Decode a full address field: `[length][type-of-address][payload...]`.
/// `convention` picks whether `length` is octets-following or digit-count.
/// Returns the address and the total number of bytes consumed including
/// the length byte.
pub fn decode_address(buf: &[u8], convention: LengthConvention) -> Result<(Address, usize), PduError> {
    if buf.is_empty() {
        return Err(PduError::TooShort { need: 1, have: 0, at: "address length" });
    }
    let length = buf[0] as usize;
    if length == 0 {
        return Err(PduError::InvalidAddress("zero-length address"));
    }
    if buf.len() < 2 {
        return Err(PduError::TooShort { need: 2, have: buf.len(), at: "address type" });
    }
    let toa = buf[1];
    let ty = AddressType::from_bits((toa >> 4) & 0x07);
    let plan = NumberingPlan::from_bits(toa & 0x0F);

    let (payload_octets, digit_count) = match convention {
        LengthConvention::OctetCount => (length - 1, (length - 1) * 2),
        LengthConvention::DigitCount => ((length + 1) / 2, length),
    };
    let total_len = 2 + payload_octets;
    if buf.len() < total_len {
        return Err(PduError::TooShort { need: total_len, have: buf.len(), at: "address digits" });
    }
    let payload = &buf[2..total_len];

    if ty == AddressType::Alphanumeric {
        let septet_count = (payload_octets * 8) / 7;
        let septets = gsm_unpack(payload, septet_count, 0);
        let text = gsm_to_utf8(&septets, CharsetPolicy::Replace)?;
        return Ok((Address::Alphanumeric(text), total_len));
    }

    let digits = bcd_decode_digits(payload, digit_count);
    Ok((
        Address::Number { ty, plan, digits },
        total_len,
    ))
}

/// Encode an address with the given length convention. Returns the bytes
/// including the leading length byte.
pub fn encode_address(addr: &Address, convention: LengthConvention) -> Result<Vec<u8>, PduError> {
    match addr {
        Address::Number { ty, plan, digits } => {
            if digits.is_empty() {
                return Err(PduError::InvalidAddress("empty number"));
            }
            let bcd = bcd_encode_digits(digits)?;
            let toa = 0x80 | (ty.to_bits() << 4) | plan.to_bits();
            let length = match convention {
                LengthConvention::OctetCount => 1 + bcd.len(),
                LengthConvention::DigitCount => digits.len(),
            };
            let mut out = Vec::with_capacity(2 + bcd.len());
            out.push(length as u8);
            out.push(toa);
            out.extend_from_slice(&bcd);
            Ok(out)
        }
        Address::Alphanumeric(text) => {
            let septets = utf8_to_gsm(text)?;
            let packed = gsm_pack(&septets, 0);
            let toa = 0x80 | (AddressType::Alphanumeric.to_bits() << 4) | NumberingPlan::Unknown.to_bits();
            // one "digit" is one semi-octet for an alphanumeric address.
            let digit_count = gsm_septet_len(text)? * 2;
            let length = match convention {
                LengthConvention::OctetCount => 1 + packed.len(),
                LengthConvention::DigitCount => digit_count,
            };
            let mut out = Vec::with_capacity(2 + packed.len());
            out.push(length as u8);
            out.push(toa);
            out.extend_from_slice(&packed);
            Ok(out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn international_number_round_trips() {
        let addr = Address::phone_number("+16175046925");
        let encoded = encode_address(&addr, LengthConvention::DigitCount).unwrap();
        let (decoded, consumed) = decode_address(&encoded, LengthConvention::DigitCount).unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded, addr);
        assert_eq!(decoded.display(), "+16175046925");
    }

    #[test]
    fn smsc_octet_count_round_trips() {
        let addr = Address::phone_number("+12063130025");
        let encoded = encode_address(&addr, LengthConvention::OctetCount).unwrap();
        assert_eq!(encoded[0] as usize, encoded.len() - 1);
        let (decoded, _) = decode_address(&encoded, LengthConvention::OctetCount).unwrap();
        assert_eq!(decoded, addr);
    }

    #[test]
    fn alphanumeric_round_trips() {
        let addr = Address::Alphanumeric("InternetSMS".to_string());
        let encoded = encode_address(&addr, LengthConvention::DigitCount).unwrap();
        let (decoded, _) = decode_address(&encoded, LengthConvention::DigitCount).unwrap();
        assert_eq!(decoded, addr);
    }

    #[test]
    fn odd_digit_count_pads_with_f() {
        let addr = Address::phone_number("12345");
        let encoded = encode_address(&addr, LengthConvention::DigitCount).unwrap();
        assert_eq!(encoded[0], 5);
        let last_byte = *encoded.last().unwrap();
        assert_eq!(last_byte >> 4, 0xF);
    }
}
