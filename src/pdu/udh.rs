//! User Data Header parsing (concatenation information elements).
use crate::errors::PduError;

#[derive(Debug, Clone)]
pub struct UdhComponent {
    pub id: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UserDataHeader {
    pub components: Vec<UdhComponent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatenatedSmsData {
    pub reference: u16,
    pub parts: u8,
    pub sequence: u8,
}

impl UserDataHeader {
    /// Parse a UDH that does *not* include its own length octet (the
    /// caller has already consumed `UDHL`).
    pub fn parse(b: &[u8]) -> Result<UserDataHeader, PduError> {
        let mut offset = 0;
        let mut components = vec![];
        while offset < b.len() {
            let id = b[offset];
            offset += 1;
            if offset >= b.len() {
                return Err(PduError::MalformedField {
                    field: "udh",
                    reason: "truncated information element length".into(),
                });
            }
            let len = b[offset] as usize;
            offset += 1;
            let end = offset + len;
            if end > b.len() {
                return Err(PduError::MalformedField {
                    field: "udh",
                    reason: "information element data runs past header".into(),
                });
            }
            components.push(UdhComponent {
                id,
                data: b[offset..end].to_vec(),
            });
            offset = end;
        }
        Ok(UserDataHeader { components })
    }

    /// Return the concatenation IE (8- or 16-bit reference), if present,
    /// rejecting `max == 0` or `sequence > max`.
    pub fn concatenated_sms_data(&self) -> Result<Option<ConcatenatedSmsData>, PduError> {
        for comp in &self.components {
            if comp.id == 0x00 && comp.data.len() == 3 {
                let data = ConcatenatedSmsData {
                    reference: comp.data[0] as u16,
                    parts: comp.data[1],
                    sequence: comp.data[2],
                };
                Self::validate(data)?;
                return Ok(Some(data));
            }
            if comp.id == 0x08 && comp.data.len() == 4 {
                let data = ConcatenatedSmsData {
                    reference: ((comp.data[0] as u16) << 8) | comp.data[1] as u16,
                    parts: comp.data[2],
                    sequence: comp.data[3],
                };
                Self::validate(data)?;
                return Ok(Some(data));
            }
        }
        Ok(None)
    }

    fn validate(data: ConcatenatedSmsData) -> Result<(), PduError> {
        if data.parts == 0 {
            return Err(PduError::MalformedField {
                field: "udh-concat",
                reason: "max parts is zero".into(),
            });
        }
        if data.sequence > data.parts {
            return Err(PduError::MalformedField {
                field: "udh-concat",
                reason: "sequence exceeds max parts".into(),
            });
        }
        Ok(())
    }

    /// Serialize to wire format, including the leading `UDHL` octet.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = vec![];
        for comp in &self.components {
            body.push(comp.id);
            body.push(comp.data.len() as u8);
            body.extend_from_slice(&comp.data);
        }
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(body.len() as u8);
        out.extend(body);
        out
    }

    /// Build a UDH containing exactly one concatenation IE, choosing the
    /// 8-bit or 16-bit reference form depending on whether `reference`
    /// fits in a byte.
    pub fn with_concatenation(reference: u16, parts: u8, sequence: u8) -> UserDataHeader {
        let data = if reference <= 0xFF {
            vec![reference as u8, parts, sequence]
        } else {
            vec![(reference >> 8) as u8, (reference & 0xFF) as u8, parts, sequence]
        };
        let id = if reference <= 0xFF { 0x00 } else { 0x08 };
        UserDataHeader {
            components: vec![UdhComponent { id, data }],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_8bit_concat_ie() {
        let bytes = [0x00u8, 0x03, 0x4C, 0x02, 0x01];
        let udh = UserDataHeader::parse(&bytes).unwrap();
        let data = udh.concatenated_sms_data().unwrap().unwrap();
        assert_eq!(data.reference, 0x4C);
        assert_eq!(data.parts, 2);
        assert_eq!(data.sequence, 1);
    }

    #[test]
    fn rejects_zero_max_parts() {
        let bytes = [0x00u8, 0x03, 0x4C, 0x00, 0x01];
        let udh = UserDataHeader::parse(&bytes).unwrap();
        assert!(udh.concatenated_sms_data().is_err());
    }

    #[test]
    fn round_trips_16bit_reference() {
        let udh = UserDataHeader::with_concatenation(0x1234, 3, 2);
        let bytes = udh.to_bytes();
        let reparsed = UserDataHeader::parse(&bytes[1..]).unwrap();
        let data = reparsed.concatenated_sms_data().unwrap().unwrap();
        assert_eq!(data.reference, 0x1234);
        assert_eq!(data.parts, 3);
        assert_eq!(data.sequence, 2);
    }
}
