//! Seven-octet BCD service-centre timestamp codec (3GPP TS 23.040 §9.2.3.11).
use crate::errors::PduError;
use chrono::{FixedOffset, TimeZone};

fn bcd_pair(byte: u8) -> u32 {
    // Reverse-nibble BCD: the tens digit sits in the low nibble.
    ((byte & 0x0F) as u32) * 10 + ((byte >> 4) as u32 & 0x0F)
}

/// Decode the 7-byte timestamp field into an ISO-8601 string with explicit
/// UTC offset, e.g. `2012-04-25T19:56:50-04:00`.
pub fn decode_timestamp(bytes: &[u8; 7]) -> Result<String, PduError> {
    let year = 2000 + bcd_pair(bytes[0]);
    let month = bcd_pair(bytes[1]);
    let day = bcd_pair(bytes[2]);
    let hour = bcd_pair(bytes[3]);
    let minute = bcd_pair(bytes[4]);
    let second = bcd_pair(bytes[5]);

    let quarters = ((bytes[6] & 0x07) as i32) * 10 + ((bytes[6] >> 4) as i32 & 0x0F);
    let mut offset_minutes = quarters * 15;
    if bytes[6] & 0x08 != 0 {
        offset_minutes = -offset_minutes;
    }

    let offset = FixedOffset::east_opt(offset_minutes * 60)
        .ok_or_else(|| PduError::MalformedField { field: "timestamp", reason: "offset out of range".into() })?;
    let date = offset
        .ymd_opt(year as i32, month, day)
        .single()
        .ok_or_else(|| PduError::MalformedField { field: "timestamp", reason: "invalid date".into() })?;
    let dt = date
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| PduError::MalformedField { field: "timestamp", reason: "invalid time".into() })?;
    Ok(dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, false))
}

/// Encode an ISO-8601 timestamp string back into the 7-byte wire form.
pub fn encode_timestamp(iso: &str) -> Result<[u8; 7], PduError> {
    let dt = chrono::DateTime::parse_from_rfc3339(iso)
        .map_err(|_| PduError::InvalidParameter { what: "timestamp not valid ISO-8601" })?;
    let year = (dt.format("%Y").to_string().parse::<u32>().unwrap_or(2000)) % 100;
    let month: u32 = dt.format("%m").to_string().parse().unwrap();
    let day: u32 = dt.format("%d").to_string().parse().unwrap();
    let hour: u32 = dt.format("%H").to_string().parse().unwrap();
    let minute: u32 = dt.format("%M").to_string().parse().unwrap();
    let second: u32 = dt.format("%S").to_string().parse().unwrap();

    let offset_minutes = dt.offset().local_minus_utc() / 60;
    let negative = offset_minutes < 0;
    let quarters = (offset_minutes.abs() / 15) as u8;

    let pack = |v: u32| -> u8 {
        let tens = (v / 10) as u8;
        let units = (v % 10) as u8;
        tens | (units << 4)
    };

    let mut tz_byte = (quarters / 10) | ((quarters % 10) << 4);
    if negative {
        tz_byte |= 0x08;
    }

    Ok([
        pack(year),
        pack(month),
        pack(day),
        pack(hour),
        pack(minute),
        pack(second),
        tz_byte,
    ])
}

/// Inverse of [`validity_to_relative`]: map a stored TP-VP byte back to
/// minutes of validity.
pub fn relative_to_validity(vp: u8) -> u32 {
    match vp {
        0..=143 => (vp as u32 + 1) * 5,
        144..=167 => 720 + (vp as u32 - 143) * 30,
        168..=196 => (vp as u32 - 166) * 1440,
        197..=255 => (vp as u32 - 192) * 10080,
    }
}

/// Map requested validity minutes to a TP-VP byte. Replicates the
/// reference encoder's off-by-one at the five-week boundary (`- 40320`,
/// not the dimensionally-expected `- 43200`) rather than silently fixing it,
/// so round-tripping through a real modem's validity table stays exact.
pub fn validity_to_relative(validity: u32) -> u8 {
    if validity == 0 {
        return 167; // 24 hours
    }
    if validity <= 720 {
        let v = if validity % 5 != 0 { validity + 5 } else { validity };
        return ((v / 5) - 1) as u8;
    }
    if validity <= 1440 {
        let mut v = if validity % 30 != 0 { validity + 30 } else { validity };
        v = v.min(1440);
        return (143 + (v - 720) / 30) as u8;
    }
    if validity <= 43200 {
        let mut v = if validity % 1440 != 0 { validity + 1440 } else { validity };
        v = v.min(43200);
        return (167 + (v - 1440) / 1440) as u8;
    }
    if validity <= 635040 {
        let mut v = if validity % 10080 != 0 { validity + 10080 } else { validity };
        v = v.min(635040);
        return (196 + (v - 40320) / 10080) as u8;
    }
    255
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_scenario_1_timestamp() {
        // 21 40 52 91 65 05 69 -> 2012-04-25T19:56:50-04:00
        let bytes = [0x21, 0x40, 0x52, 0x91, 0x65, 0x05, 0x69];
        let s = decode_timestamp(&bytes).unwrap();
        assert_eq!(s, "2012-04-25T19:56:50-04:00");
    }

    #[test]
    fn decodes_positive_offset() {
        // from scenario 3: 11 30 92 91 02 40 61 -> 2011-03-29T19:20:04+04:00
        let bytes = [0x11, 0x30, 0x92, 0x91, 0x02, 0x40, 0x61];
        let s = decode_timestamp(&bytes).unwrap();
        assert_eq!(s, "2011-03-29T19:20:04+04:00");
    }

    #[test]
    fn encode_decode_round_trips() {
        let bytes = [0x21, 0x40, 0x52, 0x91, 0x65, 0x05, 0x69];
        let s = decode_timestamp(&bytes).unwrap();
        let back = encode_timestamp(&s).unwrap();
        assert_eq!(back, bytes);
    }

    #[test]
    fn validity_round_trips_at_bucket_boundaries() {
        assert_eq!(relative_to_validity(validity_to_relative(5)), 5);
        assert_eq!(relative_to_validity(validity_to_relative(720)), 720);
        assert_eq!(relative_to_validity(validity_to_relative(1440)), 1440);
    }

    #[test]
    fn validity_default_is_24_hours() {
        assert_eq!(validity_to_relative(0), 167);
    }

    #[test]
    fn validity_monotonic() {
        let mut last = 0u32;
        for vp in 0..=255u8 {
            let v = relative_to_validity(vp);
            assert!(v >= last, "vp {} gave {} < previous {}", vp, v, last);
            last = v;
        }
    }
}
