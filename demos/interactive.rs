use sms_pdu_codec::address::Address;
use sms_pdu_codec::part::split_text;
use sms_pdu_codec::pdu::SmsPart;
use sms_pdu_codec::{decode_pdu, encode_submit_pdu};
use std::io::prelude::*;

// Illustrates the codec/assembly API shape without a concrete Transport
// backend (AT/MBIM/QMI plumbing is out of scope for this crate).
fn main() {
    env_logger::init();
    println!("### Instructions for use ###");
    println!("- Decode a PDU by typing 'decode [hex]'");
    println!("- Build SUBMIT PDUs by typing '[recipient];[message]'");
    println!();

    let stdin = ::std::io::stdin();
    let lock = stdin.lock();
    for ln in lock.lines() {
        let ln = ln.unwrap();
        if let Some(hex) = ln.strip_prefix("decode ") {
            let bytes: Vec<u8> = (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
                .collect();
            match decode_pdu(&bytes) {
                Ok(part) => println!("{:?}", part),
                Err(e) => println!("decode failed: {}", e),
            }
            continue;
        }

        let fields: Vec<&str> = ln.split(';').collect();
        if fields.len() != 2 {
            println!("expected '[recipient];[message]'");
            continue;
        }
        let (encoding, chunks) = split_text(fields[1]);
        let max = chunks.len() as u8;
        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut part = SmsPart::new_submit();
            part.number = Some(Address::phone_number(fields[0]));
            part.encoding = encoding;
            part.text = Some(chunk);
            if max > 1 {
                part.concat_reference = 0x42;
                part.concat_max = max;
                part.concat_sequence = (i + 1) as u8;
            }
            match encode_submit_pdu(&part) {
                Ok((pdu, tpdu_start)) => {
                    let hex: String = pdu.iter().map(|b| format!("{:02x}", b)).collect();
                    println!("part {}/{}: {} (tpdu at byte {})", i + 1, max, hex, tpdu_start);
                }
                Err(e) => println!("encode failed: {}", e),
            }
        }
    }
}
