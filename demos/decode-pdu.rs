use sms_pdu_codec::decode_pdu;
use std::io::prelude::*;

fn main() {
    println!("Input PDUs");
    let stdin = ::std::io::stdin();
    let lock = stdin.lock();
    for ln in lock.lines() {
        let ln = ln.unwrap();
        let bytes: Vec<u8> = (0..ln.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&ln[i..i + 2], 16).unwrap())
            .collect();
        let part = decode_pdu(&bytes).unwrap();
        println!("part: {:?}", part);
        if let Some(number) = &part.number {
            println!("sender: {}", number.display());
        }
        println!("text: {:?}", part.text);
    }
}
