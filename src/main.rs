use std::env;
use std::process;

use sms_pdu_codec::pdu::PduType;
use sms_pdu_codec::{decode_pdu, SmsPart};

fn print_part_info(part: &SmsPart) {
    println!("pdu type: {:?}", part.pdu_type);
    if let Some(smsc) = &part.smsc {
        println!("smsc: {}", smsc.display());
    }
    if let Some(number) = &part.number {
        println!("number: {}", number.display());
    }
    if let Some(ts) = &part.timestamp {
        println!("timestamp: {}", ts);
    }
    println!("encoding: {:?}", part.encoding);
    if let Some(text) = &part.text {
        println!("text: {}", text);
    }
    if let Some(data) = &part.data {
        println!("data: {}", data.iter().map(|b| format!("{:02x}", b)).collect::<String>());
    }
    println!("class: {}", part.class);
    println!("validity (relative, minutes): {}", part.validity_relative);
    println!("delivery report requested: {}", part.delivery_report_request);
    if part.should_concat {
        println!(
            "concat: reference {} part {}/{}",
            part.concat_reference, part.concat_sequence, part.concat_max
        );
    }
    if part.pdu_type == PduType::StatusReport {
        println!("message reference: {}", part.message_reference);
        if let Some(disc) = &part.discharge_timestamp {
            println!("discharge timestamp: {}", disc);
        }
        println!("delivery state: {:#04x}", part.delivery_state);
    }
}

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let hex = match (args.next(), args.next()) {
        (Some(ref flag), Some(hex)) if flag == "--pdu" => hex,
        _ => {
            eprintln!("usage: sms-pdu-codec --pdu <hex>");
            process::exit(2);
        }
    };

    let bytes = match decode_hex(&hex) {
        Some(b) => b,
        None => {
            eprintln!("not a valid hex string");
            process::exit(2);
        }
    };

    match decode_pdu(&bytes) {
        Ok(part) => print_part_info(&part),
        Err(e) => {
            eprintln!("failed to decode PDU: {}", e);
            process::exit(1);
        }
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
