//! Splitting helpers for oversized outgoing text/data.
use crate::charset::{gsm_char_septets, utf8_to_gsm};
use crate::pdu::Encoding;

const GSM7_SINGLE_MAX: usize = 160;
const GSM7_MULTI_MAX: usize = 153;
const WIDE_SINGLE_MAX: usize = 140;
const WIDE_MULTI_MAX: usize = 134;

/// Pick GSM-7 when every code point has a default- or extension-table
/// mapping, UCS-2 (UTF-16BE on the wire) otherwise, and split the text on
/// the boundaries appropriate to the chosen scheme.
pub fn split_text(text: &str) -> (Encoding, Vec<String>) {
    if text.is_empty() {
        return (Encoding::Gsm7, vec![String::new()]);
    }
    if utf8_to_gsm(text).is_ok() {
        (Encoding::Gsm7, split_text_gsm7(text))
    } else {
        (Encoding::Ucs2, split_text_utf16(text))
    }
}

/// Septet cost of one character, including the extension-table escape
/// (2 septets) where it applies. `split_text` has already verified every
/// character maps into GSM-7, so an unmapped char here can't happen; treat
/// it as 1 septet rather than panic.
fn gsm7_char_cost(ch: char) -> usize {
    gsm_char_septets(ch).unwrap_or(1)
}

fn split_text_gsm7(text: &str) -> Vec<String> {
    let total_septets: usize = text.chars().map(gsm7_char_cost).sum();
    if total_septets <= GSM7_SINGLE_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_septets = 0usize;
    for ch in text.chars() {
        let cost = gsm7_char_cost(ch);
        if current_septets + cost > GSM7_MULTI_MAX {
            chunks.push(std::mem::take(&mut current));
            current_septets = 0;
        }
        current.push(ch);
        current_septets += cost;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// UTF-16 code-unit cost of one code point (2 bytes, or 4 for non-BMP).
fn utf16_byte_cost(ch: char) -> usize {
    ch.len_utf16() * 2
}

fn split_text_utf16(text: &str) -> Vec<String> {
    let total_bytes: usize = text.chars().map(utf16_byte_cost).sum();
    if total_bytes <= WIDE_SINGLE_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_bytes = 0usize;
    for ch in text.chars() {
        let cost = utf16_byte_cost(ch);
        if current_bytes + cost > WIDE_MULTI_MAX {
            chunks.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current.push(ch);
        current_bytes += cost;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split raw binary data on 140/134-octet boundaries.
pub fn split_data(data: &[u8]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![Vec::new()];
    }
    if data.len() <= WIDE_SINGLE_MAX {
        return vec![data.to_vec()];
    }
    data.chunks(WIDE_MULTI_MAX).map(|c| c.to_vec()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_ascii_is_a_single_gsm7_chunk() {
        let (encoding, chunks) = split_text("Hello!");
        assert_eq!(encoding, Encoding::Gsm7);
        assert_eq!(chunks, vec!["Hello!".to_string()]);
    }

    #[test]
    fn gsm7_splits_at_153_boundary() {
        let text: String = std::iter::repeat('A').take(161).collect();
        let (encoding, chunks) = split_text(&text);
        assert_eq!(encoding, Encoding::Gsm7);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 153);
        assert_eq!(chunks[1].chars().count(), 8);
        let joined: String = chunks.concat();
        assert_eq!(joined, text);
    }

    #[test]
    fn gsm7_counts_extension_table_chars_as_two_septets() {
        let text: String = std::iter::repeat('{').take(160).collect();
        let (encoding, chunks) = split_text(&text);
        assert_eq!(encoding, Encoding::Gsm7);
        let joined: String = chunks.concat();
        assert_eq!(joined, text);
        for chunk in &chunks {
            let septets: usize = chunk.chars().map(gsm7_char_cost).sum();
            assert!(septets <= GSM7_MULTI_MAX, "chunk of {} septets exceeds the per-part limit", septets);
        }
        assert!(chunks.len() > 1);
    }

    #[test]
    fn non_gsm_text_falls_back_to_ucs2() {
        let (encoding, chunks) = split_text("тест");
        assert_eq!(encoding, Encoding::Ucs2);
        assert_eq!(chunks, vec!["тест".to_string()]);
    }

    #[test]
    fn ucs2_splits_preserve_content() {
        let text: String = std::iter::repeat('中').take(100).collect();
        let (encoding, chunks) = split_text(&text);
        assert_eq!(encoding, Encoding::Ucs2);
        assert!(chunks.len() > 1);
        let joined: String = chunks.concat();
        assert_eq!(joined, text);
        for chunk in &chunks[..chunks.len() - 1] {
            let bytes: usize = chunk.chars().map(utf16_byte_cost).sum();
            assert!(bytes <= WIDE_MULTI_MAX);
        }
    }

    #[test]
    fn split_never_breaks_a_surrogate_pair() {
        let text: String = std::iter::repeat('😀').take(40).collect();
        let (_, chunks) = split_text(&text);
        for chunk in &chunks {
            assert!(chunk.chars().all(|c| c == '😀'));
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn empty_input_produces_one_empty_part() {
        let (_, chunks) = split_text("");
        assert_eq!(chunks, vec!["".to_string()]);
        let data_chunks = split_data(&[]);
        assert_eq!(data_chunks, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn data_splits_at_134_boundary() {
        let data = vec![0xAAu8; 300];
        let chunks = split_data(&data);
        assert_eq!(chunks[0].len(), 134);
        assert_eq!(chunks[1].len(), 134);
        assert_eq!(chunks[2].len(), 32);
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, data.len());
    }
}
