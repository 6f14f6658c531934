//! Multipart-aware SMS assembly: folding decoded/outgoing parts into
//! complete messages, and allocating local multipart references.
use rand::Rng;

use crate::errors::AssemblyError;
use crate::pdu::SmsPart;
use crate::transport::Storage;

/// Lifecycle state of an assembled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsState {
    Receiving,
    Received,
    Stored,
    Sending,
    Sent,
}

/// A single- or multi-part message, complete or still being assembled.
#[derive(Debug, Clone)]
pub struct Sms {
    pub state: SmsState,
    pub storage: Storage,
    pub number: Option<String>,
    pub concat_reference: u16,
    pub concat_max: u8,
    parts: Vec<Option<SmsPart>>,
}

impl Sms {
    fn new_singlepart(state: SmsState, storage: Storage, part: SmsPart) -> Sms {
        let number = part.number.as_ref().map(|a| a.display());
        Sms { state, storage, number, concat_reference: 0, concat_max: 1, parts: vec![Some(part)] }
    }

    fn new_multipart(state: SmsState, storage: Storage, reference: u16, max_parts: u8, part: SmsPart) -> Sms {
        let number = part.number.as_ref().map(|a| a.display());
        let mut parts = vec![None; max_parts as usize];
        let seq = part.concat_sequence as usize;
        if seq >= 1 && seq <= parts.len() {
            parts[seq - 1] = Some(part);
        }
        Sms { state, storage, number, concat_reference: reference, concat_max: max_parts, parts }
    }

    /// Insert a fragment at its sequence slot. A slot already holding a
    /// fragment is a protocol violation, not a retry to merge silently.
    fn take_fragment(&mut self, part: SmsPart) -> Result<(), AssemblyError> {
        let seq = part.concat_sequence as usize;
        if seq == 0 || seq > self.parts.len() || self.parts[seq - 1].is_some() {
            return Err(AssemblyError::SlotOccupied { sequence: part.concat_sequence });
        }
        self.parts[seq - 1] = Some(part);
        Ok(())
    }

    pub fn is_multipart(&self) -> bool {
        self.parts.len() > 1
    }

    pub fn is_complete(&self) -> bool {
        self.parts.iter().all(Option::is_some)
    }

    /// Fragments in sequence order. Only meaningful once `is_complete()`.
    pub fn parts(&self) -> impl Iterator<Item = &SmsPart> {
        self.parts.iter().filter_map(Option::as_ref)
    }

    fn holds_part_at(&self, storage: Storage, index: u32) -> bool {
        storage == self.storage && self.parts.iter().flatten().any(|p| p.storage_index == Some(index))
    }

    /// Concatenated text of every fragment, in sequence order.
    pub fn full_text(&self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        let mut out = String::new();
        for part in self.parts() {
            out.push_str(part.text.as_deref().unwrap_or(""));
        }
        Some(out)
    }
}

/// Raised by `SmsList::take_part` when a fragment completes or starts a
/// message. The source emits these as object signals; here they are plain
/// return values for the caller to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmsEvent {
    pub index: usize,
    pub complete: bool,
}

/// The set of in-flight and completed messages for one modem.
#[derive(Debug, Default)]
pub struct SmsList {
    messages: Vec<Sms>,
}

impl SmsList {
    pub fn new() -> SmsList {
        SmsList { messages: Vec::new() }
    }

    /// Whether a part at this (storage, index) is already held by any
    /// message in the list.
    pub fn has_part(&self, storage: Storage, index: Option<u32>) -> bool {
        match index {
            Some(index) => self.messages.iter().any(|sms| sms.holds_part_at(storage, index)),
            None => false,
        }
    }

    /// Take ownership of a part, either as a new standalone message or by
    /// folding it into (or starting) a multipart container. The
    /// (storage, index) uniqueness check runs before any dispatch on the
    /// part's own fields, so a duplicate part is always rejected
    /// regardless of whether it is single- or multi-part.
    pub fn take_part(&mut self, storage: Storage, part: SmsPart, received: bool) -> Result<SmsEvent, AssemblyError> {
        if self.has_part(storage, part.storage_index) {
            return Err(AssemblyError::Duplicate { storage, index: part.storage_index.unwrap_or(0) });
        }

        if part.should_concat {
            self.take_multipart(storage, part, received)
        } else {
            let state = if received { SmsState::Received } else { SmsState::Stored };
            self.messages.push(Sms::new_singlepart(state, storage, part));
            Ok(SmsEvent { index: self.messages.len() - 1, complete: true })
        }
    }

    fn take_multipart(&mut self, storage: Storage, part: SmsPart, received: bool) -> Result<SmsEvent, AssemblyError> {
        let number = part.number.as_ref().map(|a| a.display());
        let existing = self.messages.iter().position(|sms| {
            sms.is_multipart()
                && sms.concat_reference == part.concat_reference
                && sms.concat_max == part.concat_max
                && sms.number == number
        });

        if let Some(index) = existing {
            self.messages[index].take_fragment(part)?;
            return Ok(SmsEvent { index, complete: self.messages[index].is_complete() });
        }

        // first fragment seen for this reference: the container itself
        // counts as "added" whether it arrived receiving or complete.
        let state = if received { SmsState::Received } else { SmsState::Receiving };
        let reference = part.concat_reference;
        let max_parts = part.concat_max;
        self.messages.push(Sms::new_multipart(state, storage, reference, max_parts, part));
        let index = self.messages.len() - 1;
        let complete = self.messages[index].is_complete();
        Ok(SmsEvent { index, complete })
    }

    pub fn set_default_storage(&mut self, storage: Storage) {
        for sms in self.messages.iter_mut() {
            sms.storage = storage;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sms> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Allocate a local multipart reference for an outgoing message to
/// `number`: random starting point, linear probe with wraparound at 255,
/// 0 never used. Exhausting all 254 references for one destination is not
/// reachable in practice but is handled defensively.
pub fn allocate_local_multipart_reference(list: &SmsList, number: &str) -> Result<u16, AssemblyError> {
    let in_use = |candidate: u16| {
        list.messages
            .iter()
            .any(|sms| sms.is_multipart() && sms.concat_reference == candidate && sms.number.as_deref() == Some(number))
    };

    let first: u16 = rand::thread_rng().gen_range(1, 255);
    let mut candidate = first;
    loop {
        if !in_use(candidate) {
            return Ok(candidate);
        }
        candidate = if candidate == 255 { 1 } else { candidate + 1 };
        if candidate == first {
            return Err(AssemblyError::NoReferenceAvailable);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::address::Address;
    use crate::pdu::PduType;

    fn fragment(reference: u16, max: u8, seq: u8, text: &str) -> SmsPart {
        let mut part = SmsPart::new_submit();
        part.pdu_type = PduType::Deliver;
        part.number = Some(Address::phone_number("+15556661234"));
        part.should_concat = true;
        part.concat_reference = reference;
        part.concat_max = max;
        part.concat_sequence = seq;
        part.text = Some(text.to_string());
        part
    }

    #[test]
    fn singlepart_insert_is_immediately_complete() {
        let mut list = SmsList::new();
        let mut part = SmsPart::new_submit();
        part.pdu_type = PduType::Deliver;
        part.number = Some(Address::phone_number("+15556661234"));
        part.text = Some("hi".to_string());

        let event = list.take_part(Storage::Me, part, true).unwrap();
        assert!(event.complete);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn duplicate_storage_index_is_rejected_even_for_multipart() {
        let mut list = SmsList::new();
        let mut first = fragment(7, 2, 1, "a");
        first.storage_index = Some(3);
        list.take_part(Storage::Me, first, true).unwrap();

        let mut dup = fragment(7, 2, 2, "b");
        dup.storage_index = Some(3);
        let err = list.take_part(Storage::Me, dup, true).unwrap_err();
        assert_eq!(err, AssemblyError::Duplicate { storage: Storage::Me, index: 3 });
    }

    #[test]
    fn multipart_assembles_out_of_order() {
        let mut list = SmsList::new();
        let e1 = list.take_part(Storage::Me, fragment(42, 2, 2, "world"), true).unwrap();
        assert!(!e1.complete);
        let e2 = list.take_part(Storage::Me, fragment(42, 2, 1, "hello "), true).unwrap();
        assert!(e2.complete);
        assert_eq!(e1.index, e2.index);

        let sms = list.iter().next().unwrap();
        assert_eq!(sms.full_text().as_deref(), Some("hello world"));
    }

    #[test]
    fn resending_the_same_sequence_is_rejected() {
        let mut list = SmsList::new();
        list.take_part(Storage::Me, fragment(9, 2, 1, "a"), true).unwrap();
        let err = list.take_part(Storage::Me, fragment(9, 2, 1, "a-again"), true).unwrap_err();
        assert_eq!(err, AssemblyError::SlotOccupied { sequence: 1 });
    }

    #[test]
    fn reference_allocator_avoids_in_use_references() {
        let mut list = SmsList::new();
        list.take_part(Storage::Me, fragment(1, 2, 1, "x"), true).unwrap();

        for _ in 0..50 {
            let reference = allocate_local_multipart_reference(&list, "+15556661234").unwrap();
            assert_ne!(reference, 0);
            assert_ne!(reference, 1);
        }
    }
}
