//! Ownership by trial decryption.
//!
//! A note belongs to a key iff its payload authenticates under the note key
//! derived from that viewing key (see `shared_crypto::notes`).

use crate::domain::MatchError;
use crate::ports::OwnershipTest;
use shared_crypto::{open_note, CryptoError};
use shared_types::{NoteRecord, ViewingKey};

/// Trial-decrypts each note with the account's viewing key.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialDecryption;

impl OwnershipTest for TrialDecryption {
    fn owns(&self, key: &ViewingKey, note: &NoteRecord) -> Result<bool, MatchError> {
        match open_note(key.as_bytes(), &note.payload) {
            Ok(opened) => Ok(opened.is_some()),
            Err(CryptoError::MalformedNote { minimum, actual }) => Err(MatchError::Malformed {
                note: note.id,
                reason: format!("payload is {} bytes, need at least {}", actual, minimum),
            }),
            Err(e) => Err(MatchError::Capability(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::seal_note;
    use shared_types::NoteId;

    fn key(tag: u8) -> ViewingKey {
        ViewingKey::from_bytes(vec![tag; 32])
    }

    #[test]
    fn test_owner_matches() {
        let payload = seal_note(key(1).as_bytes(), b"note").unwrap();
        let note = NoteRecord::data(NoteId::new([1; 32]), payload);
        assert_eq!(TrialDecryption.owns(&key(1), &note), Ok(true));
    }

    #[test]
    fn test_other_key_does_not_match() {
        let payload = seal_note(key(1).as_bytes(), b"note").unwrap();
        let note = NoteRecord::nullifier(NoteId::new([1; 32]), payload);
        assert_eq!(TrialDecryption.owns(&key(2), &note), Ok(false));
    }

    #[test]
    fn test_short_payload_is_match_error() {
        let note = NoteRecord::data(NoteId::new([3; 32]), vec![0; 5]);
        assert!(matches!(
            TrialDecryption.owns(&key(1), &note),
            Err(MatchError::Malformed { note: id, .. }) if id == note.id
        ));
    }

    #[test]
    fn test_empty_key_is_capability_error() {
        let payload = seal_note(key(1).as_bytes(), b"note").unwrap();
        let note = NoteRecord::data(NoteId::new([1; 32]), payload);
        assert!(matches!(
            TrialDecryption.owns(&ViewingKey::from_bytes(Vec::new()), &note),
            Err(MatchError::Capability(_))
        ));
    }
}
