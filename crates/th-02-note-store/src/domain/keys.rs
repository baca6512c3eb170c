//! # Key Layout
//!
//! ```text
//! rec:<account>:<seq>   -> bincode(OwnershipRecord)
//! own:<note>            -> account
//! seq:<account>         -> next seq
//! wm:<account>          -> watermark
//! ```
//!
//! Ids are raw 32-byte values and integers are big-endian so that a
//! lexicographic scan of `rec:<account>:` yields insertion order.

use shared_types::{AccountId, NoteId};

const RECORD: &[u8] = b"rec:";
const OWNER: &[u8] = b"own:";
const SEQUENCE: &[u8] = b"seq:";
const WATERMARK: &[u8] = b"wm:";

fn key(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Prefix of every record key.
pub fn all_records() -> Vec<u8> {
    RECORD.to_vec()
}

/// Prefix of one account's record keys.
pub fn records_of(account: &AccountId) -> Vec<u8> {
    key(&[RECORD, account.as_bytes(), b":"])
}

/// Key of one account's `seq`-th record.
pub fn record(account: &AccountId, seq: u64) -> Vec<u8> {
    key(&[RECORD, account.as_bytes(), b":", &seq.to_be_bytes()])
}

/// Key of the owner of `note`.
pub fn owner(note: &NoteId) -> Vec<u8> {
    key(&[OWNER, note.as_bytes()])
}

/// Key of the account's next sequence number.
pub fn sequence(account: &AccountId) -> Vec<u8> {
    key(&[SEQUENCE, account.as_bytes()])
}

/// Key of the account's scan watermark.
pub fn watermark(account: &AccountId) -> Vec<u8> {
    key(&[WATERMARK, account.as_bytes()])
}

/// Decode a big-endian u64 value.
pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    bytes.try_into().ok().map(u64::from_be_bytes)
}

/// Decode a raw 32-byte account id value.
pub fn decode_account(bytes: &[u8]) -> Option<AccountId> {
    <[u8; 32]>::try_from(bytes).ok().map(AccountId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keys_sort_by_sequence() {
        let account = AccountId::new([1; 32]);
        // 255 < 256 must hold bytewise too.
        assert!(record(&account, 255) < record(&account, 256));
        assert!(record(&account, 0).starts_with(&records_of(&account)));
    }

    #[test]
    fn test_accounts_do_not_share_prefixes() {
        let a = AccountId::new([1; 32]);
        let b = AccountId::new([2; 32]);
        assert!(!record(&b, 0).starts_with(&records_of(&a)));
    }

    #[test]
    fn test_decoders_reject_bad_lengths() {
        assert_eq!(decode_u64(&7u64.to_be_bytes()), Some(7));
        assert_eq!(decode_u64(&[1, 2, 3]), None);
        assert_eq!(decode_account(&[9; 32]), Some(AccountId::new([9; 32])));
        assert_eq!(decode_account(&[9; 31]), None);
    }
}
