//! # Outbound Ports

use shared_types::{AccountId, ViewingKey};

pub use th_02_note_store::NoteStore;
pub use th_03_key_registry::ViewingKeyRegistry;

/// Checks that a request was signed by the holder of an account's key.
///
/// The scheme is pluggable; [`crate::Ed25519RequestVerifier`] is the
/// reference implementation.
pub trait RequestVerifier: Send + Sync {
    /// True iff `signature` over `message` is valid for `account` and `key`.
    fn verify(&self, account: &AccountId, key: &ViewingKey, message: &[u8], signature: &[u8]) -> bool;
}
