//! Query request.

use shared_types::AccountId;

/// A signed request to read the notes of `account`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesQuery {
    /// Account whose notes are requested.
    pub account: AccountId,
    /// Signature over `message`, produced by the holder of the account's key.
    pub signature: Vec<u8>,
    /// Caller-chosen message the signature covers.
    pub message: Vec<u8>,
}

impl NotesQuery {
    /// Build a query.
    pub fn new(account: AccountId, signature: impl Into<Vec<u8>>, message: impl Into<Vec<u8>>) -> Self {
        Self {
            account,
            signature: signature.into(),
            message: message.into(),
        }
    }
}
