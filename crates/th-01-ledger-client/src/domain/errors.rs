//! # Domain Errors

use shared_types::NoteId;
use thiserror::Error;

/// Ledger client error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A submission carried no notes at all.
    #[error("Transaction has no notes")]
    EmptyTransaction,

    /// A note id is already on the ledger or repeated in the submission.
    /// Note ids are globally unique across both note kinds.
    #[error("Duplicate note id: {0}")]
    DuplicateNoteId(NoteId),

    /// The ledger could not be reached.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}
