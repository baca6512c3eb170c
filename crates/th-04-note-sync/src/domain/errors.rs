//! # Domain Errors

use shared_types::{BlockNumber, NoteId};
use th_01_ledger_client::LedgerError;
use th_02_note_store::NoteStoreError;
use th_03_key_registry::RegistryError;
use thiserror::Error;

/// Synchronizer error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A block arrived ahead of the next expected one. Nothing was applied.
    #[error("Block out of order: expected {expected}, got {got}")]
    OrderingViolation {
        /// Next block number the synchronizer can apply.
        expected: BlockNumber,
        /// Number of the block that was offered.
        got: BlockNumber,
    },

    /// Registration or lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The note store failed.
    #[error("Note store error: {0}")]
    Store(#[from] NoteStoreError),

    /// The ledger could not serve blocks.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A per-account scan task died.
    #[error("Scan task failed: {0}")]
    TaskFailed(String),
}

/// The ownership test could not evaluate a note.
///
/// Recoverable: the note is skipped and scanning continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The note payload is not something the test can interpret.
    #[error("Malformed note {note}: {reason}")]
    Malformed {
        /// The offending note.
        note: NoteId,
        /// Why it could not be evaluated.
        reason: String,
    },

    /// The capability itself failed.
    #[error("Ownership test failed: {0}")]
    Capability(String),
}
