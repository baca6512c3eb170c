//! # Store Entities

use shared_types::AccountId;

/// Result of appending an ownership record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was written.
    Inserted,
    /// The account already holds a record for this note. Nothing written.
    Duplicate,
    /// Another account already owns this note. Nothing written.
    OwnedByOther(AccountId),
}

impl AppendOutcome {
    /// True if the append wrote a record.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }
}
