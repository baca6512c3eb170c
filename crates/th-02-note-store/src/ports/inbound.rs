//! # Inbound Ports
//!
//! The API the synchronizer (writer) and query service (reader) use.

use crate::domain::{AppendOutcome, NoteStoreError};
use shared_types::{AccountId, BlockNumber, NoteId, OwnershipRecord};

/// Durable mapping from account to its matched ownership records.
///
/// Appends are atomic per record: a concurrent reader sees the store either
/// before or after an append, never in between.
pub trait NoteStore: Send + Sync {
    /// Append one ownership record.
    fn append(&self, record: OwnershipRecord) -> Result<AppendOutcome, NoteStoreError>;

    /// Append the matches of one scanned block and advance the account's
    /// watermark to `scanned_through`, as a single atomic write.
    ///
    /// Returns one outcome per input record, in input order.
    fn commit_scan(
        &self,
        account: &AccountId,
        records: Vec<OwnershipRecord>,
        scanned_through: BlockNumber,
    ) -> Result<Vec<AppendOutcome>, NoteStoreError>;

    /// All records for `account`, in insertion order.
    fn notes_for(&self, account: &AccountId) -> Result<Vec<OwnershipRecord>, NoteStoreError>;

    /// The account that owns `note`, if any.
    fn owner_of(&self, note: &NoteId) -> Result<Option<AccountId>, NoteStoreError>;

    /// Highest block scanned for `account`, `None` if nothing was scanned yet.
    fn watermark(&self, account: &AccountId) -> Result<Option<BlockNumber>, NoteStoreError>;

    /// Raise the watermark. A value at or below the current one is ignored.
    fn set_watermark(&self, account: &AccountId, height: BlockNumber)
        -> Result<(), NoteStoreError>;

    /// Total number of records across all accounts.
    fn record_count(&self) -> Result<usize, NoteStoreError>;
}
