//! # Inbound Ports
//!
//! What the synchronizer offers the node runtime.

use crate::domain::{BackfillReport, BlockOutcome, SyncError, SyncReport};
use async_trait::async_trait;
use shared_types::{AccountId, Block, BlockNumber, OwnershipRecord, ViewingKey};

/// Note Synchronizer API - inbound port.
#[async_trait]
pub trait NoteSyncApi: Send + Sync {
    /// Apply the next ledger block to every registered account.
    ///
    /// A block below the next expected number is `AlreadyApplied`; a block
    /// above it is an `OrderingViolation` and changes nothing.
    async fn on_block_appended(&self, block: Block) -> Result<BlockOutcome, SyncError>;

    /// Register an account and scan the ledger history for it.
    async fn on_account_registered(
        &self,
        account: AccountId,
        key: ViewingKey,
    ) -> Result<BackfillReport, SyncError>;

    /// Apply every ledger block not applied yet and let stalled accounts
    /// catch up.
    async fn sync_to_tip(&self) -> Result<SyncReport, SyncError>;

    /// Ownership records of a registered account, in arrival order.
    async fn notes_for(&self, account: &AccountId) -> Result<Vec<OwnershipRecord>, SyncError>;

    /// Highest block scanned for a registered account.
    async fn watermark(&self, account: &AccountId) -> Result<Option<BlockNumber>, SyncError>;

    /// Highest block applied through the writer lane.
    async fn applied_height(&self) -> Option<BlockNumber>;

    /// Accounts whose last advance stalled or failed, sorted. They catch up
    /// on the next `sync_to_tip`.
    async fn lagging_accounts(&self) -> Vec<AccountId>;
}
