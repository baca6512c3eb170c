//! # Scan Reports
//!
//! What a block application or a backfill did, for callers and logs.

use shared_types::{AccountId, BlockNumber};
use th_03_key_registry::RegistrationOutcome;

/// Result of scanning one account over one or more blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountScan {
    /// Blocks evaluated for the account.
    pub blocks_scanned: u64,
    /// New ownership records written.
    pub inserted: usize,
    /// Matches already on record.
    pub duplicates: usize,
    /// Matches refused because another account owns the note.
    pub rejected: usize,
    /// Notes the ownership test could not evaluate.
    pub match_errors: usize,
    /// The scan stopped early (timeout or a failed evaluation task).
    pub stalled: bool,
    /// Watermark after the scan.
    pub watermark: Option<BlockNumber>,
}

impl AccountScan {
    pub(crate) fn absorb(&mut self, other: &AccountScan) {
        self.blocks_scanned += other.blocks_scanned;
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
        self.rejected += other.rejected;
        self.match_errors += other.match_errors;
        self.stalled |= other.stalled;
        self.watermark = other.watermark.max(self.watermark);
    }
}

/// Result of applying one block to every registered account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReport {
    /// The applied block.
    pub block_number: BlockNumber,
    /// Accounts that were registered when the block was applied.
    pub accounts: usize,
    /// New ownership records written across all accounts.
    pub inserted: usize,
    /// Matches refused because another account owns the note.
    pub rejected: usize,
    /// Notes skipped because the ownership test failed on them.
    pub match_errors: usize,
    /// Accounts whose scan stalled; they catch up on a later advance.
    pub stalled: Vec<AccountId>,
}

/// What `on_block_appended` did with a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block was new and has been applied.
    Applied(BlockReport),
    /// The block was applied before. Nothing changed.
    AlreadyApplied,
}

/// Result of registering an account and scanning its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    /// The registered account.
    pub account: AccountId,
    /// Whether the registration was new.
    pub registration: RegistrationOutcome,
    /// What the historical scan found.
    pub scan: AccountScan,
}

/// Result of `sync_to_tip`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One report per block applied, in block order.
    pub applied: Vec<BlockReport>,
    /// Accounts brought up to the tip after having stalled earlier.
    pub recovered: Vec<AccountId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_accumulates() {
        let mut total = AccountScan::default();
        total.absorb(&AccountScan {
            blocks_scanned: 2,
            inserted: 1,
            watermark: Some(1),
            ..Default::default()
        });
        total.absorb(&AccountScan {
            blocks_scanned: 1,
            match_errors: 3,
            stalled: true,
            watermark: None,
            ..Default::default()
        });

        assert_eq!(total.blocks_scanned, 3);
        assert_eq!(total.inserted, 1);
        assert_eq!(total.match_errors, 3);
        assert!(total.stalled);
        assert_eq!(total.watermark, Some(1));
    }
}
