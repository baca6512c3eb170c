//! # TH-04 Note Synchronizer
//!
//! Scans ledger blocks, resolves anonymous note commitments to registered
//! accounts, and keeps each account's ownership records complete.
//!
//! **Subsystem ID:** 4  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Guarantees
//!
//! | Property | How |
//! |----------|-----|
//! | Exactly once per (block, account) | Per-account watermark committed atomically with the block's matches |
//! | Registration order is irrelevant | Backfill and live scans share one code path and one watermark |
//! | Bad notes never stop a scan | Per-note `MatchError` is logged and skipped |
//! | One stuck account never starves the rest | One task per account, evaluation on blocking threads under a timeout |
//! | A hung ownership test holds one thread | Overdue evaluations are awaited, never re-spawned |
//! | Stalled accounts catch up | Lagging set, drained by `sync_to_tip` |
//! | Out-of-order blocks change nothing | Writer lane rejects gaps with `OrderingViolation` |
//!
//! ## Module Structure
//!
//! ```text
//! th-04-note-sync/
//! ├── domain/      # Reports, SyncError, MatchError
//! ├── ports/       # NoteSyncApi (inbound), OwnershipTest + collaborators (outbound)
//! ├── adapters/    # TrialDecryption ownership test
//! ├── service/     # NoteSynchronizer
//! └── config.rs    # SyncConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::TrialDecryption;
pub use config::SyncConfig;
pub use domain::{
    AccountScan, BackfillReport, BlockOutcome, BlockReport, MatchError, SyncError, SyncReport,
};
pub use ports::{NoteSyncApi, OwnershipTest};
pub use service::NoteSynchronizer;
