//! # TH-01 Ledger Client
//!
//! The contract the synchronizer consumes from the ledger.
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Contract
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | `submit_transaction(added, removed)` | Appends exactly one block, returns its number |
//! | `blocks_from(height)` | Finite, replayable snapshot of blocks `height..=tip` |
//! | `height()` | Newest block number, `None` while the ledger is empty |
//!
//! Block numbers start at 0 and have no gaps. A block is appended before
//! any `BlockAppended` event for it is published, so a reader that sees the
//! event can always fetch the block.
//!
//! ## Module Structure
//!
//! ```text
//! th-01-ledger-client/
//! ├── domain/     # NotePayload, LedgerError
//! ├── ports/      # LedgerClient (outbound port for consumers)
//! └── adapters/   # InMemoryLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryLedger;
pub use domain::{LedgerError, NotePayload};
pub use ports::LedgerClient;
