//! # Adapters Layer
//!
//! Ledger implementations of the `LedgerClient` port.

mod memory;

pub use memory::InMemoryLedger;
