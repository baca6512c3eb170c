//! # TH-02 Note Store
//!
//! Append-only persistence of ownership records, indexed by account.
//!
//! **Subsystem ID:** 2  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Guarantees
//!
//! | Guarantee | Mechanism |
//! |-----------|-----------|
//! | Atomic per-record visibility | One `atomic_batch_write` per append, readers under a read guard |
//! | No duplicate records | `idx:` index checked inside the write guard |
//! | One owner per note | `own:` index; a second owner gets `AppendOutcome::OwnedByOther` |
//! | Insertion order | Per-account sequence numbers stored big-endian |
//!
//! The store also keeps each account's scan watermark so a record and the
//! watermark covering it can be committed together.
//!
//! ## Module Structure
//!
//! ```text
//! th-02-note-store/
//! ├── domain/     # AppendOutcome, key layout, errors
//! ├── ports/      # NoteStore (inbound), KeyValueStore (outbound)
//! ├── adapters/   # InMemoryKVStore, FileBackedKVStore
//! ├── service.rs  # KvNoteStore
//! └── config.rs   # StoreConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileBackedKVStore, InMemoryKVStore};
pub use config::StoreConfig;
pub use domain::{AppendOutcome, KVStoreError, NoteStoreError};
pub use ports::{BatchOperation, KeyValueStore, NoteStore, ScanResult};
pub use service::KvNoteStore;
