//! # Tahini Node Runtime
//!
//! Process wiring for the note synchronization service.
//!
//! ## Modular Structure
//!
//! - `container/` - `SyncNode` and `NodeConfig`
//! - `api/` - request/response types of the registration and query endpoints
//! - `handlers/` - background task following the ledger
//!
//! ## Data Flow
//!
//! ```text
//! Ledger ──BlockAppended──→ Event Bus ──→ LedgerFollower
//!                                               │
//!                                               ↓
//! register_account ──────────────────→ NoteSynchronizer(4) ──→ NoteStore(2)
//!                                                                  ↑
//! get_notes ──→ QueryService(5) ───────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod container;
pub mod handlers;

pub use api::{ApiError, ApiResponse, GetNotesRequest, NoteView, RegisterAccountRequest};
pub use container::{ConfigError, NodeConfig, NodeError, SyncNode};
pub use handlers::LedgerFollower;
