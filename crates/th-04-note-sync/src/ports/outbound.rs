//! # Outbound Ports
//!
//! Capabilities the synchronizer depends on. The ledger, the note store and
//! the registry ports live in their own subsystems and are re-exported here.

use crate::domain::MatchError;
use shared_types::{NoteRecord, ViewingKey};

pub use shared_bus::EventPublisher;
pub use th_01_ledger_client::LedgerClient;
pub use th_02_note_store::NoteStore;
pub use th_03_key_registry::ViewingKeyRegistry;

/// Ownership predicate - outbound port.
///
/// Must be pure: the same key and note always give the same answer, so the
/// note store can be rebuilt by replaying the ledger. Implementations are
/// expected to be selective (one key per note) and are run on blocking
/// threads, so they may be CPU heavy.
pub trait OwnershipTest: Send + Sync + 'static {
    /// True if `note` belongs to the holder of `key`.
    fn owns(&self, key: &ViewingKey, note: &NoteRecord) -> Result<bool, MatchError>;
}
