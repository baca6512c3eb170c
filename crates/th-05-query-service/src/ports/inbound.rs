//! # Inbound Ports

use crate::domain::{NotesQuery, QueryError};
use shared_types::OwnershipRecord;

/// Read API exposed to the outer request layer.
pub trait NoteQueryApi: Send + Sync {
    /// Verify `query` and return the account's records in arrival order.
    fn get_notes(&self, query: &NotesQuery) -> Result<Vec<OwnershipRecord>, QueryError>;
}
