//! # Submission Inputs

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::{NoteId, NoteKind, NoteRecord};

/// Note bytes tagged with their commitment id, as handed to the ledger.
///
/// The ledger decides the note kind from which list the payload was
/// submitted in.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePayload {
    /// Commitment identifier.
    pub id: NoteId,
    /// Opaque note data.
    #[serde_as(as = "Bytes")]
    pub data: Vec<u8>,
}

impl NotePayload {
    /// Create a payload.
    pub fn new(id: NoteId, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    /// Stamp the payload with its kind.
    pub fn into_record(self, kind: NoteKind) -> NoteRecord {
        NoteRecord {
            id: self.id,
            payload: self.data,
            kind,
        }
    }
}
