//! Query errors.

use th_02_note_store::NoteStoreError;
use thiserror::Error;

/// Errors returned to a caller of the query service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Unknown account or failed signature check.
    #[error("Unauthorized")]
    Unauthorized,

    /// The note store could not be read.
    #[error("Note store failure: {0}")]
    Store(#[from] NoteStoreError),
}
