//! # Domain Errors

use thiserror::Error;

/// Key-value backend errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Underlying error text.
        message: String,
    },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// What was wrong.
        message: String,
    },
}

impl From<std::io::Error> for KVStoreError {
    fn from(err: std::io::Error) -> Self {
        KVStoreError::IOError {
            message: err.to_string(),
        }
    }
}

/// Note store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoteStoreError {
    /// The backend failed.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// A stored value could not be decoded.
    #[error("Corrupt {what}: {message}")]
    Corrupt {
        /// Which value was being decoded.
        what: &'static str,
        /// Decoder message.
        message: String,
    },
}
