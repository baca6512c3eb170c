//! # Domain Errors

use shared_types::AccountId;
use th_02_note_store::KVStoreError;
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The account is registered with a different key.
    #[error("Account {0} is already registered with a different key")]
    Conflict(AccountId),

    /// The account is not registered.
    #[error("Account {0} not found")]
    NotFound(AccountId),

    /// The viewing key is unusable (empty).
    #[error("Invalid viewing key")]
    InvalidKey,

    /// The backing store failed.
    #[error("Registry storage error: {0}")]
    Storage(#[from] KVStoreError),

    /// A persisted entry could not be decoded.
    #[error("Corrupt registry entry: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_error_names_account() {
        let account = AccountId::new([0xEE; 32]);
        assert!(RegistryError::Conflict(account)
            .to_string()
            .contains(&account.to_hex()));
    }
}
