//! # Inbound Ports

use crate::domain::{RegistrationOutcome, RegistryError};
use shared_types::{AccountId, ViewingKey};

/// Registry API used by the synchronizer and the query service.
pub trait ViewingKeyRegistry: Send + Sync {
    /// Install `key` for `account`.
    ///
    /// Idempotent for the same key; `Conflict` for a different one.
    fn register(
        &self,
        account: AccountId,
        key: ViewingKey,
    ) -> Result<RegistrationOutcome, RegistryError>;

    /// The key registered for `account`, or `NotFound`.
    fn lookup(&self, account: &AccountId) -> Result<ViewingKey, RegistryError>;

    /// True if `account` is registered.
    fn contains(&self, account: &AccountId) -> bool;

    /// Snapshot of every registered account and its key.
    fn accounts(&self) -> Vec<(AccountId, ViewingKey)>;

    /// Number of registered accounts.
    fn len(&self) -> usize;

    /// True if nothing is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
