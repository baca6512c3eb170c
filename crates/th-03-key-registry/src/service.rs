//! # Registry Service

use crate::domain::{RegistrationOutcome, RegistryError};
use crate::ports::ViewingKeyRegistry;
use parking_lot::{Mutex, RwLock};
use shared_types::{AccountId, ViewingKey};
use std::collections::BTreeMap;
use th_02_note_store::{InMemoryKVStore, KeyValueStore};
use tracing::{debug, info, warn};

const KEY_PREFIX: &[u8] = b"key:";

fn storage_key(account: &AccountId) -> Vec<u8> {
    let mut key = KEY_PREFIX.to_vec();
    key.extend_from_slice(account.as_bytes());
    key
}

/// Write-through viewing-key registry.
///
/// Lookups are served from memory. Registrations hold the backend lock
/// across the durable write so the map never runs ahead of disk.
pub struct KeyRegistry {
    keys: RwLock<BTreeMap<AccountId, ViewingKey>>,
    backend: Mutex<Box<dyn KeyValueStore>>,
}

impl KeyRegistry {
    /// An empty registry that is not persisted.
    pub fn in_memory() -> Self {
        Self {
            keys: RwLock::new(BTreeMap::new()),
            backend: Mutex::new(Box::new(InMemoryKVStore::new())),
        }
    }

    /// Load every entry persisted in `backend`.
    pub fn load(backend: Box<dyn KeyValueStore>) -> Result<Self, RegistryError> {
        let mut keys = BTreeMap::new();
        for (raw_key, value) in backend.prefix_scan(KEY_PREFIX)? {
            let id = raw_key
                .get(KEY_PREFIX.len()..)
                .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
                .map(AccountId::new)
                .ok_or_else(|| {
                    RegistryError::Corrupt(format!("bad key length {}", raw_key.len()))
                })?;
            if value.is_empty() {
                return Err(RegistryError::Corrupt(format!("empty viewing key for {}", id)));
            }
            keys.insert(id, ViewingKey::from_bytes(value));
        }

        info!("[th-03] Loaded {} registered accounts", keys.len());
        Ok(Self {
            keys: RwLock::new(keys),
            backend: Mutex::new(backend),
        })
    }
}

impl ViewingKeyRegistry for KeyRegistry {
    fn register(
        &self,
        account: AccountId,
        key: ViewingKey,
    ) -> Result<RegistrationOutcome, RegistryError> {
        if key.is_empty() {
            return Err(RegistryError::InvalidKey);
        }

        let mut backend = self.backend.lock();

        if let Some(existing) = self.keys.read().get(&account) {
            return if *existing == key {
                debug!("[th-03] Account {} re-registered with the same key", account);
                Ok(RegistrationOutcome::AlreadyRegistered)
            } else {
                warn!("[th-03] Conflicting key for account {}", account);
                Err(RegistryError::Conflict(account))
            };
        }

        backend.put(&storage_key(&account), key.as_bytes())?;
        self.keys.write().insert(account, key);

        info!("[th-03] Registered account {}", account);
        Ok(RegistrationOutcome::Created)
    }

    fn lookup(&self, account: &AccountId) -> Result<ViewingKey, RegistryError> {
        self.keys
            .read()
            .get(account)
            .cloned()
            .ok_or(RegistryError::NotFound(*account))
    }

    fn contains(&self, account: &AccountId) -> bool {
        self.keys.read().contains_key(account)
    }

    fn accounts(&self) -> Vec<(AccountId, ViewingKey)> {
        self.keys
            .read()
            .iter()
            .map(|(id, key)| (*id, key.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.keys.read().len()
    }
}
