//! # Store Configuration

use crate::adapters::{FileBackedKVStore, InMemoryKVStore};
use crate::domain::KVStoreError;
use crate::ports::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the node keeps its key-value data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory for the store files. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,

    /// File name of the ownership-record store.
    pub notes_file: String,

    /// File name of the viewing-key registry.
    pub registry_file: String,

    /// fsync every write before it is acknowledged.
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from("./data")),
            notes_file: "notes.db".to_string(),
            registry_file: "registry.db".to_string(),
            sync_writes: true,
        }
    }
}

impl StoreConfig {
    /// Memory-only store for tests.
    pub fn for_testing() -> Self {
        Self {
            data_dir: None,
            sync_writes: false,
            ..Self::default()
        }
    }

    /// Open the backend holding ownership records.
    pub fn open_notes(&self) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
        self.open(&self.notes_file)
    }

    /// Open the backend holding registered viewing keys.
    pub fn open_registry(&self) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
        self.open(&self.registry_file)
    }

    fn open(&self, file: &str) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
        Ok(match &self.data_dir {
            Some(dir) => Box::new(FileBackedKVStore::open(dir.join(file), self.sync_writes)?),
            None => Box::new(InMemoryKVStore::new()),
        })
    }
}
