use super::{apply, scan, Table};
use crate::domain::KVStoreError;
use crate::ports::{BatchOperation, KeyValueStore, ScanResult};

/// `BTreeMap` table. Contents vanish with the process.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: Table,
}

impl InMemoryKVStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Nothing here can fail half way.
        apply(&mut self.data, operations);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_and_remove() {
        let mut store = InMemoryKVStore::new();
        assert!(store.is_empty());

        store.put(b"wm:alice", &3u64.to_be_bytes()).unwrap();
        store.put(b"wm:alice", &7u64.to_be_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(b"wm:alice").unwrap(),
            Some(7u64.to_be_bytes().to_vec())
        );

        store.delete(b"wm:alice").unwrap();
        store.delete(b"wm:nobody").unwrap();
        assert!(!store.exists(b"wm:alice").unwrap());
    }

    #[test]
    fn test_batch_mixes_steps_in_order() {
        let mut store = InMemoryKVStore::new();
        store.put(b"stale", b"x").unwrap();

        store
            .atomic_batch_write(vec![
                BatchOperation::put(&b"rec:1"[..], &b"first"[..]),
                BatchOperation::delete(&b"stale"[..]),
                BatchOperation::put(&b"rec:1"[..], &b"second"[..]),
            ])
            .unwrap();

        assert_eq!(store.get(b"rec:1").unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.get(b"stale").unwrap(), None);
    }

    #[test]
    fn test_prefix_scan_is_ordered_and_bounded() {
        let mut store = InMemoryKVStore::new();

        store.put(b"rec:2", b"two").unwrap();
        store.put(b"rec:1", b"one").unwrap();
        store.put(b"red", b"other").unwrap();
        store.put(b"idx:1", b"index").unwrap();

        let values: Vec<_> = store
            .prefix_scan(b"rec:")
            .unwrap()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, vec![b"one".to_vec(), b"two".to_vec()]);
    }
}
