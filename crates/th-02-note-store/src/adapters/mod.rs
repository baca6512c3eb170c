//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

mod file;
mod memory;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;

use crate::ports::{BatchOperation, ScanResult};
use std::collections::BTreeMap;

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

fn apply(table: &mut Table, operations: Vec<BatchOperation>) {
    for op in operations {
        match op {
            BatchOperation::Put { key, value } => {
                table.insert(key, value);
            }
            BatchOperation::Delete { key } => {
                table.remove(&key);
            }
        }
    }
}

fn scan(table: &Table, prefix: &[u8]) -> ScanResult {
    table
        .range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
