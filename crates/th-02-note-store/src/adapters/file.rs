use super::{apply, scan, Table};
use crate::domain::KVStoreError;
use crate::ports::{BatchOperation, KeyValueStore, ScanResult};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File-backed key-value store.
///
/// Keeps the whole table in memory and rewrites the file on every write,
/// through a temp file and a rename so a crash never leaves a torn file.
///
/// File format: `[key_len:u32 LE][key][value_len:u32 LE][value]...`
pub struct FileBackedKVStore {
    data: Table,
    path: PathBuf,
    sync_writes: bool,
}

impl FileBackedKVStore {
    /// Open (or create) the store at `path`.
    ///
    /// A file that ends in the middle of an entry is rejected rather than
    /// silently truncated.
    pub fn open<P: AsRef<Path>>(path: P, sync_writes: bool) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                let data = Self::decode(&bytes)?;
                info!(
                    "[th-02] Loaded {} keys from {}",
                    data.len(),
                    path.display()
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("[th-02] No existing storage file at {}", path.display());
                Table::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            data,
            path,
            sync_writes,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(bytes: &[u8]) -> Result<Table, KVStoreError> {
        fn take<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], KVStoreError> {
            let end = cursor.checked_add(len).filter(|end| *end <= bytes.len()).ok_or_else(|| {
                KVStoreError::CorruptionError {
                    message: format!("entry truncated at offset {}", cursor),
                }
            })?;
            let slice = &bytes[*cursor..end];
            *cursor = end;
            Ok(slice)
        }

        fn take_len(bytes: &[u8], cursor: &mut usize) -> Result<usize, KVStoreError> {
            let raw = take(bytes, cursor, 4)?;
            let mut len = [0u8; 4];
            len.copy_from_slice(raw);
            Ok(u32::from_le_bytes(len) as usize)
        }

        let mut data = Table::new();
        let mut cursor = 0;
        while cursor < bytes.len() {
            let key_len = take_len(bytes, &mut cursor)?;
            let key = take(bytes, &mut cursor, key_len)?.to_vec();
            let value_len = take_len(bytes, &mut cursor)?;
            let value = take(bytes, &mut cursor, value_len)?.to_vec();
            data.insert(key, value);
        }
        Ok(data)
    }

    fn encode(data: &Table) -> Result<Vec<u8>, KVStoreError> {
        let mut bytes = Vec::new();
        for (key, value) in data {
            for part in [key, value] {
                let len = u32::try_from(part.len()).map_err(|_| KVStoreError::IOError {
                    message: format!("entry of {} bytes exceeds u32 length prefix", part.len()),
                })?;
                bytes.extend_from_slice(&len.to_le_bytes());
                bytes.extend_from_slice(part);
            }
        }
        Ok(bytes)
    }

    fn save(&self, data: &Table) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = Self::encode(data)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(&bytes)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Stage, persist, then swap: a failed save leaves memory untouched.
        let mut staged = self.data.clone();
        apply(&mut staged, operations);
        self.save(&staged)?;
        self.data = staged;
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}
