//! # Note Store Service
//!
//! `NoteStore` over any `KeyValueStore`.

use crate::domain::{keys, AppendOutcome, KVStoreError, NoteStoreError};
use crate::ports::{BatchOperation, KeyValueStore, NoteStore};
use parking_lot::RwLock;
use shared_types::{AccountId, BlockNumber, NoteId, OwnershipRecord};
use tracing::{debug, error, warn};

/// Ownership records and watermarks kept in a key-value store.
///
/// Writers serialize on the write guard and land each change with one
/// `atomic_batch_write`. Readers share the read guard.
pub struct KvNoteStore<KV: KeyValueStore> {
    kv: RwLock<KV>,
}

impl<KV: KeyValueStore> KvNoteStore<KV> {
    /// Wrap a key-value backend.
    pub fn new(kv: KV) -> Self {
        Self {
            kv: RwLock::new(kv),
        }
    }

    fn read_u64(kv: &KV, key: &[u8], what: &'static str) -> Result<Option<u64>, NoteStoreError> {
        match kv.get(key)? {
            None => Ok(None),
            Some(bytes) => keys::decode_u64(&bytes)
                .map(Some)
                .ok_or_else(|| corrupt(what, format!("expected 8 bytes, got {}", bytes.len()))),
        }
    }

    /// Plan the writes for one record against the current state plus
    /// whatever earlier records in the same batch already planned.
    fn plan_append(
        kv: &KV,
        record: &OwnershipRecord,
        next_seq: &mut Option<u64>,
        pending: &mut Vec<(NoteId, AccountId)>,
        ops: &mut Vec<BatchOperation>,
    ) -> Result<AppendOutcome, NoteStoreError> {
        let account = record.account_id;
        let note = record.note_id;

        let owner = match pending.iter().find(|(n, _)| *n == note) {
            Some((_, a)) => Some(*a),
            None => match kv.get(&keys::owner(&note))? {
                None => None,
                Some(bytes) => Some(
                    keys::decode_account(&bytes)
                        .ok_or_else(|| corrupt("owner", format!("{} bytes", bytes.len())))?,
                ),
            },
        };
        match owner {
            Some(existing) if existing == account => return Ok(AppendOutcome::Duplicate),
            Some(existing) => return Ok(AppendOutcome::OwnedByOther(existing)),
            None => {}
        }

        let seq = match *next_seq {
            Some(seq) => seq,
            None => Self::read_u64(kv, &keys::sequence(&account), "sequence")?.unwrap_or(0),
        };
        let encoded = bincode::serialize(record).map_err(|e| corrupt("record", e.to_string()))?;

        ops.push(BatchOperation::put(keys::record(&account, seq), encoded));
        ops.push(BatchOperation::put(keys::owner(&note), account.as_bytes().to_vec()));
        ops.push(BatchOperation::put(
            keys::sequence(&account),
            (seq + 1).to_be_bytes().to_vec(),
        ));
        *next_seq = Some(seq + 1);
        pending.push((note, account));

        Ok(AppendOutcome::Inserted)
    }
}

fn corrupt(what: &'static str, message: String) -> NoteStoreError {
    NoteStoreError::Corrupt { what, message }
}

fn log_storage(err: KVStoreError) -> NoteStoreError {
    error!("[th-02] Storage failure: {}", err);
    NoteStoreError::Storage(err)
}

impl<KV: KeyValueStore> NoteStore for KvNoteStore<KV> {
    fn append(&self, record: OwnershipRecord) -> Result<AppendOutcome, NoteStoreError> {
        let mut kv = self.kv.write();
        let mut ops = Vec::with_capacity(4);
        let outcome = Self::plan_append(&kv, &record, &mut None, &mut Vec::new(), &mut ops)?;
        if !ops.is_empty() {
            kv.atomic_batch_write(ops).map_err(log_storage)?;
        }
        Ok(outcome)
    }

    fn commit_scan(
        &self,
        account: &AccountId,
        records: Vec<OwnershipRecord>,
        scanned_through: BlockNumber,
    ) -> Result<Vec<AppendOutcome>, NoteStoreError> {
        let mut kv = self.kv.write();

        let mut ops = Vec::with_capacity(records.len() * 4 + 1);
        let mut next_seq = None;
        let mut pending = Vec::with_capacity(records.len());
        let mut outcomes = Vec::with_capacity(records.len());

        for record in &records {
            if record.account_id != *account {
                warn!(
                    "[th-02] Dropping record for {} from scan commit of {}",
                    record.account_id, account
                );
                continue;
            }
            outcomes.push(Self::plan_append(&kv, record, &mut next_seq, &mut pending, &mut ops)?);
        }

        let current = Self::read_u64(&kv, &keys::watermark(account), "watermark")?;
        if current.map_or(true, |wm| scanned_through > wm) {
            ops.push(BatchOperation::put(
                keys::watermark(account),
                scanned_through.to_be_bytes().to_vec(),
            ));
        }

        if !ops.is_empty() {
            kv.atomic_batch_write(ops).map_err(log_storage)?;
        }
        debug!(
            "[th-02] Committed scan of {} through block {} ({} records)",
            account,
            scanned_through,
            outcomes.iter().filter(|o| o.is_inserted()).count()
        );
        Ok(outcomes)
    }

    fn notes_for(&self, account: &AccountId) -> Result<Vec<OwnershipRecord>, NoteStoreError> {
        let kv = self.kv.read();
        let rows = kv.prefix_scan(&keys::records_of(account))?;
        drop(kv);

        rows.into_iter()
            .map(|(_, value)| {
                bincode::deserialize(&value).map_err(|e| corrupt("record", e.to_string()))
            })
            .collect()
    }

    fn owner_of(&self, note: &NoteId) -> Result<Option<AccountId>, NoteStoreError> {
        let kv = self.kv.read();
        match kv.get(&keys::owner(note))? {
            None => Ok(None),
            Some(bytes) => keys::decode_account(&bytes)
                .map(Some)
                .ok_or_else(|| corrupt("owner", format!("{} bytes", bytes.len()))),
        }
    }

    fn watermark(&self, account: &AccountId) -> Result<Option<BlockNumber>, NoteStoreError> {
        let kv = self.kv.read();
        Self::read_u64(&kv, &keys::watermark(account), "watermark")
    }

    fn set_watermark(
        &self,
        account: &AccountId,
        height: BlockNumber,
    ) -> Result<(), NoteStoreError> {
        self.commit_scan(account, Vec::new(), height).map(|_| ())
    }

    fn record_count(&self) -> Result<usize, NoteStoreError> {
        Ok(self.kv.read().prefix_scan(&keys::all_records())?.len())
    }
}
