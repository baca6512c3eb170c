//! # Restart Durability
//!
//! A synchronizer rebuilt over the same file-backed stores resumes where
//! the previous one stopped: registrations reload, records survive, and
//! blocks under an account's watermark are not scanned again.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use shared_types::{AccountId, NoteId, ViewingKey};
    use th_01_ledger_client::{InMemoryLedger, LedgerClient, NotePayload};
    use th_02_note_store::{FileBackedKVStore, KvNoteStore, NoteStore};
    use th_03_key_registry::{KeyRegistry, ViewingKeyRegistry};
    use th_04_note_sync::test_utils::CountingOwnership;
    use th_04_note_sync::{NoteSyncApi, NoteSynchronizer, SyncConfig};

    struct Process {
        registry: Arc<KeyRegistry>,
        store: Arc<KvNoteStore<FileBackedKVStore>>,
        sync: NoteSynchronizer,
    }

    /// Open stores under `dir` and build a synchronizer against `ledger`,
    /// as a fresh node process would.
    fn start(dir: &Path, ledger: Arc<InMemoryLedger>, counter: &CountingOwnership) -> Process {
        let notes = FileBackedKVStore::open(dir.join("notes.db"), false).unwrap();
        let keys = FileBackedKVStore::open(dir.join("registry.db"), false).unwrap();
        let registry = Arc::new(KeyRegistry::load(Box::new(keys)).unwrap());
        let store = Arc::new(KvNoteStore::new(notes));
        let sync = NoteSynchronizer::new(
            SyncConfig::for_testing(),
            registry.clone(),
            ledger,
            store.clone(),
            Arc::new(counter.clone()),
            None,
        );
        Process {
            registry,
            store,
            sync,
        }
    }

    fn account(tag: u8) -> AccountId {
        AccountId::new([tag; 32])
    }

    fn key(tag: u8) -> ViewingKey {
        ViewingKey::from_bytes(vec![tag; 4])
    }

    fn note(id: u8, owner: u8) -> NotePayload {
        let mut payload = vec![owner; 4];
        payload.push(id);
        NotePayload::new(NoteId::new([id; 32]), payload)
    }

    #[tokio::test]
    async fn test_restart_resumes_without_rescanning() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        let counter = CountingOwnership::default();

        {
            let first = start(dir.path(), ledger.clone(), &counter);
            first.sync.on_account_registered(account(1), key(1)).await.unwrap();
            for id in [10, 20] {
                ledger.submit_transaction(vec![note(id, 1)], vec![note(id + 1, 1)]).await.unwrap();
                first.sync.sync_to_tip().await.unwrap();
            }
            assert_eq!(first.store.record_count().unwrap(), 4);
        }
        assert_eq!(counter.calls(), 4);

        // The ledger moved on while the node was down.
        ledger.submit_transaction(vec![note(30, 1)], vec![]).await.unwrap();

        let second = start(dir.path(), ledger.clone(), &counter);
        assert!(second.registry.contains(&account(1)));
        assert_eq!(second.sync.applied_height().await, None);

        let report = second.sync.sync_to_tip().await.unwrap();
        assert_eq!(report.applied.len(), 3);
        // Only block 2 was evaluated: blocks 0 and 1 sit under the watermark.
        assert_eq!(counter.calls(), 5);
        assert_eq!(second.sync.notes_for(&account(1)).await.unwrap().len(), 5);
        assert_eq!(second.sync.watermark(&account(1)).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_registration_persists_before_backfill_completes() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        let counter = CountingOwnership::default();
        ledger.submit_transaction(vec![note(10, 2)], vec![]).await.unwrap();

        {
            let first = start(dir.path(), ledger.clone(), &counter);
            ledger.set_unavailable(true);
            assert!(first.sync.on_account_registered(account(2), key(2)).await.is_err());
            ledger.set_unavailable(false);
        }

        let second = start(dir.path(), ledger, &counter);
        // Replaying block 0 on the fresh lane covers the missed backfill.
        let report = second.sync.sync_to_tip().await.unwrap();
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].inserted, 1);
        assert_eq!(second.sync.notes_for(&account(2)).await.unwrap().len(), 1);
    }
}
