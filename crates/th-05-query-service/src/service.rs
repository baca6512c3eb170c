//! # Query Service

use crate::domain::{NotesQuery, QueryError};
use crate::ports::{NoteQueryApi, NoteStore, RequestVerifier, ViewingKeyRegistry};
use shared_types::OwnershipRecord;
use std::sync::Arc;
use th_03_key_registry::RegistryError;
use tracing::{debug, warn};

/// Authenticated read access to the note store.
///
/// Holds no locks of its own; concurrent queries only contend on the
/// store's read guard.
pub struct QueryService {
    registry: Arc<dyn ViewingKeyRegistry>,
    store: Arc<dyn NoteStore>,
    verifier: Arc<dyn RequestVerifier>,
}

impl QueryService {
    /// Create a query service over shared registry and store handles.
    pub fn new(
        registry: Arc<dyn ViewingKeyRegistry>,
        store: Arc<dyn NoteStore>,
        verifier: Arc<dyn RequestVerifier>,
    ) -> Self {
        Self {
            registry,
            store,
            verifier,
        }
    }
}

impl NoteQueryApi for QueryService {
    fn get_notes(&self, query: &NotesQuery) -> Result<Vec<OwnershipRecord>, QueryError> {
        let key = match self.registry.lookup(&query.account) {
            Ok(key) => key,
            Err(RegistryError::NotFound(_)) => {
                debug!("[th-05] Query for unknown account {}", query.account);
                return Err(QueryError::Unauthorized);
            }
            Err(e) => {
                warn!("[th-05] Registry lookup failed for {}: {}", query.account, e);
                return Err(QueryError::Unauthorized);
            }
        };

        if !self
            .verifier
            .verify(&query.account, &key, &query.message, &query.signature)
        {
            warn!("[th-05] Signature check failed for {}", query.account);
            return Err(QueryError::Unauthorized);
        }

        let records = self.store.notes_for(&query.account)?;
        debug!(
            "[th-05] Returning {} records for {}",
            records.len(),
            query.account
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Ed25519RequestVerifier;
    use shared_crypto::sign_request;
    use shared_types::{AccountId, NoteId, ViewingKey};
    use th_02_note_store::{InMemoryKVStore, KvNoteStore};
    use th_03_key_registry::KeyRegistry;

    struct Fixture {
        registry: Arc<KeyRegistry>,
        store: Arc<KvNoteStore<InMemoryKVStore>>,
        service: QueryService,
    }

    fn make_test_service() -> Fixture {
        let registry = Arc::new(KeyRegistry::in_memory());
        let store = Arc::new(KvNoteStore::new(InMemoryKVStore::new()));
        let service = QueryService::new(
            registry.clone(),
            store.clone(),
            Arc::new(Ed25519RequestVerifier),
        );
        Fixture {
            registry,
            store,
            service,
        }
    }

    fn signed(account: AccountId, key: &ViewingKey, message: &[u8]) -> NotesQuery {
        let sig = sign_request(key.as_bytes(), account.as_bytes(), message).unwrap();
        NotesQuery::new(account, sig.as_bytes().to_vec(), message)
    }

    #[test]
    fn test_registered_without_notes_is_empty() {
        let f = make_test_service();
        let account = AccountId::new([1; 32]);
        let key = ViewingKey::from_bytes(vec![7; 32]);
        f.registry.register(account, key.clone()).unwrap();

        assert_eq!(f.service.get_notes(&signed(account, &key, b"hi")), Ok(vec![]));
    }

    #[test]
    fn test_returns_records_in_arrival_order() {
        let f = make_test_service();
        let account = AccountId::new([1; 32]);
        let key = ViewingKey::from_bytes(vec![7; 32]);
        f.registry.register(account, key.clone()).unwrap();

        let later = OwnershipRecord {
            account_id: account,
            note_id: NoteId::new([2; 32]),
            block_number: 4,
            is_nullifier: true,
        };
        let earlier = OwnershipRecord {
            note_id: NoteId::new([1; 32]),
            block_number: 1,
            is_nullifier: false,
            ..later
        };
        f.store.append(later).unwrap();
        f.store.append(earlier).unwrap();

        let records = f.service.get_notes(&signed(account, &key, b"hi")).unwrap();
        assert_eq!(records, vec![later, earlier]);
    }

    #[test]
    fn test_bad_signature_is_unauthorized() {
        let f = make_test_service();
        let account = AccountId::new([1; 32]);
        let key = ViewingKey::from_bytes(vec![7; 32]);
        f.registry.register(account, key).unwrap();

        let forged = signed(account, &ViewingKey::from_bytes(vec![8; 32]), b"hi");
        assert_eq!(f.service.get_notes(&forged), Err(QueryError::Unauthorized));
    }

    #[test]
    fn test_unknown_account_is_unauthorized() {
        let f = make_test_service();
        let account = AccountId::new([5; 32]);
        let key = ViewingKey::from_bytes(vec![7; 32]);
        assert_eq!(
            f.service.get_notes(&signed(account, &key, b"hi")),
            Err(QueryError::Unauthorized)
        );
    }
}
