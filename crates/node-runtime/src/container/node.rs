//! # Sync Node
//!
//! The process-wide container. Built once at startup; every component gets
//! its collaborators as `Arc` handles.
//!
//! ## Initialization Order
//!
//! 1. Event bus
//! 2. Ledger client (publishes on the bus)
//! 3. Note store and key registry (opened from `StoreConfig`)
//! 4. Synchronizer
//! 5. Query service

use crate::api::{ApiError, ApiResponse, GetNotesRequest, NoteView, RegisterAccountRequest};
use crate::container::config::{ConfigError, NodeConfig};
use crate::handlers::LedgerFollower;
use shared_bus::{EventPublisher, InMemoryEventBus};
use shared_types::{AccountId, BlockNumber, ViewingKey};
use std::sync::Arc;
use th_01_ledger_client::{InMemoryLedger, LedgerClient, LedgerError, NotePayload};
use th_02_note_store::{KVStoreError, KvNoteStore, NoteStore};
use th_03_key_registry::{KeyRegistry, RegistrationOutcome, RegistryError, ViewingKeyRegistry};
use th_04_note_sync::{
    NoteSyncApi, NoteSynchronizer, OwnershipTest, SyncError, SyncReport, TrialDecryption,
};
use th_05_query_service::{
    Ed25519RequestVerifier, NoteQueryApi, NotesQuery, QueryError, QueryService, RequestVerifier,
};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Errors raised while building or driving the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Invalid configuration.
    #[error("Configuration: {0}")]
    Config(#[from] ConfigError),

    /// A store backend could not be opened.
    #[error("Storage: {0}")]
    Storage(#[from] KVStoreError),

    /// The registry could not be loaded.
    #[error("Registry: {0}")]
    Registry(#[from] RegistryError),

    /// The ledger rejected or failed a call.
    #[error("Ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// Synchronization failed.
    #[error("Sync: {0}")]
    Sync(#[from] SyncError),
}

/// The Tahini node.
pub struct SyncNode {
    config: NodeConfig,
    bus: Arc<InMemoryEventBus>,
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn NoteStore>,
    registry: Arc<KeyRegistry>,
    synchronizer: NoteSynchronizer,
    query: QueryService,
    shutdown_tx: watch::Sender<bool>,
}

impl SyncNode {
    /// Build a node with the in-memory ledger, trial decryption and Ed25519
    /// request signatures.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let ledger = Arc::new(InMemoryLedger::with_bus(
            bus.clone() as Arc<dyn EventPublisher>
        ));
        Self::with_components(
            config,
            bus,
            ledger,
            Arc::new(TrialDecryption),
            Arc::new(Ed25519RequestVerifier),
        )
    }

    /// Build a node around caller-supplied capabilities.
    ///
    /// `ledger` should publish `BlockAppended` on `bus` for the follower to
    /// see live blocks; without that, blocks are picked up by
    /// [`SyncNode::resume`] and [`SyncNode::submit_transaction`].
    pub fn with_components(
        config: NodeConfig,
        bus: Arc<InMemoryEventBus>,
        ledger: Arc<dyn LedgerClient>,
        ownership: Arc<dyn OwnershipTest>,
        verifier: Arc<dyn RequestVerifier>,
    ) -> Result<Self, NodeError> {
        config.validate()?;

        let store: Arc<dyn NoteStore> = Arc::new(KvNoteStore::new(config.store.open_notes()?));
        let registry = Arc::new(KeyRegistry::load(config.store.open_registry()?)?);
        info!(
            "[node] Stores opened ({}): {} accounts, {} records",
            match &config.store.data_dir {
                Some(dir) => dir.display().to_string(),
                None => "in memory".to_string(),
            },
            registry.len(),
            store.record_count().unwrap_or_default()
        );

        let synchronizer = NoteSynchronizer::new(
            config.sync.clone(),
            registry.clone(),
            ledger.clone(),
            store.clone(),
            ownership,
            Some(bus.clone() as Arc<dyn EventPublisher>),
        );
        let query = QueryService::new(registry.clone(), store.clone(), verifier);
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            bus,
            ledger,
            store,
            registry,
            synchronizer,
            query,
            shutdown_tx,
        })
    }

    /// Configuration the node was built with.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// The ledger client.
    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    /// The note store.
    pub fn store(&self) -> &Arc<dyn NoteStore> {
        &self.store
    }

    /// The key registry.
    pub fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }

    /// The synchronizer.
    pub fn synchronizer(&self) -> &NoteSynchronizer {
        &self.synchronizer
    }

    /// Apply every ledger block not yet applied and catch up lagging
    /// accounts. Run once at startup.
    pub async fn resume(&self) -> Result<SyncReport, NodeError> {
        let report = self.synchronizer.sync_to_tip().await?;
        info!(
            "[node] Resumed: {} blocks applied, {} accounts recovered",
            report.applied.len(),
            report.recovered.len()
        );
        Ok(report)
    }

    /// Submit a transaction and synchronize through the new block before
    /// returning its number.
    pub async fn submit_transaction(
        &self,
        added: Vec<NotePayload>,
        removed: Vec<NotePayload>,
    ) -> Result<BlockNumber, NodeError> {
        let number = self.ledger.submit_transaction(added, removed).await?;
        self.synchronizer.sync_to_tip().await?;
        Ok(number)
    }

    /// Registration endpoint.
    ///
    /// 201 for a new account, 200 when the same key is registered again,
    /// 409 for a different key, 400 for malformed input.
    pub async fn register_account(
        &self,
        request: RegisterAccountRequest,
    ) -> Result<ApiResponse, ApiError> {
        let account = AccountId::from_hex(&request.id)
            .map_err(|e| ApiError::bad_request(format!("invalid id: {}", e)))?;
        let key = ViewingKey::from_hex(&request.information_key)
            .map_err(|e| ApiError::bad_request(format!("invalid informationKey: {}", e)))?;

        match self.synchronizer.on_account_registered(account, key).await {
            Ok(report) => Ok(match report.registration {
                RegistrationOutcome::Created => ApiResponse::created(),
                RegistrationOutcome::AlreadyRegistered => ApiResponse::already_registered(),
            }),
            Err(SyncError::Registry(RegistryError::Conflict(_))) => Err(ApiError::conflict()),
            Err(SyncError::Registry(RegistryError::InvalidKey)) => {
                Err(ApiError::bad_request("informationKey must not be empty"))
            }
            Err(SyncError::Ledger(e)) => {
                // The key is stored; its history is scanned on the next sync.
                warn!("[node] Registered {} but backfill failed: {}", account, e);
                Err(ApiError::unavailable("ledger unavailable, retry registration"))
            }
            Err(e) => {
                error!("[node] Registration of {} failed: {}", account, e);
                Err(ApiError::internal("registration failed"))
            }
        }
    }

    /// Query endpoint: the caller's records in arrival order.
    ///
    /// 401 for an unknown account or a bad signature, 400 for malformed
    /// input. A registered account without matches gets an empty list.
    pub fn get_notes(&self, request: &GetNotesRequest) -> Result<Vec<NoteView>, ApiError> {
        let account = AccountId::from_hex(&request.id)
            .map_err(|e| ApiError::bad_request(format!("invalid id: {}", e)))?;
        let signature = hex::decode(request.signature.trim_start_matches("0x"))
            .map_err(|e| ApiError::bad_request(format!("invalid signature: {}", e)))?;

        let query = NotesQuery::new(account, signature, request.message.as_bytes());
        match self.query.get_notes(&query) {
            Ok(records) => Ok(records.into_iter().map(NoteView::from).collect()),
            Err(QueryError::Unauthorized) => Err(ApiError::unauthorized()),
            Err(QueryError::Store(e)) => {
                error!("[node] Note query for {} failed: {}", account, e);
                Err(ApiError::internal("note store unavailable"))
            }
        }
    }

    /// Start the background task that applies blocks as the ledger
    /// announces them. It stops on [`SyncNode::shutdown`].
    pub fn spawn_follower(&self) -> JoinHandle<()> {
        let follower = LedgerFollower::new(self.synchronizer.clone(), &self.bus);
        tokio::spawn(follower.run(self.shutdown_tx.subscribe()))
    }

    /// Signal background tasks to stop.
    pub fn shutdown(&self) {
        info!("[node] Shutdown requested");
        self.shutdown_tx.send_replace(true);
    }
}
