//! # Note Synchronizer Service
//!
//! Keeps every registered account's ownership records complete with
//! respect to the ledger.
//!
//! ## Serialization
//!
//! - **Writer lane:** `next_block` is held for the whole application of a
//!   block, so live blocks are applied one at a time and in order.
//! - **Per-account cursor:** every scan of an account, live or backfill,
//!   runs under that account's cursor and starts from the watermark in the
//!   note store. Whichever path gets there first scans a block; the other
//!   finds it already covered.
//! - **Isolation:** each account is its own task and each evaluation runs on
//!   a blocking thread under `account_scan_timeout`. A stuck account keeps
//!   its watermark and is picked up again on its next advance.
//! - **One evaluation per account:** an evaluation that outlives its timeout
//!   is kept, not re-spawned. Later advances of that account wait on it
//!   within their own timeout, so a hung ownership test pins at most one
//!   blocking thread.
//! - **Lagging set:** accounts whose last advance stalled or failed. The
//!   node retries them with `sync_to_tip` until the set drains.

use crate::config::SyncConfig;
use crate::domain::{
    AccountScan, BackfillReport, BlockOutcome, BlockReport, SyncError, SyncReport,
};
use crate::ports::{
    EventPublisher, LedgerClient, NoteStore, NoteSyncApi, OwnershipTest, ViewingKeyRegistry,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::LedgerEvent;
use shared_types::{AccountId, Block, BlockNumber, OwnershipRecord, ViewingKey};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use th_02_note_store::AppendOutcome;
use th_03_key_registry::{RegistrationOutcome, RegistryError};
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

/// Note Synchronizer - the ownership matching engine.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct NoteSynchronizer {
    inner: Arc<Inner>,
}

struct Inner {
    config: SyncConfig,
    registry: Arc<dyn ViewingKeyRegistry>,
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn NoteStore>,
    ownership: Arc<dyn OwnershipTest>,
    bus: Option<Arc<dyn EventPublisher>>,
    /// Writer lane: next block number to apply.
    next_block: AsyncMutex<BlockNumber>,
    /// Mirror of `next_block` readable without waiting for the lane.
    applied: AtomicU64,
    cursors: Mutex<HashMap<AccountId, Arc<AsyncMutex<()>>>>,
    /// Evaluations that outlived their timeout, at most one per account.
    overdue: Mutex<HashMap<AccountId, Evaluation>>,
    lagging: Mutex<HashSet<AccountId>>,
    permits: Arc<Semaphore>,
}

type Evaluation = JoinHandle<(Vec<OwnershipRecord>, usize)>;

impl NoteSynchronizer {
    /// Create a synchronizer. Nothing is applied until blocks are fed in or
    /// `sync_to_tip` is called.
    pub fn new(
        config: SyncConfig,
        registry: Arc<dyn ViewingKeyRegistry>,
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn NoteStore>,
        ownership: Arc<dyn OwnershipTest>,
        bus: Option<Arc<dyn EventPublisher>>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_parallel_accounts.max(1)));
        Self {
            inner: Arc::new(Inner {
                config,
                registry,
                ledger,
                store,
                ownership,
                bus,
                next_block: AsyncMutex::new(0),
                applied: AtomicU64::new(0),
                cursors: Mutex::new(HashMap::new()),
                overdue: Mutex::new(HashMap::new()),
                lagging: Mutex::new(HashSet::new()),
                permits,
            }),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    fn ensure_registered(&self, account: &AccountId) -> Result<(), SyncError> {
        if self.inner.registry.contains(account) {
            Ok(())
        } else {
            Err(RegistryError::NotFound(*account).into())
        }
    }
}

#[async_trait]
impl NoteSyncApi for NoteSynchronizer {
    async fn on_block_appended(&self, block: Block) -> Result<BlockOutcome, SyncError> {
        let mut next = self.inner.next_block.lock().await;

        if block.number < *next {
            debug!("[th-04] Block {} already applied", block.number);
            return Ok(BlockOutcome::AlreadyApplied);
        }
        if block.number > *next {
            warn!(
                "[th-04] Refusing block {} while waiting for block {}",
                block.number, *next
            );
            return Err(SyncError::OrderingViolation {
                expected: *next,
                got: block.number,
            });
        }

        let report = self.inner.apply_to_all(Arc::new(block)).await?;
        *next = report.block_number + 1;
        self.inner.applied.store(*next, Ordering::SeqCst);
        Ok(BlockOutcome::Applied(report))
    }

    async fn on_account_registered(
        &self,
        account: AccountId,
        key: ViewingKey,
    ) -> Result<BackfillReport, SyncError> {
        let registration = self.inner.registry.register(account, key.clone())?;
        if registration == RegistrationOutcome::Created {
            self.inner
                .publish(LedgerEvent::AccountRegistered { account })
                .await;
        }

        // Reading the tip after registering closes the gap with the writer
        // lane: any block past this tip is applied with the account included.
        let tip = match self.inner.ledger.height().await {
            Ok(tip) => tip,
            Err(e) => {
                self.inner.lagging.lock().insert(account);
                return Err(e.into());
            }
        };
        let scan = match tip {
            Some(tip) => self.inner.advance_account(account, key, tip, None).await?,
            None => AccountScan {
                watermark: self.inner.store.watermark(&account)?,
                ..AccountScan::default()
            },
        };

        info!(
            "[th-04] Backfill for {} ({:?}): {} blocks scanned, {} notes matched",
            account, registration, scan.blocks_scanned, scan.inserted
        );
        Ok(BackfillReport {
            account,
            registration,
            scan,
        })
    }

    async fn sync_to_tip(&self) -> Result<SyncReport, SyncError> {
        let mut next = self.inner.next_block.lock().await;
        let mut report = SyncReport::default();

        for block in self.inner.ledger.blocks_from(*next).await? {
            if block.number != *next {
                return Err(SyncError::OrderingViolation {
                    expected: *next,
                    got: block.number,
                });
            }
            let applied = self.inner.apply_to_all(Arc::new(block)).await?;
            *next += 1;
            self.inner.applied.store(*next, Ordering::SeqCst);
            report.applied.push(applied);
        }

        match next.checked_sub(1) {
            Some(tip) => report.recovered = self.inner.catch_up_lagging(tip).await?,
            // Empty ledger: block 0 will include every registered account.
            None => self.inner.lagging.lock().clear(),
        }
        Ok(report)
    }

    async fn notes_for(&self, account: &AccountId) -> Result<Vec<OwnershipRecord>, SyncError> {
        self.ensure_registered(account)?;
        Ok(self.inner.store.notes_for(account)?)
    }

    async fn watermark(&self, account: &AccountId) -> Result<Option<BlockNumber>, SyncError> {
        self.ensure_registered(account)?;
        Ok(self.inner.store.watermark(account)?)
    }

    async fn applied_height(&self) -> Option<BlockNumber> {
        self.inner.applied.load(Ordering::SeqCst).checked_sub(1)
    }

    async fn lagging_accounts(&self) -> Vec<AccountId> {
        let mut accounts: Vec<_> = self.inner.lagging.lock().iter().copied().collect();
        accounts.sort();
        accounts
    }
}

impl Inner {
    async fn publish(&self, event: LedgerEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event).await;
        }
    }

    fn cursor(&self, account: &AccountId) -> Arc<AsyncMutex<()>> {
        self.cursors.lock().entry(*account).or_default().clone()
    }

    /// Advance every registered account through `block`, one task each.
    async fn apply_to_all(self: &Arc<Self>, block: Arc<Block>) -> Result<BlockReport, SyncError> {
        let accounts = self.registry.accounts();
        let mut report = BlockReport {
            block_number: block.number,
            accounts: accounts.len(),
            ..BlockReport::default()
        };

        let mut tasks = JoinSet::new();
        for (account, key) in accounts {
            let inner = Arc::clone(self);
            let block = Arc::clone(&block);
            tasks.spawn(async move {
                let number = block.number;
                let scan = inner.advance_account(account, key, number, Some(block)).await;
                (account, scan)
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((account, Ok(scan))) => {
                    report.inserted += scan.inserted;
                    report.rejected += scan.rejected;
                    report.match_errors += scan.match_errors;
                    if scan.stalled {
                        report.stalled.push(account);
                    }
                }
                Ok((account, Err(e))) => {
                    error!(
                        "[th-04] Failed to apply block {} for {}: {}",
                        block.number, account, e
                    );
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    error!("[th-04] Scan task for block {} died: {}", block.number, e);
                    failure.get_or_insert(SyncError::TaskFailed(e.to_string()));
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        report.stalled.sort();
        debug!(
            "[th-04] Applied block {} to {} accounts: {} matched, {} stalled",
            report.block_number,
            report.accounts,
            report.inserted,
            report.stalled.len()
        );
        Ok(report)
    }

    /// Bring accounts that fell behind `tip` up to it.
    async fn catch_up_lagging(self: &Arc<Self>, tip: BlockNumber) -> Result<Vec<AccountId>, SyncError> {
        let mut tasks = JoinSet::new();
        for (account, key) in self.registry.accounts() {
            if self.store.watermark(&account)? >= Some(tip) {
                self.lagging.lock().remove(&account);
                continue;
            }
            let inner = Arc::clone(self);
            tasks.spawn(async move { (account, inner.advance_account(account, key, tip, None).await) });
        }

        let mut recovered = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((account, Ok(scan))) if scan.blocks_scanned > 0 && !scan.stalled => {
                    info!("[th-04] Account {} caught up to block {}", account, tip);
                    recovered.push(account);
                }
                Ok((_, Ok(_))) => {}
                Ok((_, Err(e))) => return Err(e),
                Err(e) => return Err(SyncError::TaskFailed(e.to_string())),
            }
        }
        recovered.sort();
        Ok(recovered)
    }

    /// Scan `account` from its watermark through `up_to` and update the
    /// lagging set with the outcome.
    ///
    /// `live` is the block being applied by the writer lane, if any; blocks
    /// before it come from the ledger.
    async fn advance_account(
        self: &Arc<Self>,
        account: AccountId,
        key: ViewingKey,
        up_to: BlockNumber,
        live: Option<Arc<Block>>,
    ) -> Result<AccountScan, SyncError> {
        let result = self.advance_under_cursor(account, key, up_to, live).await;
        let mut lagging = self.lagging.lock();
        match &result {
            Ok(scan) if !scan.stalled => lagging.remove(&account),
            _ => lagging.insert(account),
        };
        result
    }

    async fn advance_under_cursor(
        self: &Arc<Self>,
        account: AccountId,
        key: ViewingKey,
        up_to: BlockNumber,
        live: Option<Arc<Block>>,
    ) -> Result<AccountScan, SyncError> {
        let cursor = self.cursor(&account);
        let _cursor = cursor.lock().await;

        let watermark = self.store.watermark(&account)?;
        let mut scan = AccountScan {
            watermark,
            ..AccountScan::default()
        };
        let from = watermark.map_or(0, |w| w + 1);
        if from > up_to {
            return Ok(scan);
        }

        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| SyncError::TaskFailed(e.to_string()))?;

        for block in self.blocks_between(from, up_to, live).await? {
            let step = self.scan_block(account, &key, block).await?;
            scan.absorb(&step);
            if step.stalled {
                break;
            }
        }

        if scan.watermark > watermark {
            if let Some(watermark) = scan.watermark {
                self.publish(LedgerEvent::AccountSynced { account, watermark })
                    .await;
            }
        }
        Ok(scan)
    }

    /// Contiguous blocks `from..=up_to`. Stops at the first hole.
    async fn blocks_between(
        &self,
        from: BlockNumber,
        up_to: BlockNumber,
        live: Option<Arc<Block>>,
    ) -> Result<Vec<Arc<Block>>, SyncError> {
        let live_number = live.as_ref().map(|b| b.number);
        let mut blocks: Vec<Arc<Block>> = Vec::new();

        if live_number.map_or(true, |n| from < n) {
            for block in self.ledger.blocks_from(from).await? {
                let expected = from + blocks.len() as BlockNumber;
                if block.number > up_to || Some(block.number) == live_number {
                    break;
                }
                if block.number != expected {
                    warn!(
                        "[th-04] Ledger returned block {} where {} was expected",
                        block.number, expected
                    );
                    break;
                }
                blocks.push(Arc::new(block));
            }
        }

        if let Some(block) = live {
            if block.number == from + blocks.len() as BlockNumber {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }

    /// Evaluate one block for one account and commit the result together
    /// with the new watermark.
    ///
    /// Runs under the account's cursor, so no other scan touches the
    /// account's `overdue` entry meanwhile.
    async fn scan_block(
        &self,
        account: AccountId,
        key: &ViewingKey,
        block: Arc<Block>,
    ) -> Result<AccountScan, SyncError> {
        let number = block.number;
        let deadline = Instant::now() + self.config.account_scan_timeout();
        let stalled = AccountScan {
            stalled: true,
            ..AccountScan::default()
        };

        let previous = self.overdue.lock().remove(&account);
        if let Some(mut previous) = previous {
            if timeout_at(deadline, &mut previous).await.is_err() {
                warn!(
                    "[th-04] Earlier evaluation for {} still running; skipping block {}",
                    account, number
                );
                self.overdue.lock().insert(account, previous);
                return Ok(stalled);
            }
            // Its scan was abandoned and its block gets evaluated again below.
            debug!("[th-04] Overdue evaluation for {} finished", account);
        }

        let test = Arc::clone(&self.ownership);
        let eval_key = key.clone();
        let mut evaluation =
            tokio::task::spawn_blocking(move || evaluate(test.as_ref(), &eval_key, account, &block));

        let (records, match_errors) = match timeout_at(deadline, &mut evaluation).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                error!(
                    "[th-04] Ownership test crashed on block {} for {}: {}",
                    number, account, e
                );
                return Ok(stalled);
            }
            Err(_) => {
                warn!(
                    "[th-04] Ownership test for {} timed out on block {}; will retry",
                    account, number
                );
                self.overdue.lock().insert(account, evaluation);
                return Ok(stalled);
            }
        };

        let note_ids: Vec<_> = records.iter().map(|r| r.note_id).collect();
        let outcomes = self.store.commit_scan(&account, records, number)?;

        let mut scan = AccountScan {
            blocks_scanned: 1,
            match_errors,
            watermark: Some(number),
            ..AccountScan::default()
        };
        for (note, outcome) in note_ids.iter().zip(outcomes) {
            match outcome {
                AppendOutcome::Inserted => scan.inserted += 1,
                AppendOutcome::Duplicate => scan.duplicates += 1,
                AppendOutcome::OwnedByOther(owner) => {
                    warn!(
                        "[th-04] Note {} in block {} matched {} but is owned by {}; ownership test is not selective",
                        note, number, account, owner
                    );
                    scan.rejected += 1;
                }
            }
        }
        Ok(scan)
    }
}

/// Run the ownership test over every note of `block`. Per-note failures
/// are logged and skipped.
fn evaluate(
    test: &dyn OwnershipTest,
    key: &ViewingKey,
    account: AccountId,
    block: &Block,
) -> (Vec<OwnershipRecord>, usize) {
    let mut records = Vec::new();
    let mut errors = 0;
    for note in block.notes() {
        match test.owns(key, note) {
            Ok(true) => records.push(OwnershipRecord::for_match(account, note, block.number)),
            Ok(false) => {}
            Err(e) => {
                errors += 1;
                warn!(
                    "[th-04] Skipping note {} in block {} for {}: {}",
                    note.id, block.number, account, e
                );
            }
        }
    }
    (records, errors)
}
