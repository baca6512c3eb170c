//! # Ledger Follower
//!
//! Listens for `BlockAppended` on the event bus and feeds each block to the
//! synchronizer. When the bus drops events or a block arrives ahead of the
//! writer lane, the follower falls back to `sync_to_tip`, which re-reads the
//! missing blocks from the ledger.
//!
//! Every `lagging_retry` the follower also checks for lagging accounts
//! (stalled or failed scans) and runs `sync_to_tip` for them, so they catch
//! up even when no further block arrives.

use std::time::Duration;

use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent, Subscription, SubscriptionError};
use shared_types::Block;
use th_04_note_sync::{BlockOutcome, NoteSyncApi, NoteSynchronizer, SyncError};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Applies live ledger blocks until shutdown.
pub struct LedgerFollower {
    synchronizer: NoteSynchronizer,
    subscription: Subscription,
    lagging_retry: Duration,
}

impl LedgerFollower {
    /// Subscribe to ledger events. Events published after this call are seen.
    pub fn new(synchronizer: NoteSynchronizer, bus: &InMemoryEventBus) -> Self {
        let subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Ledger]));
        let lagging_retry = synchronizer.config().lagging_retry();
        Self {
            synchronizer,
            subscription,
            lagging_retry,
        }
    }

    /// Run until `shutdown` flips to true, its sender is dropped, or the bus
    /// closes.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("[node] Ledger follower started");
        let mut retry = interval(self.lagging_retry.max(Duration::from_millis(1)));
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[node] Ledger follower shutting down");
                        break;
                    }
                }
                _ = retry.tick() => self.retry_lagging().await,
                event = self.subscription.recv() => match event {
                    Ok(LedgerEvent::BlockAppended(block)) => self.apply(block).await,
                    Ok(_) => {}
                    Err(SubscriptionError::Lagged { skipped }) => {
                        warn!("[node] Follower missed {} events, resyncing from ledger", skipped);
                        self.catch_up().await;
                    }
                    Err(SubscriptionError::Closed) => {
                        info!("[node] Event bus closed, follower exiting");
                        break;
                    }
                }
            }
        }
    }

    async fn apply(&self, block: Block) {
        let number = block.number;
        match self.synchronizer.on_block_appended(block).await {
            Ok(BlockOutcome::Applied(report)) => {
                if !report.stalled.is_empty() {
                    warn!(
                        "[node] Block {}: {} accounts stalled and will be retried",
                        number,
                        report.stalled.len()
                    );
                }
            }
            Ok(BlockOutcome::AlreadyApplied) => {
                debug!("[node] Block {} was already applied", number);
            }
            Err(SyncError::OrderingViolation { expected, .. }) => {
                debug!("[node] Block {} ahead of {}, resyncing", number, expected);
                self.catch_up().await;
            }
            Err(e) => error!("[node] Failed to apply block {}: {}", number, e),
        }
    }

    async fn retry_lagging(&self) {
        let lagging = self.synchronizer.lagging_accounts().await;
        if lagging.is_empty() {
            return;
        }
        debug!("[node] Retrying {} lagging accounts", lagging.len());
        self.catch_up().await;
    }

    async fn catch_up(&self) {
        if let Err(e) = self.synchronizer.sync_to_tip().await {
            error!("[node] Resync failed: {}", e);
        }
    }
}
