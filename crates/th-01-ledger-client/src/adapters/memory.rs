//! In-memory ledger.
//!
//! Single-node stand-in for a real ledger: an append-only vector of blocks,
//! one block per submission.

use crate::domain::{LedgerError, NotePayload};
use crate::ports::LedgerClient;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{Block, BlockNumber, NoteId, NoteKind};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
struct Chain {
    blocks: Vec<Block>,
    note_ids: HashSet<NoteId>,
}

/// Append-only in-memory ledger.
///
/// Publishes `LedgerEvent::BlockAppended` after each append when a bus is
/// attached.
pub struct InMemoryLedger {
    chain: RwLock<Chain>,
    bus: Option<Arc<dyn EventPublisher>>,
    unavailable: AtomicBool,
}

impl InMemoryLedger {
    /// Create an empty ledger with no bus.
    pub fn new() -> Self {
        Self {
            chain: RwLock::new(Chain::default()),
            bus: None,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Create an empty ledger that announces appends on `bus`.
    pub fn with_bus(bus: Arc<dyn EventPublisher>) -> Self {
        Self {
            bus: Some(bus),
            ..Self::new()
        }
    }

    /// Number of blocks on the ledger.
    pub fn len(&self) -> usize {
        self.chain.read().blocks.len()
    }

    /// True while no block has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulate an outage: every call fails with `Unavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("in-memory ledger offline".to_string()));
        }
        Ok(())
    }

    /// Append under the write guard. Uniqueness is checked against the chain
    /// and within the submission before anything is mutated.
    fn append(
        &self,
        added: Vec<NotePayload>,
        removed: Vec<NotePayload>,
    ) -> Result<Block, LedgerError> {
        if added.is_empty() && removed.is_empty() {
            return Err(LedgerError::EmptyTransaction);
        }

        let mut chain = self.chain.write();

        let mut fresh = HashSet::with_capacity(added.len() + removed.len());
        for payload in added.iter().chain(removed.iter()) {
            if chain.note_ids.contains(&payload.id) || !fresh.insert(payload.id) {
                return Err(LedgerError::DuplicateNoteId(payload.id));
            }
        }

        let number = chain.blocks.len() as BlockNumber;
        let block = Block::new(
            number,
            added
                .into_iter()
                .map(|p| p.into_record(NoteKind::Data))
                .collect(),
            removed
                .into_iter()
                .map(|p| p.into_record(NoteKind::Nullifier))
                .collect(),
        );

        chain.note_ids.extend(fresh);
        chain.blocks.push(block.clone());
        Ok(block)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn submit_transaction(
        &self,
        added: Vec<NotePayload>,
        removed: Vec<NotePayload>,
    ) -> Result<BlockNumber, LedgerError> {
        self.check_available()?;

        let block = self.append(added, removed)?;
        let number = block.number;
        info!(
            "[th-01] Appended block {} ({} data, {} nullifier notes)",
            number,
            block.added_notes.len(),
            block.removed_notes.len()
        );

        if let Some(bus) = &self.bus {
            bus.publish(LedgerEvent::BlockAppended(block)).await;
        }
        Ok(number)
    }

    async fn blocks_from(&self, height: BlockNumber) -> Result<Vec<Block>, LedgerError> {
        self.check_available()?;

        let chain = self.chain.read();
        let start = usize::try_from(height).unwrap_or(usize::MAX);
        let blocks = chain.blocks.get(start..).map(<[Block]>::to_vec).unwrap_or_default();
        debug!("[th-01] Served {} blocks from height {}", blocks.len(), height);
        Ok(blocks)
    }

    async fn height(&self) -> Result<Option<BlockNumber>, LedgerError> {
        self.check_available()?;
        Ok(self.chain.read().blocks.last().map(|b| b.number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_bus::{EventFilter, InMemoryEventBus};

    fn payload(tag: u8) -> NotePayload {
        NotePayload::new(NoteId::new([tag; 32]), vec![tag])
    }

    #[tokio::test]
    async fn test_blocks_numbered_from_zero() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.height().await.unwrap(), None);

        assert_eq!(ledger.submit_transaction(vec![payload(1)], vec![]).await.unwrap(), 0);
        assert_eq!(ledger.submit_transaction(vec![payload(2)], vec![payload(3)]).await.unwrap(), 1);
        assert_eq!(ledger.height().await.unwrap(), Some(1));
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn test_kinds_stamped_by_list() {
        let ledger = InMemoryLedger::new();
        ledger
            .submit_transaction(vec![payload(1)], vec![payload(2)])
            .await
            .unwrap();

        let block = &ledger.blocks_from(0).await.unwrap()[0];
        assert_eq!(block.added_notes[0].kind, NoteKind::Data);
        assert_eq!(block.removed_notes[0].kind, NoteKind::Nullifier);
    }

    #[tokio::test]
    async fn test_blocks_from_past_tip_is_empty() {
        let ledger = InMemoryLedger::new();
        ledger.submit_transaction(vec![payload(1)], vec![]).await.unwrap();

        assert!(ledger.blocks_from(1).await.unwrap().is_empty());
        assert!(ledger.blocks_from(u64::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blocks_from_is_replayable() {
        let ledger = InMemoryLedger::new();
        for tag in 1..=3 {
            ledger.submit_transaction(vec![payload(tag)], vec![]).await.unwrap();
        }

        let first = ledger.blocks_from(1).await.unwrap();
        let second = ledger.blocks_from(1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.iter().map(|b| b.number).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_duplicate_note_ids_rejected() {
        let ledger = InMemoryLedger::new();
        ledger.submit_transaction(vec![payload(1)], vec![]).await.unwrap();

        // Already on the ledger, even as the other kind.
        assert_eq!(
            ledger.submit_transaction(vec![], vec![payload(1)]).await,
            Err(LedgerError::DuplicateNoteId(NoteId::new([1; 32])))
        );
        // Repeated inside one submission.
        assert_eq!(
            ledger.submit_transaction(vec![payload(2)], vec![payload(2)]).await,
            Err(LedgerError::DuplicateNoteId(NoteId::new([2; 32])))
        );
        // Rejected submissions leave no trace.
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.submit_transaction(vec![payload(2)], vec![]).await, Ok(1));
    }

    #[tokio::test]
    async fn test_empty_transaction_rejected() {
        let ledger = InMemoryLedger::new();
        assert_eq!(
            ledger.submit_transaction(vec![], vec![]).await,
            Err(LedgerError::EmptyTransaction)
        );
    }

    #[tokio::test]
    async fn test_unavailable_ledger() {
        let ledger = InMemoryLedger::new();
        ledger.set_unavailable(true);
        assert!(matches!(ledger.height().await, Err(LedgerError::Unavailable(_))));

        ledger.set_unavailable(false);
        assert!(ledger.height().await.is_ok());
    }

    #[tokio::test]
    async fn test_append_published_after_block_visible() {
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = InMemoryLedger::with_bus(bus.clone());
        let mut sub = bus.subscribe(EventFilter::all());

        ledger.submit_transaction(vec![payload(9)], vec![]).await.unwrap();

        let LedgerEvent::BlockAppended(block) = sub.recv().await.unwrap() else {
            panic!("expected BlockAppended");
        };
        assert_eq!(block.number, 0);
        assert_eq!(ledger.blocks_from(block.number).await.unwrap()[0], block);
    }

    proptest! {
        #[test]
        fn prop_block_numbers_are_gapless(sizes in proptest::collection::vec(1usize..4, 1..12)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let ledger = InMemoryLedger::new();
                let mut tag: u16 = 0;
                for (expected, size) in sizes.iter().enumerate() {
                    let added = (0..*size)
                        .map(|_| {
                            tag += 1;
                            let mut id = [0u8; 32];
                            id[..2].copy_from_slice(&tag.to_be_bytes());
                            NotePayload::new(NoteId::new(id), vec![])
                        })
                        .collect();
                    let number = ledger.submit_transaction(added, vec![]).await.unwrap();
                    prop_assert_eq!(number, expected as u64);
                }
                let numbers: Vec<_> = ledger.blocks_from(0).await.unwrap().iter().map(|b| b.number).collect();
                prop_assert_eq!(numbers, (0..sizes.len() as u64).collect::<Vec<_>>());
                Ok(())
            })?;
        }
    }
}
