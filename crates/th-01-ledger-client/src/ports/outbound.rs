//! # Outbound Ports
//!
//! What the rest of the system needs from a ledger.

use crate::domain::{LedgerError, NotePayload};
use async_trait::async_trait;
use shared_types::{Block, BlockNumber};

/// Ledger connection - outbound port for the synchronizer and the API layer.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Append one block holding `added` as data notes and `removed` as
    /// nullifier notes. Returns the new block's number.
    async fn submit_transaction(
        &self,
        added: Vec<NotePayload>,
        removed: Vec<NotePayload>,
    ) -> Result<BlockNumber, LedgerError>;

    /// Every block with `number >= height`, in order.
    ///
    /// Empty when `height` is past the tip. Calling again with the same
    /// height replays the same blocks.
    async fn blocks_from(&self, height: BlockNumber) -> Result<Vec<Block>, LedgerError>;

    /// Number of the newest block, `None` on an empty ledger.
    async fn height(&self) -> Result<Option<BlockNumber>, LedgerError>;
}
