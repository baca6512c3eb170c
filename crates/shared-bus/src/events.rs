//! # Ledger Events
//!
//! Every event type that flows through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, Block, BlockNumber};

/// Subsystem ids used as event sources.
pub mod sources {
    /// th-01 Ledger Client.
    pub const LEDGER: u8 = 1;
    /// th-03 Viewing-Key Registry.
    pub const REGISTRY: u8 = 3;
    /// th-04 Note Synchronizer.
    pub const SYNC: u8 = 4;
}

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // SUBSYSTEM 1: LEDGER CLIENT
    // =========================================================================
    /// A block was appended to the ledger.
    /// Source: Subsystem 1 | Target: Subsystem 4
    BlockAppended(Block),

    // =========================================================================
    // SUBSYSTEM 3: KEY REGISTRY
    // =========================================================================
    /// A new account was installed in the registry.
    AccountRegistered {
        /// The registered account.
        account: AccountId,
    },

    // =========================================================================
    // SUBSYSTEM 4: NOTE SYNCHRONIZER
    // =========================================================================
    /// An account's watermark advanced.
    AccountSynced {
        /// The account that was scanned.
        account: AccountId,
        /// Highest block now scanned for it.
        watermark: BlockNumber,
    },
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::BlockAppended(_) => EventTopic::Ledger,
            Self::AccountRegistered { .. } => EventTopic::Registry,
            Self::AccountSynced { .. } => EventTopic::Sync,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::BlockAppended(_) => sources::LEDGER,
            Self::AccountRegistered { .. } => sources::REGISTRY,
            Self::AccountSynced { .. } => sources::SYNC,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Block appends.
    Ledger,
    /// Account registrations.
    Registry,
    /// Watermark progress.
    Sync,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
