//! # Shared Bus - Ledger Event Fan-out
//!
//! Carries ledger and account lifecycle events between subsystems so the
//! synchronizer can follow the ledger without the ledger knowing about it.
//!
//! ```text
//! ┌──────────────┐   BlockAppended    ┌──────────────┐   sync_to_tip   ┌──────────────┐
//! │ th-01 Ledger │ ─────────────────▶ │  Event Bus   │ ──────────────▶ │ th-04 Sync   │
//! └──────────────┘                    └──────────────┘                 └──────────────┘
//!                                            ▲                                │
//!                                            └──── AccountRegistered ─────────┘
//!                                                  AccountSynced
//! ```
//!
//! Events are hints. A subscriber that lags and loses events recovers by
//! pulling from the ledger directly, so nothing is lost for good.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1024);
    }
}
