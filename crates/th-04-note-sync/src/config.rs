//! # Synchronizer Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Note synchronizer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for evaluating one block for one account. An account
    /// that exceeds it is left behind and retried on its next advance.
    pub account_scan_timeout_ms: u64,

    /// Accounts scanned at the same time.
    pub max_parallel_accounts: usize,

    /// How often the node retries lagging accounts.
    pub lagging_retry_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            account_scan_timeout_ms: 30_000,
            max_parallel_accounts: 16,
            lagging_retry_ms: 5_000,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (short timeout).
    pub fn for_testing() -> Self {
        Self {
            account_scan_timeout_ms: 500,
            max_parallel_accounts: 4,
            lagging_retry_ms: 50,
        }
    }

    /// Scan timeout as a `Duration`.
    pub fn account_scan_timeout(&self) -> Duration {
        Duration::from_millis(self.account_scan_timeout_ms)
    }

    /// Lagging-account retry period as a `Duration`.
    pub fn lagging_retry(&self) -> Duration {
        Duration::from_millis(self.lagging_retry_ms)
    }
}
