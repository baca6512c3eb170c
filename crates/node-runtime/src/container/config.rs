//! # Node Configuration
//!
//! Unified configuration for the stores, the synchronizer and the bus.
//!
//! ## Sources
//!
//! | Source | Entry point |
//! |--------|-------------|
//! | defaults | `NodeConfig::default()` |
//! | environment | `NodeConfig::from_env()` |
//! | JSON file | `NodeConfig::from_json_file(path)` |
//!
//! The reference ledger lives in memory, so the default store does too.
//! Set `TAHINI_DATA_DIR` to keep registrations and records on disk.

use serde::{Deserialize, Serialize};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use th_02_note_store::StoreConfig;
use th_04_note_sync::SyncConfig;
use thiserror::Error;

/// Environment variable naming the data directory.
pub const ENV_DATA_DIR: &str = "TAHINI_DATA_DIR";
/// Environment variable for the per-account scan timeout.
pub const ENV_SCAN_TIMEOUT_MS: &str = "TAHINI_SCAN_TIMEOUT_MS";
/// Environment variable for the account scan parallelism.
pub const ENV_MAX_PARALLEL_ACCOUNTS: &str = "TAHINI_MAX_PARALLEL_ACCOUNTS";
/// Environment variable for the event bus capacity.
pub const ENV_BUS_CAPACITY: &str = "TAHINI_BUS_CAPACITY";
/// Environment variable for the lagging-account retry period.
pub const ENV_LAGGING_RETRY_MS: &str = "TAHINI_LAGGING_RETRY_MS";

/// Complete node configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Note store and registry backends.
    pub store: StoreConfig,
    /// Synchronizer limits.
    pub sync: SyncConfig,
    /// Events buffered per bus subscriber before it lags.
    pub bus_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                data_dir: None,
                ..StoreConfig::default()
            },
            sync: SyncConfig::default(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable or field holds an unparsable value.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Variable or field name.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// The config file could not be read.
    #[error("Cannot read {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// The config file is not valid JSON for `NodeConfig`.
    #[error("Malformed config file: {0}")]
    Parse(String),

    /// A limit that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl NodeConfig {
    /// Memory-only configuration with short timeouts.
    pub fn for_testing() -> Self {
        Self {
            store: StoreConfig::for_testing(),
            sync: SyncConfig::for_testing(),
            bus_capacity: 64,
        }
    }

    /// Defaults overridden by the `TAHINI_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `TAHINI_*`
    /// variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            config.store.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = parse_var(&lookup, ENV_SCAN_TIMEOUT_MS)? {
            config.sync.account_scan_timeout_ms = ms;
        }
        if let Some(n) = parse_var(&lookup, ENV_MAX_PARALLEL_ACCOUNTS)? {
            config.sync.max_parallel_accounts = n;
        }
        if let Some(n) = parse_var(&lookup, ENV_BUS_CAPACITY)? {
            config.bus_capacity = n;
        }
        if let Some(ms) = parse_var(&lookup, ENV_LAGGING_RETRY_MS)? {
            config.sync.lagging_retry_ms = ms;
        }
        Ok(config)
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject limits that would stall or disable the node.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.account_scan_timeout_ms == 0 {
            return Err(ConfigError::Zero("account_scan_timeout_ms"));
        }
        if self.sync.max_parallel_accounts == 0 {
            return Err(ConfigError::Zero("max_parallel_accounts"));
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::Zero("bus_capacity"));
        }
        if self.sync.lagging_retry_ms == 0 {
            return Err(ConfigError::Zero("lagging_retry_ms"));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
    }
}
