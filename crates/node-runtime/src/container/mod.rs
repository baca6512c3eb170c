//! # Node Container
//!
//! Owns every subsystem instance. Components receive `Arc` handles to their
//! collaborators; there is no process-global state.

pub mod config;
pub mod node;

pub use config::{ConfigError, NodeConfig};
pub use node::{NodeError, SyncNode};
