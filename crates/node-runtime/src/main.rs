//! # Tahini Node
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG` honored, default `info`)
//! 2. Load configuration from `TAHINI_CONFIG` (JSON) or the environment
//! 3. Open stores and build the node
//! 4. Apply any ledger blocks not yet applied
//! 5. Follow the ledger until Ctrl+C

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, SyncNode};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn load_config() -> Result<NodeConfig> {
    let config = match std::env::var("TAHINI_CONFIG") {
        Ok(path) => NodeConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config file {}", path))?,
        Err(_) => NodeConfig::from_env().context("Failed to read TAHINI_* environment")?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Tahini Note Sync Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = load_config()?;
    let node = SyncNode::new(config).context("Failed to build node")?;
    node.resume().await.context("Initial sync failed")?;
    let follower = node.spawn_follower();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    node.shutdown();
    follower.await.context("Follower task panicked")?;
    info!("Shutdown complete");
    Ok(())
}
