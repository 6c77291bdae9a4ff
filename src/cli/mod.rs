pub mod search;
pub mod subgraph;
pub mod warmup;

use anyhow::{Context, Result};
use std::sync::Arc;

use nornicdb_accel::config::AccelConfig;
use nornicdb_accel::storage::{loader, MemoryStorage};

/// Load the configured graph directory into a fresh in-memory storage.
pub fn open_graph(config: &AccelConfig) -> Result<Arc<MemoryStorage>> {
    let dir = config.resolved_data_dir();
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "graph directory does not exist, starting empty");
    }

    let storage = Arc::new(MemoryStorage::new());
    loader::load_json_dir(&storage, &dir)
        .with_context(|| format!("failed to load graph from {}", dir.display()))?;
    Ok(storage)
}

/// Print a serializable value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}
