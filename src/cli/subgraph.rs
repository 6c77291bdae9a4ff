use anyhow::Result;

use nornicdb_accel::config::AccelConfig;
use nornicdb_accel::warmup::WarmupCache;

/// Preload the neighborhood of node `id` and report what was cached.
pub fn subgraph(config: &AccelConfig, id: i64, depth: i64, json: bool) -> Result<()> {
    let storage = super::open_graph(config)?;
    let start = storage.node(id);
    let cache = WarmupCache::new(storage);

    let result = cache.subgraph(start.as_ref(), depth);

    if json {
        return super::print_json(&result);
    }

    if let Some(ref error) = result.error {
        println!("Node {id}: {error}");
        return Ok(());
    }

    println!(
        "Subgraph around node {id} (depth {}): {} node(s), {} relationship(s) in {} ms",
        result.depth, result.nodes_loaded, result.relationships_loaded, result.time_taken_ms
    );
    Ok(())
}
