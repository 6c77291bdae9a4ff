use anyhow::Result;
use serde::Serialize;

use nornicdb_accel::config::AccelConfig;
use nornicdb_accel::warmup::{
    OptimizeResult, ProgressReport, PropertiesResult, RunResult, StatsReport, StatusReport,
    WarmupCache,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WarmupReport {
    run: RunResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<PropertiesResult>,
    stats: StatsReport,
    status: StatusReport,
    progress: ProgressReport,
    optimize: OptimizeResult,
}

/// Preload the graph and print what the cache now holds.
///
/// Labels and types given on the command line replace the `[warmup]` config
/// lists; with neither, the whole graph is preloaded.
pub fn warmup(
    config: &AccelConfig,
    labels: Vec<String>,
    types: Vec<String>,
    properties: &[String],
    json: bool,
) -> Result<()> {
    let storage = super::open_graph(config)?;
    let cache = WarmupCache::new(storage);

    if let Some(cron) = &config.warmup.schedule {
        cache.schedule(cron);
    }

    let mut params = config.warmup.params();
    if !labels.is_empty() {
        params.labels = labels;
    }
    if !types.is_empty() {
        params.types = types;
    }

    let run = cache.run_with_params(&params);
    let properties = (!properties.is_empty()).then(|| cache.properties(properties));

    let report = WarmupReport {
        run,
        properties,
        stats: cache.stats(),
        status: cache.status(),
        progress: cache.progress(),
        optimize: cache.optimize(),
    };

    if json {
        return super::print_json(&report);
    }

    println!("Warmup");
    println!("{}", "=".repeat(40));
    println!("  Nodes loaded:          {}", report.run.nodes_loaded);
    println!("  Relationships loaded:  {}", report.run.relationships_loaded);
    if let Some(props) = report.run.properties_loaded {
        println!("  Properties loaded:     {props}");
    }
    println!("  Indexes:               {}", report.run.indexes_loaded);
    println!("  Time taken:            {} ms", report.run.time_taken_ms);
    println!();

    if let Some(ref props) = report.properties {
        println!("Property values:");
        for key in &props.keys {
            let count = cache.property_values(key).map_or(0, |v| v.len());
            println!("  {:<20} {}", key, count);
        }
        println!();
    }

    println!("Cache:");
    println!("  Items cached:          {}", report.stats.items_cached);
    println!("  Nodes cached:          {}", report.stats.nodes_cached);
    println!("  Relationships cached:  {}", report.stats.relationships_cached);
    println!("  Label indexes:         {}", report.stats.label_indexes);
    println!("  Type indexes:          {}", report.stats.type_indexes);
    println!(
        "  Progress:              {:.1}% ({}/{} nodes, {}/{} relationships)",
        report.progress.percentage,
        report.progress.nodes_loaded,
        report.progress.total_nodes,
        report.progress.relationships_loaded,
        report.progress.total_relationships
    );
    if let Some(ref last) = report.status.last_run {
        println!("  Last run:              {last}");
    }
    if !report.status.scheduled_cron.is_empty() {
        println!("  Schedule:              {}", report.status.scheduled_cron);
    }
    println!();

    println!("Recommendations:");
    for rec in &report.optimize.recommendations {
        println!("  - {rec}");
    }

    Ok(())
}
