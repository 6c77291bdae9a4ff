//! In-memory warmup cache.
//!
//! [`WarmupCache`] preloads nodes and relationships from a [`Storage`] into
//! ID, label, and type indexes for fast repeated lookup, and reports hit/miss
//! statistics and tuning advice.
//!
//! The cache is a read-through index, never a source of truth. Entries are
//! shared `Arc`s into whatever Storage returned, and there is no invalidation
//! hook: a cached entity stays verbatim until [`run`](WarmupCache::run),
//! [`indexes`](WarmupCache::indexes), or [`clear`](WarmupCache::clear)
//! replaces or removes it.
//!
//! # Locking
//!
//! One `RwLock` per cache instance guards all state. Writers (preloads,
//! clear, counter updates) take it exclusively; aggregate reads share it.
//! [`run`](WarmupCache::run) releases the lock between its node phase and its
//! relationship phase, so a concurrent reader can observe the new nodes before
//! the new relationships. [`subgraph`](WarmupCache::subgraph) holds the
//! exclusive lock across all of its Storage calls.

mod results;
mod subgraph;

pub use results::{
    CacheQueriesResult, CacheStats, ClearResult, IndexesResult, NodesResult, OptimizeResult,
    PathResult, ProgressReport, PropertiesResult, QueryMarker, RelationshipsResult, RunResult,
    ScheduleResult, StatsReport, StatusReport, SubgraphResult, WarmupParams,
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::graph::{Node, Relationship, Value};
use crate::storage::Storage;
use results::rfc3339;

/// Labels holding more cached nodes than this are flagged by [`WarmupCache::optimize`].
pub const HOT_LABEL_THRESHOLD: usize = 10;

/// Hit rate below which [`WarmupCache::optimize`] suggests warming more data.
pub const LOW_HIT_RATE: f64 = 0.5;

const ADVICE_RUN: &str = "Consider running a full warmup to cache nodes";
const ADVICE_INDEXES: &str = "Consider rebuilding indexes to populate label indexes";
const ADVICE_HIT_RATE: &str =
    "Low cache hit rate - consider warming up more frequently accessed data";
const ADVICE_HOT_LABELS: &str = "Frequently used labels detected - consider prioritizing: ";
const ADVICE_OK: &str = "Cache is well optimized";

#[derive(Default)]
struct CacheState {
    nodes: HashMap<i64, Arc<Node>>,
    relationships: HashMap<i64, Arc<Relationship>>,
    nodes_by_label: HashMap<String, Vec<Arc<Node>>>,
    rels_by_type: HashMap<String, Vec<Arc<Relationship>>>,
    properties: HashMap<String, Vec<Value>>,
    queries: HashMap<String, QueryMarker>,
    stats: CacheStats,
    last_run: Option<DateTime<Utc>>,
    next_run: Option<DateTime<Utc>>,
    running: bool,
    scheduled_cron: String,
}

impl CacheState {
    fn items_cached(&self) -> usize {
        self.nodes.len() + self.relationships.len() + self.queries.len()
    }

    fn index_count(&self) -> usize {
        self.nodes_by_label.len() + self.rels_by_type.len()
    }

    fn cache_node(&mut self, node: &Arc<Node>) {
        self.nodes.insert(node.id, Arc::clone(node));
    }

    fn cache_relationship(&mut self, rel: &Arc<Relationship>) {
        self.relationships.insert(rel.id, Arc::clone(rel));
    }

    fn index_node(&mut self, label: &str, node: &Arc<Node>) {
        self.nodes_by_label
            .entry(label.to_string())
            .or_default()
            .push(Arc::clone(node));
    }

    fn index_relationship(&mut self, rel: &Arc<Relationship>) {
        self.rels_by_type
            .entry(rel.rel_type.clone())
            .or_default()
            .push(Arc::clone(rel));
    }
}

/// Preload cache over a [`Storage`].
pub struct WarmupCache {
    storage: Arc<dyn Storage>,
    state: RwLock<CacheState>,
}

impl WarmupCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            state: RwLock::new(CacheState::default()),
        }
    }

    // ── Preloading ───────────────────────────────────────────────────────────

    /// Full preload of every node, then every relationship.
    ///
    /// Label and type indexes are appended to, not rebuilt, so repeated runs
    /// without an intervening [`clear`](Self::clear) or
    /// [`indexes`](Self::indexes) accumulate duplicate index entries.
    pub fn run(&self) -> RunResult {
        let start = Instant::now();
        self.state.write().running = true;

        let mut nodes_loaded = 0;
        let mut relationships_loaded = 0;
        let mut properties_loaded = 0;

        match self.storage.all_nodes() {
            Ok(nodes) => {
                let mut state = self.state.write();
                for node in &nodes {
                    state.cache_node(node);
                    nodes_loaded += 1;
                    properties_loaded += node.properties.len();
                    for label in &node.labels {
                        state.index_node(label, node);
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "warmup could not read nodes"),
        }

        match self.storage.all_relationships() {
            Ok(rels) => {
                let mut state = self.state.write();
                for rel in &rels {
                    state.cache_relationship(rel);
                    relationships_loaded += 1;
                    properties_loaded += rel.properties.len();
                    state.index_relationship(rel);
                }
            }
            Err(e) => tracing::warn!(error = %e, "warmup could not read relationships"),
        }

        let indexes_loaded = {
            let mut state = self.state.write();
            state.running = false;
            state.last_run = Some(Utc::now());
            state.index_count()
        };

        let result = RunResult {
            nodes_loaded,
            relationships_loaded,
            properties_loaded: Some(properties_loaded),
            indexes_loaded,
            time_taken_ms: elapsed_ms(start),
        };
        tracing::info!(
            nodes = nodes_loaded,
            relationships = relationships_loaded,
            properties = properties_loaded,
            ms = result.time_taken_ms,
            "warmup run complete"
        );
        result
    }

    /// Selective preload. Falls back to [`run`](Self::run) when neither
    /// labels nor types are given.
    pub fn run_with_params(&self, params: &WarmupParams) -> RunResult {
        if params.labels.is_empty() && params.types.is_empty() {
            return self.run();
        }

        let start = Instant::now();
        let mut nodes_loaded = 0;
        let mut relationships_loaded = 0;
        let mut indexes_loaded = 0;

        if !params.labels.is_empty() {
            nodes_loaded = self.nodes(&params.labels).nodes_loaded;
            if params.load_indexes {
                indexes_loaded += params.labels.len();
            }
        }

        if !params.types.is_empty() {
            relationships_loaded = self.relationships(&params.types).relationships_loaded;
            if params.load_indexes {
                indexes_loaded += params.types.len();
            }
        }

        RunResult {
            nodes_loaded,
            relationships_loaded,
            properties_loaded: None,
            indexes_loaded,
            time_taken_ms: elapsed_ms(start),
        }
    }

    /// Preload nodes carrying any of `labels`.
    ///
    /// A matching node is indexed under the first of its labels that was requested.
    pub fn nodes<S: AsRef<str>>(&self, labels: &[S]) -> NodesResult {
        let start = Instant::now();
        let labels: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();

        let nodes = match self.storage.all_nodes() {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(?labels, error = %e, "label warmup could not read nodes");
                return NodesResult {
                    nodes_loaded: 0,
                    labels,
                    time_taken_ms: elapsed_ms(start),
                    error: Some(e.to_string()),
                };
            }
        };

        let wanted: HashSet<&str> = labels.iter().map(String::as_str).collect();
        let mut nodes_loaded = 0;
        {
            let mut state = self.state.write();
            for node in &nodes {
                if let Some(label) = node.labels.iter().find(|l| wanted.contains(l.as_str())) {
                    state.cache_node(node);
                    state.index_node(label, node);
                    nodes_loaded += 1;
                }
            }
        }

        tracing::debug!(?labels, nodes = nodes_loaded, "label warmup complete");
        NodesResult {
            nodes_loaded,
            labels,
            time_taken_ms: elapsed_ms(start),
            error: None,
        }
    }

    /// Preload relationships whose type is one of `types`.
    pub fn relationships<S: AsRef<str>>(&self, types: &[S]) -> RelationshipsResult {
        let start = Instant::now();
        let types: Vec<String> = types.iter().map(|t| t.as_ref().to_string()).collect();

        let rels = match self.storage.all_relationships() {
            Ok(rels) => rels,
            Err(e) => {
                tracing::warn!(?types, error = %e, "type warmup could not read relationships");
                return RelationshipsResult {
                    relationships_loaded: 0,
                    types,
                    time_taken_ms: elapsed_ms(start),
                    error: Some(e.to_string()),
                };
            }
        };

        let wanted: HashSet<&str> = types.iter().map(String::as_str).collect();
        let mut relationships_loaded = 0;
        {
            let mut state = self.state.write();
            for rel in rels.iter().filter(|r| wanted.contains(r.rel_type.as_str())) {
                state.cache_relationship(rel);
                state.index_relationship(rel);
                relationships_loaded += 1;
            }
        }

        tracing::debug!(?types, relationships = relationships_loaded, "type warmup complete");
        RelationshipsResult {
            relationships_loaded,
            types,
            time_taken_ms: elapsed_ms(start),
            error: None,
        }
    }

    /// Rebuild label and type indexes from a fresh Storage read.
    ///
    /// Each index is discarded and rebuilt only if its Storage read succeeds.
    pub fn indexes(&self) -> IndexesResult {
        let start = Instant::now();
        let mut indexes_loaded = 0;

        match self.storage.all_nodes() {
            Ok(nodes) => {
                let mut state = self.state.write();
                state.nodes_by_label.clear();
                for node in &nodes {
                    for label in &node.labels {
                        state.index_node(label, node);
                    }
                }
                indexes_loaded += state.nodes_by_label.len();
            }
            Err(e) => tracing::warn!(error = %e, "index rebuild could not read nodes"),
        }

        match self.storage.all_relationships() {
            Ok(rels) => {
                let mut state = self.state.write();
                state.rels_by_type.clear();
                for rel in &rels {
                    state.index_relationship(rel);
                }
                indexes_loaded += state.rels_by_type.len();
            }
            Err(e) => tracing::warn!(error = %e, "index rebuild could not read relationships"),
        }

        let state = self.state.read();
        IndexesResult {
            indexes_loaded,
            label_indexes: state.nodes_by_label.len(),
            type_indexes: state.rels_by_type.len(),
            time_taken_ms: elapsed_ms(start),
        }
    }

    /// Accumulate every value of the given property keys across nodes and
    /// relationships, for later distribution analysis.
    pub fn properties<S: AsRef<str>>(&self, keys: &[S]) -> PropertiesResult {
        let start = Instant::now();
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        let mut properties_loaded = 0;

        match self.storage.all_nodes() {
            Ok(nodes) => {
                let mut state = self.state.write();
                for node in &nodes {
                    properties_loaded +=
                        collect_values(&mut state.properties, &keys, node.properties.iter());
                }
            }
            Err(e) => tracing::warn!(error = %e, "property warmup could not read nodes"),
        }

        match self.storage.all_relationships() {
            Ok(rels) => {
                let mut state = self.state.write();
                for rel in &rels {
                    properties_loaded +=
                        collect_values(&mut state.properties, &keys, rel.properties.iter());
                }
            }
            Err(e) => tracing::warn!(error = %e, "property warmup could not read relationships"),
        }

        PropertiesResult {
            properties_loaded,
            keys,
            time_taken_ms: elapsed_ms(start),
        }
    }

    /// Insert a caller-provided path verbatim. No connectivity is checked.
    pub fn path(&self, nodes: &[Arc<Node>], rels: &[Arc<Relationship>]) -> PathResult {
        let start = Instant::now();
        {
            let mut state = self.state.write();
            for node in nodes {
                state.cache_node(node);
            }
            for rel in rels {
                state.cache_relationship(rel);
            }
        }
        PathResult {
            nodes_loaded: nodes.len(),
            relationships_loaded: rels.len(),
            time_taken_ms: elapsed_ms(start),
        }
    }

    /// Record a placeholder marker per query. Queries are not executed and no
    /// results are memoized.
    pub fn cache<S: AsRef<str>>(&self, queries: &[S]) -> CacheQueriesResult {
        let start = Instant::now();
        {
            let mut state = self.state.write();
            for query in queries {
                state.queries.insert(
                    query.as_ref().to_string(),
                    QueryMarker {
                        cached: true,
                        cached_at: Utc::now(),
                    },
                );
            }
        }
        CacheQueriesResult {
            queries_warmed: queries.len(),
            time_taken_ms: elapsed_ms(start),
        }
    }

    // ── Introspection ────────────────────────────────────────────────────────

    pub fn stats(&self) -> StatsReport {
        let state = self.state.read();
        let (hit_rate, miss_rate) = match state.stats.hit_rate() {
            Some(rate) => (rate, state.stats.misses as f64 / state.stats.lookups() as f64),
            None => (0.0, 0.0),
        };
        StatsReport {
            cache_hit_rate: hit_rate,
            cache_miss_rate: miss_rate,
            cache_hits: state.stats.hits,
            cache_misses: state.stats.misses,
            memory_used: state.stats.memory_used,
            items_cached: state.items_cached(),
            nodes_cached: state.nodes.len(),
            relationships_cached: state.relationships.len(),
            queries_cached: state.queries.len(),
            label_indexes: state.nodes_by_label.len(),
            type_indexes: state.rels_by_type.len(),
        }
    }

    pub fn status(&self) -> StatusReport {
        let state = self.state.read();
        StatusReport {
            running: state.running,
            last_run: state.last_run.as_ref().map(rfc3339),
            next_run: state.next_run.as_ref().map(rfc3339),
            scheduled_cron: state.scheduled_cron.clone(),
            items_cached: state.items_cached(),
        }
    }

    /// Cached share of the live graph, as a percentage of nodes plus relationships.
    pub fn progress(&self) -> ProgressReport {
        let total_nodes = self.storage.all_nodes().map(|n| n.len()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "progress could not count nodes");
            0
        });
        let total_relationships = self
            .storage
            .all_relationships()
            .map(|r| r.len())
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "progress could not count relationships");
                0
            });

        let state = self.state.read();
        let nodes_loaded = state.nodes.len();
        let relationships_loaded = state.relationships.len();
        let total = total_nodes + total_relationships;
        let percentage = if total > 0 {
            (nodes_loaded + relationships_loaded) as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        ProgressReport {
            percentage,
            nodes_loaded,
            total_nodes,
            relationships_loaded,
            total_relationships,
        }
    }

    /// Drop all cached content and reset counters. Run timestamps and the
    /// stored schedule survive.
    pub fn clear(&self) -> ClearResult {
        let mut state = self.state.write();
        let items_cleared = state.items_cached();

        state.nodes.clear();
        state.relationships.clear();
        state.nodes_by_label.clear();
        state.rels_by_type.clear();
        state.properties.clear();
        state.queries.clear();
        state.stats = CacheStats::default();

        tracing::debug!(items = items_cleared, "warmup cache cleared");
        ClearResult {
            cleared: true,
            items_cleared,
        }
    }

    /// Heuristic tuning advice. Never changes cache state.
    pub fn optimize(&self) -> OptimizeResult {
        let start = Instant::now();
        let mut recommendations = Vec::new();
        {
            let state = self.state.read();

            if state.nodes.is_empty() {
                recommendations.push(ADVICE_RUN.to_string());
            }
            if state.nodes_by_label.is_empty() {
                recommendations.push(ADVICE_INDEXES.to_string());
            }
            if state.stats.hit_rate().is_some_and(|rate| rate < LOW_HIT_RATE) {
                recommendations.push(ADVICE_HIT_RATE.to_string());
            }

            let mut hot: Vec<&str> = state
                .nodes_by_label
                .iter()
                .filter(|(_, nodes)| nodes.len() > HOT_LABEL_THRESHOLD)
                .map(|(label, _)| label.as_str())
                .collect();
            if !hot.is_empty() {
                hot.sort_unstable();
                recommendations.push(format!("{ADVICE_HOT_LABELS}{}", hot.join(", ")));
            }
        }

        if recommendations.is_empty() {
            recommendations.push(ADVICE_OK.to_string());
        }

        OptimizeResult {
            optimized: true,
            time_taken_ms: elapsed_ms(start),
            recommendations,
        }
    }

    /// Store a cron expression. Nothing is scheduled to act on it.
    pub fn schedule(&self, cron: &str) -> ScheduleResult {
        self.state.write().scheduled_cron = cron.to_string();
        tracing::debug!(cron, "warmup schedule recorded");
        ScheduleResult {
            scheduled: true,
            cron: cron.to_string(),
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    /// Cached node by ID. Counts a hit or a miss.
    pub fn get_cached_node(&self, id: i64) -> Option<Arc<Node>> {
        let mut state = self.state.write();
        let found = state.nodes.get(&id).cloned();
        record_lookup(&mut state.stats, found.is_some());
        found
    }

    /// Cached relationship by ID. Counts a hit or a miss.
    pub fn get_cached_relationship(&self, id: i64) -> Option<Arc<Relationship>> {
        let mut state = self.state.write();
        let found = state.relationships.get(&id).cloned();
        record_lookup(&mut state.stats, found.is_some());
        found
    }

    /// Label index entry. Does not touch hit/miss counters.
    pub fn get_nodes_by_label(&self, label: &str) -> Option<Vec<Arc<Node>>> {
        self.state.read().nodes_by_label.get(label).cloned()
    }

    /// Type index entry. Does not touch hit/miss counters.
    pub fn get_relationships_by_type(&self, rel_type: &str) -> Option<Vec<Arc<Relationship>>> {
        self.state.read().rels_by_type.get(rel_type).cloned()
    }

    /// Values accumulated by [`properties`](Self::properties) for `key`.
    pub fn property_values(&self, key: &str) -> Option<Vec<Value>> {
        self.state.read().properties.get(key).cloned()
    }

    /// Marker recorded by [`cache`](Self::cache) for `query`.
    pub fn cached_query(&self, query: &str) -> Option<QueryMarker> {
        self.state.read().queries.get(query).cloned()
    }
}

fn record_lookup(stats: &mut CacheStats, hit: bool) {
    if hit {
        stats.hits += 1;
    } else {
        stats.misses += 1;
    }
}

fn collect_values<'a>(
    sink: &mut HashMap<String, Vec<Value>>,
    keys: &[String],
    properties: impl Iterator<Item = (&'a String, &'a Value)>,
) -> usize {
    let mut collected = 0;
    for (key, value) in properties {
        if keys.contains(key) {
            sink.entry(key.clone()).or_default().push(value.clone());
            collected += 1;
        }
    }
    collected
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
