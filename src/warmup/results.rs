//! Result records returned by [`WarmupCache`](super::WarmupCache) operations.
//!
//! Field names serialize in camelCase (`nodesLoaded`, `timeTaken`, ...).
//! Operations that can hit a Storage failure carry an optional `error` string
//! instead of returning `Err`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Options for [`WarmupCache::run_with_params`](super::WarmupCache::run_with_params).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WarmupParams {
    /// Restrict node preload to these labels.
    pub labels: Vec<String>,
    /// Restrict relationship preload to these types.
    pub types: Vec<String>,
    /// Only affects the reported index count.
    pub load_indexes: bool,
}

impl Default for WarmupParams {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            types: Vec::new(),
            load_indexes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub nodes_loaded: usize,
    pub relationships_loaded: usize,
    /// Only reported by a full run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_loaded: Option<usize>,
    pub indexes_loaded: usize,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesResult {
    pub nodes_loaded: usize,
    pub labels: Vec<String>,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipsResult {
    pub relationships_loaded: usize,
    pub types: Vec<String>,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexesResult {
    pub indexes_loaded: usize,
    pub label_indexes: usize,
    pub type_indexes: usize,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesResult {
    pub properties_loaded: usize,
    pub keys: Vec<String>,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphResult {
    pub nodes_loaded: usize,
    pub relationships_loaded: usize,
    pub depth: i64,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub nodes_loaded: usize,
    pub relationships_loaded: usize,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheQueriesResult {
    pub queries_warmed: usize,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
}

/// Placeholder stored per warmed query. No query result is held.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMarker {
    pub cached: bool,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub cached_at: DateTime<Utc>,
}

/// Raw lookup counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Tracked but never computed; always zero.
    pub memory_used: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate in `[0, 1]`, or `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.lookups();
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub cache_hit_rate: f64,
    pub cache_miss_rate: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub memory_used: u64,
    pub items_cached: usize,
    pub nodes_cached: usize,
    pub relationships_cached: usize,
    pub queries_cached: usize,
    pub label_indexes: usize,
    pub type_indexes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub running: bool,
    /// RFC3339, present once a full run has finished.
    pub last_run: Option<String>,
    pub next_run: Option<String>,
    pub scheduled_cron: String,
    pub items_cached: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub percentage: f64,
    pub nodes_loaded: usize,
    pub total_nodes: usize,
    #[serde(rename = "relsLoaded")]
    pub relationships_loaded: usize,
    #[serde(rename = "totalRels")]
    pub total_relationships: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResult {
    pub cleared: bool,
    pub items_cleared: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResult {
    pub optimized: bool,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub scheduled: bool,
    pub cron: String,
}

/// RFC 3339 in UTC at second precision, e.g. `2024-05-01T12:00:00Z`.
pub(super) fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn serialize_rfc3339<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&rfc3339(ts))
}
