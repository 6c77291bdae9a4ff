//! Pattern-matching search over live Storage snapshots.
//!
//! Every call re-reads Storage; nothing is cached between calls. A Storage
//! failure degrades to an empty result (logged at `warn`) rather than an error,
//! so "no matches" and "backend failed" look the same to the caller.
//!
//! String comparisons in the prefix/suffix/contains/full-text/fuzzy families
//! are case-insensitive. Result order follows Storage enumeration order.

pub mod text;

use anyhow::Result;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::graph::{Node, Properties, Value};
use crate::storage::Storage;

pub use text::{calculate_score, highlight, levenshtein_distance, wildcard_to_regex};

/// Suggestion cap used by [`SearchEngine::autocomplete`].
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// Edit distance used by [`SearchEngine::did_you_mean`].
pub const DID_YOU_MEAN_DISTANCE: usize = 2;

/// A node paired with its relevance to a query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredNode {
    pub node: Arc<Node>,
    pub score: f64,
}

/// Stateless search functions bound to a [`Storage`].
#[derive(Clone)]
pub struct SearchEngine {
    storage: Arc<dyn Storage>,
}

impl SearchEngine {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // ── Exact / multi-criteria ───────────────────────────────────────────────

    /// Nodes with `label` whose `property` equals `value`.
    pub fn node(&self, label: &str, property: &str, value: &Value) -> Vec<Arc<Node>> {
        self.filter(label, |node| node.properties.get(property) == Some(value))
    }

    /// Nodes with `label` matching every `criteria` entry.
    pub fn node_all(&self, label: &str, criteria: &Properties) -> Vec<Arc<Node>> {
        self.filter(label, |node| {
            criteria
                .iter()
                .all(|(key, value)| node.properties.get(key) == Some(value))
        })
    }

    /// Nodes with `label` matching at least one `criteria` entry.
    pub fn node_any(&self, label: &str, criteria: &Properties) -> Vec<Arc<Node>> {
        self.filter(label, |node| {
            criteria
                .iter()
                .any(|(key, value)| node.properties.get(key) == Some(value))
        })
    }

    /// [`node_all`](Self::node_all) truncated to the first `limit` results.
    pub fn node_reduced(&self, label: &str, criteria: &Properties, limit: usize) -> Vec<Arc<Node>> {
        let mut nodes = self.node_all(label, criteria);
        nodes.truncate(limit);
        nodes
    }

    /// [`node_all`](Self::node_all) per label, concatenated in label order.
    pub fn multi_search_all(&self, labels: &[&str], criteria: &Properties) -> Vec<Arc<Node>> {
        labels
            .iter()
            .flat_map(|label| self.node_all(label, criteria))
            .collect()
    }

    /// Currently identical to [`multi_search_all`](Self::multi_search_all):
    /// each label is searched with AND semantics over `criteria`.
    pub fn multi_search_any(&self, labels: &[&str], criteria: &Properties) -> Vec<Arc<Node>> {
        self.multi_search_all(labels, criteria)
    }

    /// [`node`](Self::node) for each label on the rayon pool, concatenated in label order.
    pub fn parallel(&self, labels: &[&str], property: &str, value: &Value) -> Vec<Arc<Node>> {
        labels
            .par_iter()
            .map(|label| self.node(label, property, value))
            .collect::<Vec<_>>()
            .concat()
    }

    // ── Text matching ────────────────────────────────────────────────────────

    /// Nodes whose `property` contains any whitespace-separated token of `query`.
    pub fn full_text(&self, label: &str, property: &str, query: &str) -> Vec<Arc<Node>> {
        let query = query.to_lowercase();
        let words: Vec<&str> = query.split_whitespace().collect();
        self.filter_str(label, property, |text| {
            let text = text.to_lowercase();
            words.iter().any(|word| text.contains(word))
        })
    }

    /// Nodes whose `property` is within `max_distance` edits of `value`.
    pub fn fuzzy(
        &self,
        label: &str,
        property: &str,
        value: &str,
        max_distance: usize,
    ) -> Vec<Arc<Node>> {
        let value = value.to_lowercase();
        self.filter_str(label, property, |text| {
            levenshtein_distance(&text.to_lowercase(), &value) <= max_distance
        })
    }

    /// Nodes whose `property` matches `pattern` anywhere. An invalid pattern matches nothing.
    pub fn regex(&self, label: &str, property: &str, pattern: &str) -> Vec<Arc<Node>> {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::debug!(pattern, error = %e, "invalid search pattern");
                return Vec::new();
            }
        };
        self.filter_str(label, property, |text| re.is_match(text))
    }

    /// Glob match (`*`, `?`) over the whole value of `property`.
    pub fn wildcard(&self, label: &str, property: &str, pattern: &str) -> Vec<Arc<Node>> {
        self.regex(label, property, &wildcard_to_regex(pattern))
    }

    pub fn prefix(&self, label: &str, property: &str, prefix: &str) -> Vec<Arc<Node>> {
        let prefix = prefix.to_lowercase();
        self.filter_str(label, property, |text| text.to_lowercase().starts_with(&prefix))
    }

    pub fn suffix(&self, label: &str, property: &str, suffix: &str) -> Vec<Arc<Node>> {
        let suffix = suffix.to_lowercase();
        self.filter_str(label, property, |text| text.to_lowercase().ends_with(&suffix))
    }

    pub fn contains(&self, label: &str, property: &str, substring: &str) -> Vec<Arc<Node>> {
        let substring = substring.to_lowercase();
        self.filter_str(label, property, |text| text.to_lowercase().contains(&substring))
    }

    // ── Value predicates ─────────────────────────────────────────────────────

    /// Nodes whose `property` lies in `[min, max]`.
    ///
    /// Integers compare as integers against integer bounds; any other numeric
    /// mix compares as `f64`. Strings compare lexicographically against string
    /// bounds. Anything else is excluded.
    pub fn range(&self, label: &str, property: &str, min: &Value, max: &Value) -> Vec<Arc<Node>> {
        self.filter(label, |node| {
            node.properties
                .get(property)
                .is_some_and(|value| in_range(value, min, max))
        })
    }

    /// Nodes whose `property` equals one of `values`.
    pub fn in_values(&self, label: &str, property: &str, values: &[Value]) -> Vec<Arc<Node>> {
        let set: HashSet<&Value> = values.iter().collect();
        self.filter(label, |node| {
            node.properties
                .get(property)
                .is_some_and(|value| set.contains(value))
        })
    }

    /// Nodes that have `property` with a value outside `values`.
    pub fn not_in(&self, label: &str, property: &str, values: &[Value]) -> Vec<Arc<Node>> {
        let set: HashSet<&Value> = values.iter().collect();
        self.filter(label, |node| {
            node.properties
                .get(property)
                .is_some_and(|value| !set.contains(value))
        })
    }

    pub fn exists(&self, label: &str, property: &str) -> Vec<Arc<Node>> {
        self.filter(label, |node| node.properties.contains_key(property))
    }

    pub fn missing(&self, label: &str, property: &str) -> Vec<Arc<Node>> {
        self.filter(label, |node| !node.properties.contains_key(property))
    }

    /// Nodes where `property` is present and explicitly null.
    pub fn null(&self, label: &str, property: &str) -> Vec<Arc<Node>> {
        self.filter(label, |node| {
            node.properties.get(property).is_some_and(Value::is_null)
        })
    }

    /// Nodes where `property` is present and not null.
    pub fn not_null(&self, label: &str, property: &str) -> Vec<Arc<Node>> {
        self.filter(label, |node| {
            node.properties.get(property).is_some_and(|v| !v.is_null())
        })
    }

    // ── Ranking and suggestions ──────────────────────────────────────────────

    /// Score each node's string `property` against `query`. Nodes without a
    /// string value for `property` are omitted. Does not touch Storage.
    pub fn score(&self, nodes: &[Arc<Node>], property: &str, query: &str) -> Vec<ScoredNode> {
        score(nodes, property, query)
    }

    /// Up to `limit` values of `property` starting with `prefix`.
    pub fn suggest(&self, label: &str, property: &str, prefix: &str, limit: usize) -> Vec<String> {
        self.prefix(label, property, prefix)
            .iter()
            .take(limit)
            .filter_map(|node| node.str_property(property).map(str::to_string))
            .collect()
    }

    pub fn autocomplete(&self, label: &str, property: &str, prefix: &str) -> Vec<String> {
        self.suggest(label, property, prefix, AUTOCOMPLETE_LIMIT)
    }

    /// Values of `property` within [`DID_YOU_MEAN_DISTANCE`] edits of `query`.
    pub fn did_you_mean(&self, label: &str, property: &str, query: &str) -> Vec<String> {
        self.fuzzy(label, property, query, DID_YOU_MEAN_DISTANCE)
            .iter()
            .filter_map(|node| node.str_property(property).map(str::to_string))
            .collect()
    }

    // ── Index management ─────────────────────────────────────────────────────
    //
    // Extension points: accepted and acknowledged, but no index is built.

    pub fn index(&self, label: &str, properties: &[&str]) -> Result<()> {
        tracing::debug!(label, ?properties, "search index create requested");
        Ok(())
    }

    pub fn drop_index(&self, label: &str, properties: &[&str]) -> Result<()> {
        tracing::debug!(label, ?properties, "search index drop requested");
        Ok(())
    }

    pub fn reindex(&self, label: &str) -> Result<()> {
        tracing::debug!(label, "search reindex requested");
        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Nodes with `label` that satisfy `keep`, or empty if Storage fails.
    fn filter<F>(&self, label: &str, keep: F) -> Vec<Arc<Node>>
    where
        F: Fn(&Node) -> bool,
    {
        match self.storage.all_nodes() {
            Ok(nodes) => nodes
                .into_iter()
                .filter(|node| node.has_label(label) && keep(node))
                .collect(),
            Err(e) => {
                tracing::warn!(label, error = %e, "storage read failed during search");
                Vec::new()
            }
        }
    }

    /// Like [`filter`](Self::filter) but only for string values of `property`.
    fn filter_str<F>(&self, label: &str, property: &str, keep: F) -> Vec<Arc<Node>>
    where
        F: Fn(&str) -> bool,
    {
        self.filter(label, |node| node.str_property(property).is_some_and(&keep))
    }
}

/// Score nodes by their string `property` against `query`, case-insensitively.
pub fn score(nodes: &[Arc<Node>], property: &str, query: &str) -> Vec<ScoredNode> {
    let query = query.to_lowercase();
    nodes
        .iter()
        .filter_map(|node| {
            let text = node.str_property(property)?;
            Some(ScoredNode {
                node: Arc::clone(node),
                score: calculate_score(&text.to_lowercase(), &query),
            })
        })
        .collect()
}

fn in_range(value: &Value, min: &Value, max: &Value) -> bool {
    match value {
        Value::Int(v) => match (min, max) {
            (Value::Int(lo), Value::Int(hi)) => lo <= v && v <= hi,
            _ => in_f64_range(*v as f64, min, max),
        },
        Value::Float(v) => in_f64_range(*v, min, max),
        Value::String(v) => match (min, max) {
            (Value::String(lo), Value::String(hi)) => lo <= v && v <= hi,
            _ => false,
        },
        Value::Bool(_) | Value::Null => false,
    }
}

fn in_f64_range(v: f64, min: &Value, max: &Value) -> bool {
    match (min.as_f64(), max.as_f64()) {
        (Some(lo), Some(hi)) => lo <= v && v <= hi,
        _ => false,
    }
}
