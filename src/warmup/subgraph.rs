//! Breadth-first subgraph preload.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use super::{elapsed_ms, SubgraphResult, WarmupCache};
use crate::graph::{Direction, Node};

impl WarmupCache {
    /// Cache `start` and everything within `depth` hops of it.
    ///
    /// Hop 0 is the start node itself; a negative depth behaves like 0. Each
    /// expanded node contributes its neighbors (either direction) and its
    /// incident relationships. A node counts the first time this traversal
    /// reaches it; a relationship counts only if it was not already cached,
    /// so edges from an earlier preload are not re-counted. The exclusive lock
    /// is held for the whole traversal, and neither depth nor fan-out is capped.
    pub fn subgraph(&self, start: Option<&Arc<Node>>, depth: i64) -> SubgraphResult {
        let started = Instant::now();

        let Some(start) = start else {
            return SubgraphResult {
                nodes_loaded: 0,
                relationships_loaded: 0,
                depth,
                time_taken_ms: elapsed_ms(started),
                error: Some("start node is missing".to_string()),
            };
        };

        let mut nodes_loaded = 0;
        let mut relationships_loaded = 0;
        let mut visited = HashSet::from([start.id]);
        let mut queue = VecDeque::from([Arc::clone(start)]);
        let mut current_depth = 0;

        let mut state = self.state.write();
        state.cache_node(start);
        nodes_loaded += 1;

        while !queue.is_empty() && current_depth < depth {
            for _ in 0..queue.len() {
                let Some(current) = queue.pop_front() else {
                    break;
                };

                match self.storage.node_neighbors(current.id, "", Direction::Both) {
                    Ok(neighbors) => {
                        for neighbor in neighbors {
                            if visited.insert(neighbor.id) {
                                state.cache_node(&neighbor);
                                nodes_loaded += 1;
                                queue.push_back(neighbor);
                            }
                        }
                    }
                    Err(e) => tracing::warn!(
                        node = current.id,
                        error = %e,
                        "subgraph neighbor read failed"
                    ),
                }

                match self.storage.node_relationships(current.id, "", Direction::Both) {
                    Ok(rels) => {
                        for rel in rels {
                            if !state.relationships.contains_key(&rel.id) {
                                state.cache_relationship(&rel);
                                relationships_loaded += 1;
                            }
                        }
                    }
                    Err(e) => tracing::warn!(
                        node = current.id,
                        error = %e,
                        "subgraph relationship read failed"
                    ),
                }
            }
            current_depth += 1;
        }
        drop(state);

        tracing::debug!(
            start = start.id,
            depth,
            nodes = nodes_loaded,
            relationships = relationships_loaded,
            "subgraph warmup complete"
        );
        SubgraphResult {
            nodes_loaded,
            relationships_loaded,
            depth,
            time_taken_ms: elapsed_ms(started),
            error: None,
        }
    }
}
