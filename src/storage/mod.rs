//! Storage seam consumed by the search engine and the warmup cache.
//!
//! [`Storage`] is the only contract the acceleration layer depends on. It owns
//! identity, lifecycle, and consistency of nodes and relationships and may fail
//! transiently. [`MemoryStorage`] is a thread-safe in-memory implementation used
//! by the CLI and tests; [`loader`] fills one from JSON-lines files.

pub mod loader;

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::graph::{Direction, Node, Properties, Relationship};

/// Errors surfaced by a [`Storage`] backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("node not found: {0}")]
    NodeNotFound(i64),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("graph load failed: {0}")]
    Load(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Read access to a property graph.
///
/// An empty `rel_type` filter means "no type restriction".
pub trait Storage: Send + Sync {
    fn all_nodes(&self) -> StorageResult<Vec<Arc<Node>>>;

    fn all_relationships(&self) -> StorageResult<Vec<Arc<Relationship>>>;

    /// Nodes adjacent to `node_id` through relationships in `direction`.
    fn node_neighbors(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Node>>>;

    /// Relationships incident to `node_id` in `direction`.
    fn node_relationships(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Relationship>>>;
}

#[derive(Default)]
struct Graph {
    nodes: BTreeMap<i64, Arc<Node>>,
    relationships: BTreeMap<i64, Arc<Relationship>>,
    next_node_id: i64,
    next_rel_id: i64,
}

impl Graph {
    fn incident<'a>(
        &'a self,
        node_id: i64,
        rel_type: &'a str,
        direction: Direction,
    ) -> impl Iterator<Item = &'a Arc<Relationship>> + 'a {
        self.relationships.values().filter(move |rel| {
            rel.touches(node_id, direction) && (rel_type.is_empty() || rel.rel_type == rel_type)
        })
    }
}

/// In-memory [`Storage`] with auto-assigned IDs starting at 1.
///
/// Enumeration is ordered by ID.
#[derive(Default)]
pub struct MemoryStorage {
    graph: RwLock<Graph>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with the next free ID.
    pub fn create_node(&self, labels: &[&str], properties: Properties) -> Arc<Node> {
        let mut graph = self.graph.write();
        graph.next_node_id += 1;
        let id = graph.next_node_id;
        let node = Arc::new(Node::new(
            id,
            labels.iter().map(|l| l.to_string()).collect(),
            properties,
        ));
        graph.nodes.insert(id, Arc::clone(&node));
        node
    }

    /// Create a relationship with the next free ID. Both endpoints must exist.
    pub fn create_relationship(
        &self,
        start: i64,
        end: i64,
        rel_type: &str,
        properties: Properties,
    ) -> StorageResult<Arc<Relationship>> {
        let mut graph = self.graph.write();
        for endpoint in [start, end] {
            if !graph.nodes.contains_key(&endpoint) {
                return Err(StorageError::NodeNotFound(endpoint));
            }
        }
        graph.next_rel_id += 1;
        let id = graph.next_rel_id;
        let rel = Arc::new(Relationship::new(id, rel_type, start, end, properties));
        graph.relationships.insert(id, Arc::clone(&rel));
        Ok(rel)
    }

    /// Insert a node that already carries an ID, replacing any node with the same ID.
    pub fn insert_node(&self, node: Node) -> Arc<Node> {
        let mut graph = self.graph.write();
        graph.next_node_id = graph.next_node_id.max(node.id);
        let node = Arc::new(node);
        graph.nodes.insert(node.id, Arc::clone(&node));
        node
    }

    /// Insert a relationship that already carries an ID. Both endpoints must exist.
    pub fn insert_relationship(&self, rel: Relationship) -> StorageResult<Arc<Relationship>> {
        let mut graph = self.graph.write();
        for endpoint in [rel.start_node, rel.end_node] {
            if !graph.nodes.contains_key(&endpoint) {
                return Err(StorageError::NodeNotFound(endpoint));
            }
        }
        graph.next_rel_id = graph.next_rel_id.max(rel.id);
        let rel = Arc::new(rel);
        graph.relationships.insert(rel.id, Arc::clone(&rel));
        Ok(rel)
    }

    pub fn node(&self, id: i64) -> Option<Arc<Node>> {
        self.graph.read().nodes.get(&id).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.graph.read().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.read().relationships.len()
    }
}

impl Storage for MemoryStorage {
    fn all_nodes(&self) -> StorageResult<Vec<Arc<Node>>> {
        Ok(self.graph.read().nodes.values().cloned().collect())
    }

    fn all_relationships(&self) -> StorageResult<Vec<Arc<Relationship>>> {
        Ok(self.graph.read().relationships.values().cloned().collect())
    }

    fn node_neighbors(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Node>>> {
        let graph = self.graph.read();
        if !graph.nodes.contains_key(&node_id) {
            return Err(StorageError::NodeNotFound(node_id));
        }

        let mut seen = HashSet::new();
        let mut neighbors = Vec::new();
        for rel in graph.incident(node_id, rel_type, direction) {
            let Some(other) = rel.other_end(node_id) else {
                continue;
            };
            if !seen.insert(other) {
                continue;
            }
            if let Some(node) = graph.nodes.get(&other) {
                neighbors.push(Arc::clone(node));
            }
        }
        Ok(neighbors)
    }

    fn node_relationships(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Relationship>>> {
        let graph = self.graph.read();
        if !graph.nodes.contains_key(&node_id) {
            return Err(StorageError::NodeNotFound(node_id));
        }
        Ok(graph
            .incident(node_id, rel_type, direction)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::props;

    fn small_graph() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.create_node(&["Person"], props([("name", "Alice")]));
        storage.create_node(&["Person"], props([("name", "Bob")]));
        storage.create_node(&["Company"], props([("name", "Acme")]));
        storage
            .create_relationship(1, 3, "WORKS_AT", Properties::new())
            .unwrap();
        storage
            .create_relationship(2, 3, "WORKS_AT", Properties::new())
            .unwrap();
        storage
            .create_relationship(1, 2, "KNOWS", Properties::new())
            .unwrap();
        storage
    }

    #[test]
    fn test_ids_start_at_one() {
        let storage = small_graph();
        let ids: Vec<i64> = storage.all_nodes().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let rel_ids: Vec<i64> = storage
            .all_relationships()
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(rel_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_create_relationship_requires_endpoints() {
        let storage = small_graph();
        let err = storage
            .create_relationship(1, 99, "KNOWS", Properties::new())
            .unwrap_err();
        assert!(matches!(err, StorageError::NodeNotFound(99)));
        assert_eq!(storage.relationship_count(), 3);
    }

    #[test]
    fn test_neighbors_by_direction() {
        let storage = small_graph();

        let out: Vec<i64> = storage
            .node_neighbors(1, "", Direction::Out)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(out, vec![3, 2]);

        let incoming: Vec<i64> = storage
            .node_neighbors(3, "", Direction::In)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(incoming, vec![1, 2]);

        assert!(storage.node_neighbors(3, "", Direction::Out).unwrap().is_empty());
    }

    #[test]
    fn test_neighbors_type_filter() {
        let storage = small_graph();
        let knows = storage.node_neighbors(1, "KNOWS", Direction::Both).unwrap();
        assert_eq!(knows.len(), 1);
        assert_eq!(knows[0].id, 2);
    }

    #[test]
    fn test_both_direction_deduplicates_neighbors() {
        let storage = small_graph();
        storage
            .create_relationship(2, 1, "KNOWS", Properties::new())
            .unwrap();
        let neighbors = storage.node_neighbors(1, "", Direction::Both).unwrap();
        assert_eq!(neighbors.len(), 2);

        let rels = storage.node_relationships(1, "KNOWS", Direction::Both).unwrap();
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let storage = small_graph();
        assert!(storage.node_neighbors(42, "", Direction::Both).is_err());
        assert!(storage.node_relationships(42, "", Direction::Both).is_err());
    }

    #[test]
    fn test_insert_advances_id_counter() {
        let storage = MemoryStorage::new();
        storage.insert_node(Node::new(10, vec!["A".into()], Properties::new()));
        let next = storage.create_node(&["B"], Properties::new());
        assert_eq!(next.id, 11);
    }
}
