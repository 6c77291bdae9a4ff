//! Property graph data model.
//!
//! Defines [`Value`] (the dynamically-typed property scalar), [`Node`],
//! [`Relationship`], and [`Direction`]. Entities are handed around as
//! `Arc<Node>` / `Arc<Relationship>`: Storage owns identity, everything else
//! holds shared references.

mod value;

pub use value::Value;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property map shared by nodes and relationships.
pub type Properties = HashMap<String, Value>;

/// A graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Process-unique identifier assigned by Storage.
    pub id: i64,
    /// Zero or more labels; membership is unordered.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    pub fn new(id: i64, labels: Vec<String>, properties: Properties) -> Self {
        Self {
            id,
            labels,
            properties,
        }
    }

    /// `true` if `label` is one of this node's labels.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// The string value of `property`, if present and a string.
    pub fn str_property(&self, property: &str) -> Option<&str> {
        self.properties.get(property).and_then(Value::as_str)
    }
}

/// A directed, typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: i64,
    /// Exactly one relationship type (e.g. `"KNOWS"`).
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(rename = "start")]
    pub start_node: i64,
    #[serde(rename = "end")]
    pub end_node: i64,
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    pub fn new(
        id: i64,
        rel_type: impl Into<String>,
        start_node: i64,
        end_node: i64,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            start_node,
            end_node,
            properties,
        }
    }

    /// The endpoint opposite `node_id`, or `None` if `node_id` is not an endpoint.
    pub fn other_end(&self, node_id: i64) -> Option<i64> {
        if self.start_node == node_id {
            Some(self.end_node)
        } else if self.end_node == node_id {
            Some(self.start_node)
        } else {
            None
        }
    }

    /// Whether this relationship touches `node_id` in the given direction.
    pub fn touches(&self, node_id: i64, direction: Direction) -> bool {
        match direction {
            Direction::Out => self.start_node == node_id,
            Direction::In => self.end_node == node_id,
            Direction::Both => self.start_node == node_id || self.end_node == node_id,
        }
    }
}

/// Traversal direction relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Relationships ending at the node.
    In,
    /// Relationships starting at the node.
    Out,
    /// Either end; the relationship is treated as undirected.
    Both,
}

/// Build a [`Properties`] map from `(key, value)` pairs.
pub fn props<K, V, I>(pairs: I) -> Properties
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_label() {
        let node = Node::new(1, vec!["Person".into(), "Admin".into()], Properties::new());
        assert!(node.has_label("Person"));
        assert!(node.has_label("Admin"));
        assert!(!node.has_label("person"));
    }

    #[test]
    fn test_other_end_and_touches() {
        let rel = Relationship::new(7, "KNOWS", 1, 2, Properties::new());
        assert_eq!(rel.other_end(1), Some(2));
        assert_eq!(rel.other_end(2), Some(1));
        assert_eq!(rel.other_end(3), None);

        assert!(rel.touches(1, Direction::Out));
        assert!(!rel.touches(1, Direction::In));
        assert!(rel.touches(2, Direction::In));
        assert!(rel.touches(2, Direction::Both));
    }

    #[test]
    fn test_relationship_json_shape() {
        let json = r#"{"id":3,"type":"WORKS_AT","start":1,"end":2,"properties":{"since":2020}}"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        assert_eq!(rel.rel_type, "WORKS_AT");
        assert_eq!(rel.start_node, 1);
        assert_eq!(rel.properties["since"], Value::Int(2020));
    }
}
