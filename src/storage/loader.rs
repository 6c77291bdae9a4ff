//! JSON-lines graph loader.
//!
//! Reads `nodes.json` and `relationships.json` from a directory, one JSON
//! object per line:
//!
//! ```text
//! {"id": 1, "labels": ["Person"], "properties": {"name": "Alice"}}
//! {"id": 1, "type": "KNOWS", "start": 1, "end": 2, "properties": {}}
//! ```
//!
//! Either file may be absent. Nodes load before relationships so endpoints
//! resolve.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::{MemoryStorage, StorageError, StorageResult};
use crate::graph::{Node, Relationship};

pub const NODES_FILE: &str = "nodes.json";
pub const RELATIONSHIPS_FILE: &str = "relationships.json";

/// Counts of entities loaded into storage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub nodes: usize,
    pub relationships: usize,
}

/// Load `nodes.json` and `relationships.json` from `dir` into `storage`.
pub fn load_json_dir(storage: &MemoryStorage, dir: impl AsRef<Path>) -> StorageResult<LoadSummary> {
    let dir = dir.as_ref();
    let mut summary = LoadSummary::default();

    if let Some(file) = open_optional(&dir.join(NODES_FILE))? {
        summary.nodes = load_nodes(storage, file)?;
    }
    if let Some(file) = open_optional(&dir.join(RELATIONSHIPS_FILE))? {
        summary.relationships = load_relationships(storage, file)?;
    }

    tracing::info!(
        dir = %dir.display(),
        nodes = summary.nodes,
        relationships = summary.relationships,
        "graph loaded"
    );
    Ok(summary)
}

/// Load nodes from a JSON-lines reader. Returns the number loaded.
pub fn load_nodes(storage: &MemoryStorage, reader: impl Read) -> StorageResult<usize> {
    let nodes: Vec<Node> = parse_lines(reader, "node")?;
    let count = nodes.len();
    for node in nodes {
        storage.insert_node(node);
    }
    Ok(count)
}

/// Load relationships from a JSON-lines reader. Returns the number loaded.
///
/// Every endpoint is checked before anything is inserted, so a dangling
/// relationship anywhere in the input leaves storage untouched.
pub fn load_relationships(storage: &MemoryStorage, reader: impl Read) -> StorageResult<usize> {
    let rels: Vec<Relationship> = parse_lines(reader, "relationship")?;
    if let Some((id, missing)) = rels.iter().find_map(|rel| {
        [rel.start_node, rel.end_node]
            .into_iter()
            .find(|endpoint| storage.node(*endpoint).is_none())
            .map(|endpoint| (rel.id, endpoint))
    }) {
        return Err(StorageError::Load(format!(
            "relationship {id}: {}",
            StorageError::NodeNotFound(missing)
        )));
    }

    let count = rels.len();
    for rel in rels {
        let id = rel.id;
        storage.insert_relationship(rel).map_err(|e| {
            StorageError::Load(format!("relationship {id}: {e}"))
        })?;
    }
    Ok(count)
}

fn parse_lines<T: DeserializeOwned>(reader: impl Read, kind: &str) -> StorageResult<Vec<T>> {
    let mut items = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let item = serde_json::from_str(trimmed).map_err(|e| {
            StorageError::Load(format!("invalid {kind} on line {}: {e}", index + 1))
        })?;
        items.push(item);
    }
    Ok(items)
}

fn open_optional(path: &Path) -> StorageResult<Option<std::fs::File>> {
    match std::fs::File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "graph file absent, skipping");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
