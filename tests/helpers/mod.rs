#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};

use nornicdb_accel::graph::{props, Direction, Node, Relationship, Value};
use nornicdb_accel::storage::{MemoryStorage, Storage, StorageError, StorageResult};

/// Node IDs of the fixture graph.
pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const ACME: i64 = 3;

/// Small company graph:
///
/// ```text
/// (Alice:Person)-[:WORKS_AT]->(Acme:Company)<-[:WORKS_AT]-(Bob:Person)
/// (Alice)-[:KNOWS]->(Bob)
/// ```
///
/// Alice has an email; Bob has an explicit null nickname.
pub fn fixture_graph() -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage.create_node(
        &["Person"],
        props([
            ("name", Value::from("Alice")),
            ("age", Value::from(30)),
            ("email", Value::from("alice@example.com")),
        ]),
    );
    storage.create_node(
        &["Person"],
        props([
            ("name", Value::from("Bob")),
            ("age", Value::from(25)),
            ("nickname", Value::Null),
        ]),
    );
    storage.create_node(
        &["Company"],
        props([("name", Value::from("Acme")), ("founded", Value::from(1999))]),
    );
    storage
        .create_relationship(ALICE, ACME, "WORKS_AT", props([("since", Value::from(2020))]))
        .unwrap();
    storage
        .create_relationship(BOB, ACME, "WORKS_AT", props([("since", Value::from(2022))]))
        .unwrap();
    storage
        .create_relationship(ALICE, BOB, "KNOWS", props([("since", Value::from(2015))]))
        .unwrap();
    storage
}

/// `count` nodes labelled `label` with sequential `n` properties.
pub fn many_nodes(storage: &MemoryStorage, label: &str, count: i64) {
    for n in 0..count {
        storage.create_node(&[label], props([("n", Value::from(n))]));
    }
}

/// A Storage backend that always fails.
pub struct FailingStorage;

impl Storage for FailingStorage {
    fn all_nodes(&self) -> StorageResult<Vec<Arc<Node>>> {
        Err(StorageError::Unavailable("backend offline".into()))
    }

    fn all_relationships(&self) -> StorageResult<Vec<Arc<Relationship>>> {
        Err(StorageError::Unavailable("backend offline".into()))
    }

    fn node_neighbors(&self, _: i64, _: &str, _: Direction) -> StorageResult<Vec<Arc<Node>>> {
        Err(StorageError::Unavailable("backend offline".into()))
    }

    fn node_relationships(
        &self,
        _: i64,
        _: &str,
        _: Direction,
    ) -> StorageResult<Vec<Arc<Relationship>>> {
        Err(StorageError::Unavailable("backend offline".into()))
    }
}

/// Wraps a [`MemoryStorage`] and fails every read while `failing` is set.
pub struct FlakyStorage {
    pub inner: Arc<MemoryStorage>,
    failing: AtomicBool,
}

impl FlakyStorage {
    pub fn new(inner: Arc<MemoryStorage>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("flaky backend".into()))
        } else {
            Ok(())
        }
    }
}

impl Storage for FlakyStorage {
    fn all_nodes(&self) -> StorageResult<Vec<Arc<Node>>> {
        self.check()?;
        self.inner.all_nodes()
    }

    fn all_relationships(&self) -> StorageResult<Vec<Arc<Relationship>>> {
        self.check()?;
        self.inner.all_relationships()
    }

    fn node_neighbors(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Node>>> {
        self.check()?;
        self.inner.node_neighbors(node_id, rel_type, direction)
    }

    fn node_relationships(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Relationship>>> {
        self.check()?;
        self.inner.node_relationships(node_id, rel_type, direction)
    }
}

/// Wraps a [`MemoryStorage`] and parks the first `all_relationships` call
/// until the test calls [`GatedStorage::release`].
///
/// The test thread calls [`GatedStorage::wait_until_parked`] to know the
/// reader is parked.
pub struct GatedStorage {
    pub inner: Arc<MemoryStorage>,
    armed: AtomicBool,
    parked: Barrier,
    released: Barrier,
}

impl GatedStorage {
    pub fn new(inner: Arc<MemoryStorage>) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(true),
            parked: Barrier::new(2),
            released: Barrier::new(2),
        }
    }

    pub fn wait_until_parked(&self) {
        self.parked.wait();
    }

    pub fn release(&self) {
        self.released.wait();
    }
}

impl Storage for GatedStorage {
    fn all_nodes(&self) -> StorageResult<Vec<Arc<Node>>> {
        self.inner.all_nodes()
    }

    fn all_relationships(&self) -> StorageResult<Vec<Arc<Relationship>>> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.parked.wait();
            self.released.wait();
        }
        self.inner.all_relationships()
    }

    fn node_neighbors(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Node>>> {
        self.inner.node_neighbors(node_id, rel_type, direction)
    }

    fn node_relationships(
        &self,
        node_id: i64,
        rel_type: &str,
        direction: Direction,
    ) -> StorageResult<Vec<Arc<Relationship>>> {
        self.inner.node_relationships(node_id, rel_type, direction)
    }
}

/// Sorted node IDs, for order-insensitive comparison.
pub fn ids(nodes: &[Arc<Node>]) -> Vec<i64> {
    let mut ids: Vec<i64> = nodes.iter().map(|n| n.id).collect();
    ids.sort_unstable();
    ids
}
