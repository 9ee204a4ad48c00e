//! Common test utilities for knowgraph integration tests
//!
//! Every contract test runs once per backend, so the helpers here hand out
//! both stores behind `Box<dyn GraphStore>`.

#![allow(dead_code)]

use knowgraph::{
    CreateNodeInput, CreateRelationshipInput, GraphConfig, GraphStore, MemoryGraph, Node,
    Relationship, SqliteStore,
};

/// Uninitialized stores, one per backend
pub fn fresh_backends(config: GraphConfig) -> Vec<(&'static str, Box<dyn GraphStore>)> {
    vec![
        (
            "memory",
            Box::new(MemoryGraph::with_config(config.clone())) as Box<dyn GraphStore>,
        ),
        (
            "sqlite",
            Box::new(SqliteStore::in_memory_with_config(config).expect("open sqlite"))
                as Box<dyn GraphStore>,
        ),
    ]
}

/// Initialized stores with default configuration
pub fn backends() -> Vec<(&'static str, Box<dyn GraphStore>)> {
    backends_with_config(GraphConfig::default())
}

pub fn backends_with_config(config: GraphConfig) -> Vec<(&'static str, Box<dyn GraphStore>)> {
    let mut stores = fresh_backends(config);
    for (name, store) in stores.iter_mut() {
        store
            .initialize()
            .unwrap_or_else(|e| panic!("{name}: initialize failed: {e}"));
    }
    stores
}

/// A(PERSON) -KNOWS-> B(PERSON) -WORKS_AT-> C(ORGANIZATION)
pub struct Scenario {
    pub a: Node,
    pub b: Node,
    pub c: Node,
    pub knows: Relationship,
    pub works_at: Relationship,
}

pub fn build_scenario(store: &mut dyn GraphStore) -> Scenario {
    let a = store
        .create_node(CreateNodeInput::new("PERSON", "Alice").with_property("age", 34i64))
        .expect("create A");
    let b = store
        .create_node(CreateNodeInput::new("PERSON", "Bob").with_property("age", 41i64))
        .expect("create B");
    let c = store
        .create_node(CreateNodeInput::new("ORGANIZATION", "Acme"))
        .expect("create C");
    let knows = store
        .create_relationship(CreateRelationshipInput::new(
            a.id.clone(),
            b.id.clone(),
            "KNOWS",
            "knows",
        ))
        .expect("create KNOWS");
    let works_at = store
        .create_relationship(
            CreateRelationshipInput::new(b.id.clone(), c.id.clone(), "WORKS_AT", "works at")
                .with_property("since", 2019i64),
        )
        .expect("create WORKS_AT");

    Scenario {
        a,
        b,
        c,
        knows,
        works_at,
    }
}

/// Labels of a node list, in order
pub fn labels(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.label.as_str()).collect()
}
