//! knowgraph: typed knowledge graph engine
//!
//! Stores typed nodes and directed, typed relationships with arbitrary
//! properties and optional embeddings, and answers filtered, structural and
//! similarity queries over them.
//!
//! # Core Concepts
//!
//! - **Nodes**: typed entities with a label, properties and an optional vector
//! - **Relationships**: directed, typed links between two existing nodes
//! - **Stores**: backends implementing the [`GraphStore`] contract, either the
//!   in-process [`MemoryGraph`] or the persistent [`SqliteStore`]
//! - **Snapshots**: whole-graph export/import as JSON, CSV or GraphML
//!
//! # Example
//!
//! ```
//! use knowgraph::{CreateNodeInput, CreateRelationshipInput, GraphStore, MemoryGraph, PathQuery};
//!
//! let mut graph = MemoryGraph::new();
//! graph.initialize().unwrap();
//!
//! let ada = graph.create_node(CreateNodeInput::new("PERSON", "Ada")).unwrap();
//! let acme = graph.create_node(CreateNodeInput::new("ORGANIZATION", "Acme")).unwrap();
//! graph
//!     .create_relationship(CreateRelationshipInput::new(
//!         ada.id.clone(),
//!         acme.id.clone(),
//!         "WORKS_AT",
//!         "works at",
//!     ))
//!     .unwrap();
//!
//! let path = graph
//!     .find_shortest_path(&PathQuery::between(ada.id, acme.id))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(path.length, 1);
//! ```

pub mod config;
mod graph;
pub mod query;
pub mod snapshot;
pub mod storage;

pub use config::GraphConfig;
pub use graph::{
    CreateNodeInput, CreateRelationshipInput, MemoryGraph, Node, NodeId, Properties,
    PropertyValue, Relationship, RelationshipId, UpdateNodeInput, UpdateRelationshipInput,
};
pub use query::{
    Direction, FindQuery, GraphPath, GraphStats, PathQuery, SimilarityMatch, SortDirection,
    TraversalResult, TraverseQuery, VectorQuery,
};
pub use snapshot::{ExportFormat, ExportReport, GraphSnapshot, ImportReport, MergeStrategy};
pub use storage::{GraphStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
