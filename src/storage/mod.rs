//! Storage backends for knowgraph
//!
//! Every backend satisfies the `GraphStore` contract. `SqliteStore` is the
//! persistent implementation; `crate::graph::MemoryGraph` is the in-process
//! reference.

mod backend;
mod sqlite;
mod traits;

pub(crate) use backend::GraphBackend;
pub use sqlite::SqliteStore;
pub use traits::{GraphStore, OpenStore, StorageError, StorageResult};
