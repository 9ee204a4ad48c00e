//! Query system for knowgraph
//!
//! Provides capabilities for finding nodes and relationships, traversing
//! the graph, computing paths, ranking by embedding similarity and
//! aggregating statistics. Everything here reads through `GraphStore`
//! primitives and never mutates.

mod find;
mod path;
mod similarity;
mod stats;
mod traverse;
mod types;

pub use find::{compare_keys, FindQuery, Queryable, SortKey};
pub use path::{PathQuery, DEFAULT_ALL_PATHS_DEPTH, DEFAULT_SHORTEST_PATH_DEPTH};
pub use similarity::{cosine_similarity, VectorQuery};
pub use stats::GraphStats;
pub use traverse::{TraverseQuery, DEFAULT_TRAVERSAL_DEPTH, DEFAULT_TRAVERSAL_LIMIT};
pub use types::{Direction, GraphPath, SimilarityMatch, SortDirection, TraversalResult};
