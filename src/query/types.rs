//! Query types and result structures

use crate::graph::{Node, NodeId, Relationship};
use serde::{Deserialize, Serialize};

/// Direction for relationship traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Follow outgoing relationships (source -> target)
    #[default]
    Outgoing,
    /// Follow incoming relationships (target <- source)
    Incoming,
    /// Follow relationships in both directions
    Both,
}

/// Sort order for `FindQuery::order_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A walk through the graph: `nodes.len() == relationships.len() + 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Nodes from start to end (inclusive)
    pub nodes: Vec<Node>,
    /// Relationships between consecutive nodes
    pub relationships: Vec<Relationship>,
    /// Path length (number of hops)
    pub length: usize,
}

impl GraphPath {
    /// Zero-length path containing only `node`
    pub fn single(node: Node) -> Self {
        Self {
            nodes: vec![node],
            relationships: Vec::new(),
            length: 0,
        }
    }

    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        let length = relationships.len();
        Self {
            nodes,
            relationships,
            length,
        }
    }

    /// Ids of the nodes along the path, in order
    pub fn node_ids(&self) -> Vec<&NodeId> {
        self.nodes.iter().map(|n| &n.id).collect()
    }

    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn end(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Extend by one hop
    pub(crate) fn extended(&self, relationship: Relationship, node: Node) -> Self {
        let mut nodes = self.nodes.clone();
        let mut relationships = self.relationships.clone();
        nodes.push(node);
        relationships.push(relationship);
        Self::new(nodes, relationships)
    }
}

/// Result of a traversal query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Starting node
    pub origin: NodeId,
    /// Discovered nodes, origin first, in discovery order
    pub nodes: Vec<Node>,
    /// Relationships that discovered each non-origin node
    pub relationships: Vec<Relationship>,
    /// One path per discovered node, taken at first discovery
    pub paths: Vec<GraphPath>,
}

impl TraversalResult {
    pub fn new(origin: NodeId) -> Self {
        Self {
            origin,
            nodes: Vec::new(),
            relationships: Vec::new(),
            paths: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    /// Path recorded for a discovered node
    pub fn path_to(&self, id: &NodeId) -> Option<&GraphPath> {
        self.paths.iter().find(|p| p.end().map(|n| &n.id) == Some(id))
    }

    /// Deepest hop count reached
    pub fn max_depth(&self) -> usize {
        self.paths.iter().map(|p| p.length).max().unwrap_or(0)
    }
}

/// A node ranked by cosine similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub node: Node,
    pub similarity: f32,
}
