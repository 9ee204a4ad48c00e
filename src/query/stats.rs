//! Aggregate graph statistics

use crate::graph::{Node, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub relationship_count: usize,
    /// Node count per node type
    pub node_types: BTreeMap<String, usize>,
    /// Relationship count per relationship type
    pub relationship_types: BTreeMap<String, usize>,
    /// Nodes carrying an embedding
    pub nodes_with_vectors: usize,
}

impl GraphStats {
    pub fn collect(nodes: &[Node], relationships: &[Relationship]) -> Self {
        let mut stats = GraphStats {
            node_count: nodes.len(),
            relationship_count: relationships.len(),
            ..Default::default()
        };
        for node in nodes {
            *stats.node_types.entry(node.node_type.clone()).or_default() += 1;
            if node.vector.is_some() {
                stats.nodes_with_vectors += 1;
            }
        }
        for rel in relationships {
            *stats
                .relationship_types
                .entry(rel.relationship_type.clone())
                .or_default() += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    #[test]
    fn counts_per_type() {
        let a = Node::new("PERSON", "A").with_vector(vec![1.0]);
        let b = Node::new("PERSON", "B");
        let c = Node::new("ORGANIZATION", "C");
        let rels = vec![
            Relationship::new(a.id.clone(), b.id.clone(), "KNOWS", "knows"),
            Relationship::new(b.id.clone(), c.id.clone(), "WORKS_AT", "works at"),
            Relationship::new(a.id.clone(), NodeId::from("x"), "KNOWS", "knows"),
        ];

        let stats = GraphStats::collect(&[a, b, c], &rels);

        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.relationship_count, 3);
        assert_eq!(stats.node_types["PERSON"], 2);
        assert_eq!(stats.node_types["ORGANIZATION"], 1);
        assert_eq!(stats.relationship_types["KNOWS"], 2);
        assert_eq!(stats.nodes_with_vectors, 1);
    }

    #[test]
    fn empty_graph() {
        let stats = GraphStats::collect(&[], &[]);
        assert_eq!(stats, GraphStats::default());
    }
}
