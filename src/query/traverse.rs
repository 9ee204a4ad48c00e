//! Graph traversal operations

use super::types::{Direction, GraphPath, TraversalResult};
use crate::graph::NodeId;
use crate::storage::{GraphStore, StorageResult};
use std::collections::{HashMap, HashSet, VecDeque};

/// Default number of hops explored
pub const DEFAULT_TRAVERSAL_DEPTH: usize = 3;

/// Default cap on discovered nodes (origin included)
pub const DEFAULT_TRAVERSAL_LIMIT: usize = 100;

/// Query for traversing the graph breadth-first from a starting node
#[derive(Debug, Clone, PartialEq)]
pub struct TraverseQuery {
    /// Starting node ID
    pub origin: NodeId,
    /// Maximum depth to traverse (0 = origin only, 1 = immediate neighbors, etc.)
    pub max_depth: usize,
    /// Maximum number of nodes to discover, origin included
    pub limit: usize,
    /// Direction to traverse relationships
    pub direction: Direction,
    /// Relationship types to follow (empty = all)
    pub relationship_types: Vec<String>,
    /// Node types admitted at the far end (empty = all)
    pub node_types: Vec<String>,
}

impl TraverseQuery {
    /// Create a new traversal query from a starting node
    pub fn from(origin: NodeId) -> Self {
        Self {
            origin,
            max_depth: DEFAULT_TRAVERSAL_DEPTH,
            limit: DEFAULT_TRAVERSAL_LIMIT,
            direction: Direction::Outgoing,
            relationship_types: Vec::new(),
            node_types: Vec::new(),
        }
    }

    /// Set the maximum traversal depth
    pub fn depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Cap the number of discovered nodes
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the traversal direction
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Follow only this relationship type (may be repeated)
    pub fn with_relationship(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_types.push(relationship_type.into());
        self
    }

    /// Admit only nodes of this type (may be repeated)
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_types.push(node_type.into());
        self
    }

    /// Execute the traversal against a store
    ///
    /// Each node is discovered at most once; its path is the one taken at
    /// first discovery.
    pub fn execute<S: GraphStore + ?Sized>(&self, store: &S) -> StorageResult<TraversalResult> {
        let mut result = TraversalResult::new(self.origin.clone());

        let Some(origin_node) = store.load_node(&self.origin)? else {
            return Ok(result);
        };
        if self.limit == 0 {
            return Ok(result);
        }

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut path_index: HashMap<NodeId, usize> = HashMap::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        visited.insert(self.origin.clone());
        path_index.insert(self.origin.clone(), 0);
        result.nodes.push(origin_node.clone());
        result.paths.push(GraphPath::single(origin_node));
        queue.push_back((self.origin.clone(), 0));

        'bfs: while let Some((current, depth)) = queue.pop_front() {
            if depth >= self.max_depth || result.nodes.len() >= self.limit {
                continue;
            }
            let current_path = result.paths[path_index[&current]].clone();

            for rel in store.adjacent_relationships(&current, self.direction)? {
                if !self.relationship_matches(&rel.relationship_type) {
                    continue;
                }

                let neighbor_id = rel.other_end(&current).clone();
                if visited.contains(&neighbor_id) {
                    continue;
                }

                let Some(neighbor) = store.load_node(&neighbor_id)? else {
                    continue;
                };
                if !self.node_matches(&neighbor.node_type) {
                    continue;
                }

                visited.insert(neighbor_id.clone());
                path_index.insert(neighbor_id.clone(), result.paths.len());
                result.paths.push(current_path.extended(rel.clone(), neighbor.clone()));
                result.nodes.push(neighbor);
                result.relationships.push(rel);

                if result.nodes.len() >= self.limit {
                    break 'bfs;
                }
                queue.push_back((neighbor_id, depth + 1));
            }
        }

        Ok(result)
    }

    fn relationship_matches(&self, relationship_type: &str) -> bool {
        self.relationship_types.is_empty()
            || self.relationship_types.iter().any(|t| t == relationship_type)
    }

    fn node_matches(&self, node_type: &str) -> bool {
        self.node_types.is_empty() || self.node_types.iter().any(|t| t == node_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CreateNodeInput, CreateRelationshipInput, MemoryGraph};

    // A -> B -> C -> D
    //       \-> E (uses)
    //  D -> A closes a cycle
    fn create_test_graph() -> (MemoryGraph, Vec<NodeId>) {
        let mut graph = MemoryGraph::new();
        graph.initialize().unwrap();

        let mut ids = Vec::new();
        for (name, node_type) in [("A", "fn"), ("B", "fn"), ("C", "fn"), ("D", "fn"), ("E", "lib")] {
            let node = graph.create_node(CreateNodeInput::new(node_type, name)).unwrap();
            ids.push(node.id);
        }

        for (s, t, rel) in [(0, 1, "calls"), (1, 2, "calls"), (2, 3, "calls"), (1, 4, "uses"), (3, 0, "calls")] {
            graph
                .create_relationship(CreateRelationshipInput::new(ids[s].clone(), ids[t].clone(), rel, rel))
                .unwrap();
        }

        (graph, ids)
    }

    fn labels(result: &TraversalResult) -> Vec<&str> {
        result.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn test_traverse_depth_one() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[0].clone()).depth(1).execute(&graph).unwrap();

        assert_eq!(labels(&result), vec!["A", "B"]);
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.max_depth(), 1);
    }

    #[test]
    fn test_traverse_default_depth_terminates_on_cycle() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[0].clone()).execute(&graph).unwrap();

        assert_eq!(labels(&result), vec!["A", "B", "C", "E", "D"]);
        assert_eq!(result.paths.len(), result.nodes.len());
    }

    #[test]
    fn test_traverse_incoming() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[2].clone())
            .depth(2)
            .direction(Direction::Incoming)
            .execute(&graph)
            .unwrap();

        assert_eq!(labels(&result), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_traverse_both_directions() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[4].clone())
            .depth(1)
            .direction(Direction::Both)
            .execute(&graph)
            .unwrap();

        assert_eq!(labels(&result), vec!["E", "B"]);
    }

    #[test]
    fn test_traverse_with_relationship_filter() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[1].clone())
            .depth(1)
            .with_relationship("calls")
            .execute(&graph)
            .unwrap();

        assert_eq!(labels(&result), vec!["B", "C"]);
        assert!(result.relationships.iter().all(|r| r.relationship_type == "calls"));
    }

    #[test]
    fn test_traverse_with_node_type_filter() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[1].clone())
            .depth(1)
            .with_node_type("lib")
            .execute(&graph)
            .unwrap();

        assert_eq!(labels(&result), vec!["B", "E"]);
    }

    #[test]
    fn test_traverse_limit_counts_origin() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[0].clone()).depth(10).limit(3).execute(&graph).unwrap();

        assert_eq!(result.nodes.len(), 3);
    }

    #[test]
    fn test_path_recorded_at_first_discovery() {
        let (graph, ids) = create_test_graph();
        let result = TraverseQuery::from(ids[0].clone()).execute(&graph).unwrap();

        let path = result.path_to(&ids[3]).unwrap();
        assert_eq!(path.length, 3);
        assert_eq!(path.node_ids(), vec![&ids[0], &ids[1], &ids[2], &ids[3]]);
    }

    #[test]
    fn test_traverse_nonexistent_origin() {
        let (graph, _) = create_test_graph();
        let fake_id = NodeId::from_string("nonexistent");

        let result = TraverseQuery::from(fake_id.clone()).execute(&graph).unwrap();

        assert_eq!(result.origin, fake_id);
        assert!(result.is_empty());
    }
}
