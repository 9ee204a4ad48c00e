//! Path finding algorithms

use super::types::{Direction, GraphPath};
use crate::graph::{Node, NodeId, Relationship};
use crate::storage::{GraphStore, StorageResult};
use std::collections::{HashMap, HashSet, VecDeque};

/// Default hop bound for `shortest`
pub const DEFAULT_SHORTEST_PATH_DEPTH: usize = 5;

/// Default hop bound for `all`
pub const DEFAULT_ALL_PATHS_DEPTH: usize = 3;

/// Query for finding paths between nodes
#[derive(Debug, Clone, PartialEq)]
pub struct PathQuery {
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
    /// Maximum path length; `None` uses the per-algorithm default
    pub max_depth: Option<usize>,
    /// Direction to traverse relationships
    pub direction: Direction,
    /// Relationship types to follow (empty = all)
    pub relationship_types: Vec<String>,
    /// Stop `all` after this many paths
    pub max_paths: Option<usize>,
}

impl PathQuery {
    /// Create a new path query between two nodes
    pub fn between(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            max_depth: None,
            direction: Direction::Outgoing,
            relationship_types: Vec::new(),
            max_paths: None,
        }
    }

    /// Set maximum path length
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set traversal direction
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Follow only this relationship type (may be repeated)
    pub fn with_relationship(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_types.push(relationship_type.into());
        self
    }

    /// Cap the number of paths returned by `all`
    pub fn max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = Some(max_paths);
        self
    }

    /// Unweighted BFS for the shortest path.
    ///
    /// Ties are broken by relationship insertion order. Returns `None` when
    /// either endpoint is unknown or no path exists within the depth bound.
    pub fn shortest<S: GraphStore + ?Sized>(&self, store: &S) -> StorageResult<Option<GraphPath>> {
        let max_depth = self.max_depth.unwrap_or(DEFAULT_SHORTEST_PATH_DEPTH);

        let Some(source_node) = store.load_node(&self.source)? else {
            return Ok(None);
        };
        if self.source == self.target {
            return Ok(Some(GraphPath::single(source_node)));
        }
        if store.load_node(&self.target)?.is_none() {
            return Ok(None);
        }

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
        let mut predecessors: HashMap<NodeId, (NodeId, Relationship, Node)> = HashMap::new();

        visited.insert(self.source.clone());
        queue.push_back((self.source.clone(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

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

                visited.insert(neighbor_id.clone());
                predecessors.insert(neighbor_id.clone(), (current.clone(), rel, neighbor));

                if neighbor_id == self.target {
                    return Ok(Some(self.reconstruct_path(source_node, &predecessors)));
                }
                queue.push_back((neighbor_id, depth + 1));
            }
        }

        Ok(None)
    }

    /// Depth-first enumeration of every simple path within the depth bound,
    /// sorted ascending by length. `max_paths` keeps the shortest paths, so
    /// the whole bounded space is enumerated before truncating.
    ///
    /// The on-path check is per path, so one node may appear in several
    /// returned paths.
    pub fn all<S: GraphStore + ?Sized>(&self, store: &S) -> StorageResult<Vec<GraphPath>> {
        let max_depth = self.max_depth.unwrap_or(DEFAULT_ALL_PATHS_DEPTH);

        let Some(source_node) = store.load_node(&self.source)? else {
            return Ok(Vec::new());
        };
        if self.source == self.target {
            return Ok(vec![GraphPath::single(source_node)]);
        }
        if store.load_node(&self.target)?.is_none() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<GraphPath> = Vec::new();
        let mut stack: Vec<GraphPath> = vec![GraphPath::single(source_node)];

        while let Some(path) = stack.pop() {
            let Some(current) = path.end().map(|n| n.id.clone()) else {
                continue;
            };

            if current == self.target {
                paths.push(path);
                continue;
            }
            if path.length >= max_depth {
                continue;
            }

            let mut branches = Vec::new();
            for rel in store.adjacent_relationships(&current, self.direction)? {
                if !self.relationship_matches(&rel.relationship_type) {
                    continue;
                }
                let neighbor_id = rel.other_end(&current).clone();
                if path.nodes.iter().any(|n| n.id == neighbor_id) {
                    continue;
                }
                if let Some(neighbor) = store.load_node(&neighbor_id)? {
                    branches.push(path.extended(rel, neighbor));
                }
            }
            // Reverse so the first relationship is explored first
            stack.extend(branches.into_iter().rev());
        }

        paths.sort_by_key(|p| p.length);
        if let Some(max) = self.max_paths {
            paths.truncate(max);
        }
        Ok(paths)
    }

    fn relationship_matches(&self, relationship_type: &str) -> bool {
        self.relationship_types.is_empty()
            || self.relationship_types.iter().any(|t| t == relationship_type)
    }

    /// Walk predecessors back from the target
    fn reconstruct_path(
        &self,
        source_node: Node,
        predecessors: &HashMap<NodeId, (NodeId, Relationship, Node)>,
    ) -> GraphPath {
        let mut path_nodes: Vec<Node> = Vec::new();
        let mut path_rels: Vec<Relationship> = Vec::new();

        let mut current = self.target.clone();
        while let Some((pred, rel, node)) = predecessors.get(&current) {
            path_nodes.push(node.clone());
            path_rels.push(rel.clone());
            current = pred.clone();
        }
        path_nodes.push(source_node);

        path_nodes.reverse();
        path_rels.reverse();

        GraphPath::new(path_nodes, path_rels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CreateNodeInput, CreateRelationshipInput, MemoryGraph};

    // A -> B -> C -> D
    //       \-> E -> F (uses)
    // A -> C shortcut (calls)
    fn create_test_graph() -> (MemoryGraph, Vec<NodeId>) {
        let mut graph = MemoryGraph::new();
        graph.initialize().unwrap();

        let mut ids = Vec::new();
        for name in ["A", "B", "C", "D", "E", "F"] {
            ids.push(graph.create_node(CreateNodeInput::new("node", name)).unwrap().id);
        }

        for (s, t, rel) in [(0, 1, "calls"), (1, 2, "calls"), (2, 3, "calls"), (1, 4, "uses"), (4, 5, "uses"), (0, 2, "calls")] {
            graph
                .create_relationship(CreateRelationshipInput::new(ids[s].clone(), ids[t].clone(), rel, rel))
                .unwrap();
        }

        (graph, ids)
    }

    #[test]
    fn test_path_same_node() {
        let (graph, ids) = create_test_graph();
        let result = PathQuery::between(ids[0].clone(), ids[0].clone())
            .shortest(&graph)
            .unwrap()
            .unwrap();

        assert_eq!(result.length, 0);
        assert_eq!(result.nodes.len(), 1);
    }

    #[test]
    fn test_path_direct_neighbor() {
        let (graph, ids) = create_test_graph();
        let result = PathQuery::between(ids[0].clone(), ids[1].clone())
            .shortest(&graph)
            .unwrap()
            .unwrap();

        assert_eq!(result.length, 1);
        assert_eq!(result.nodes.len(), 2);
    }

    #[test]
    fn test_shortest_uses_shortcut() {
        let (graph, ids) = create_test_graph();
        let result = PathQuery::between(ids[0].clone(), ids[3].clone())
            .shortest(&graph)
            .unwrap()
            .unwrap();

        assert_eq!(result.length, 2);
        assert_eq!(result.node_ids(), vec![&ids[0], &ids[2], &ids[3]]);
    }

    #[test]
    fn test_path_not_found_against_direction() {
        let (graph, ids) = create_test_graph();
        let result = PathQuery::between(ids[3].clone(), ids[0].clone())
            .shortest(&graph)
            .unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_path_with_max_depth() {
        let (graph, ids) = create_test_graph();
        // A to F requires 3 hops
        let result = PathQuery::between(ids[0].clone(), ids[5].clone())
            .max_depth(2)
            .shortest(&graph)
            .unwrap();
        assert!(result.is_none());

        let result = PathQuery::between(ids[0].clone(), ids[5].clone())
            .max_depth(3)
            .shortest(&graph)
            .unwrap();
        assert_eq!(result.unwrap().length, 3);
    }

    #[test]
    fn test_path_with_relationship_filter() {
        let (graph, ids) = create_test_graph();
        // B -> E is "uses", not "calls"
        let result = PathQuery::between(ids[0].clone(), ids[4].clone())
            .with_relationship("calls")
            .shortest(&graph)
            .unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_path_bidirectional() {
        let (graph, ids) = create_test_graph();
        let result = PathQuery::between(ids[3].clone(), ids[0].clone())
            .direction(Direction::Both)
            .shortest(&graph)
            .unwrap()
            .unwrap();

        assert_eq!(result.length, 2); // D - C - A
    }

    #[test]
    fn test_path_nonexistent_source() {
        let (graph, ids) = create_test_graph();
        let fake_id = NodeId::from_string("nonexistent");

        let result = PathQuery::between(fake_id, ids[0].clone()).shortest(&graph).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_all_paths_sorted_by_length() {
        let (graph, ids) = create_test_graph();
        let paths = PathQuery::between(ids[0].clone(), ids[3].clone())
            .all(&graph)
            .unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].node_ids(), vec![&ids[0], &ids[2], &ids[3]]);
        assert_eq!(paths[1].node_ids(), vec![&ids[0], &ids[1], &ids[2], &ids[3]]);
    }

    #[test]
    fn test_all_paths_respects_depth() {
        let (graph, ids) = create_test_graph();
        let paths = PathQuery::between(ids[0].clone(), ids[3].clone())
            .max_depth(2)
            .all(&graph)
            .unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].length, 2);
    }

    #[test]
    fn test_all_paths_share_nodes() {
        let (graph, ids) = create_test_graph();
        let paths = PathQuery::between(ids[0].clone(), ids[3].clone())
            .all(&graph)
            .unwrap();

        // C appears in both paths
        assert!(paths.iter().all(|p| p.node_ids().contains(&&ids[2])));
    }

    #[test]
    fn test_all_paths_same_node() {
        let (graph, ids) = create_test_graph();
        let paths = PathQuery::between(ids[1].clone(), ids[1].clone()).all(&graph).unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].length, 0);
    }

    #[test]
    fn test_all_paths_max_paths() {
        let (graph, ids) = create_test_graph();
        let paths = PathQuery::between(ids[0].clone(), ids[3].clone())
            .max_paths(1)
            .all(&graph)
            .unwrap();

        // The longer A-B-C-D is discovered first; the cap still keeps A-C-D
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].length, 2);
    }

    #[test]
    fn test_all_paths_are_simple_with_cycles() {
        let (mut graph, ids) = create_test_graph();
        graph
            .create_relationship(CreateRelationshipInput::new(ids[2].clone(), ids[0].clone(), "calls", "back"))
            .unwrap();

        let paths = PathQuery::between(ids[0].clone(), ids[3].clone())
            .max_depth(6)
            .direction(Direction::Both)
            .all(&graph)
            .unwrap();

        for path in &paths {
            let unique: HashSet<_> = path.node_ids().into_iter().collect();
            assert_eq!(unique.len(), path.nodes.len());
        }
    }
}
