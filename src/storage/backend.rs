//! Storage primitives behind `GraphStore`
//!
//! Backends implement these; the public contract is built on top of them.
//! Primitives do no validation and are not reachable from outside the crate.

use super::StorageResult;
use crate::graph::{Node, NodeId, Relationship, RelationshipId};
use crate::query::Direction;
use std::collections::HashSet;

/// Raw entity access. Entities come back in insertion order.
pub(crate) trait GraphBackend {
    fn load_node(&self, id: &NodeId) -> StorageResult<Option<Node>>;

    /// Insert or overwrite a node, keeping its original insertion position
    fn save_node(&mut self, node: &Node) -> StorageResult<()>;

    /// Remove a node without touching its relationships
    fn remove_node(&mut self, id: &NodeId) -> StorageResult<bool>;

    fn scan_nodes(&self) -> StorageResult<Vec<Node>>;

    fn load_relationship(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>>;

    fn save_relationship(&mut self, relationship: &Relationship) -> StorageResult<()>;

    fn remove_relationship(&mut self, id: &RelationshipId) -> StorageResult<bool>;

    fn scan_relationships(&self) -> StorageResult<Vec<Relationship>>;

    /// Relationships whose source is `id`
    fn relationships_from(&self, id: &NodeId) -> StorageResult<Vec<Relationship>>;

    /// Relationships whose target is `id`
    fn relationships_to(&self, id: &NodeId) -> StorageResult<Vec<Relationship>>;

    /// Drop every node and relationship
    fn purge(&mut self) -> StorageResult<()>;

    /// Relationships adjacent to `id` in the given direction.
    /// `Both` lists outgoing before incoming; self-loops appear once.
    fn adjacent_relationships(
        &self,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<Relationship>> {
        match direction {
            Direction::Outgoing => self.relationships_from(id),
            Direction::Incoming => self.relationships_to(id),
            Direction::Both => {
                let mut rels = self.relationships_from(id)?;
                let seen: HashSet<RelationshipId> = rels.iter().map(|r| r.id.clone()).collect();
                rels.extend(
                    self.relationships_to(id)?
                        .into_iter()
                        .filter(|r| !seen.contains(&r.id)),
                );
                Ok(rels)
            }
        }
    }
}
