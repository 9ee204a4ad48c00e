//! MemoryGraph: the in-process reference implementation of `GraphStore`
//!
//! Entities live in id-indexed maps owned by the store; relationships refer
//! to nodes only by id. Every entity gets a sequence number on first insert,
//! and sequence-keyed ordered maps keep scans and adjacency lists
//! deterministic while removal stays logarithmic.

use super::node::{Node, NodeId};
use super::relationship::{Relationship, RelationshipId};
use crate::config::GraphConfig;
use crate::storage::{GraphBackend, GraphStore, StorageError, StorageResult};
use std::collections::{BTreeMap, HashMap};

/// A stored value plus its insertion sequence number
#[derive(Debug)]
struct Slot<T> {
    seq: u64,
    value: T,
}

type Adjacency = HashMap<NodeId, BTreeMap<u64, RelationshipId>>;

#[derive(Debug, Default)]
pub struct MemoryGraph {
    config: GraphConfig,
    initialized: bool,
    next_seq: u64,
    nodes: HashMap<NodeId, Slot<Node>>,
    node_order: BTreeMap<u64, NodeId>,
    relationships: HashMap<RelationshipId, Slot<Relationship>>,
    relationship_order: BTreeMap<u64, RelationshipId>,
    /// node -> relationships with that node as source
    outgoing: Adjacency,
    /// node -> relationships with that node as target
    incoming: Adjacency,
}

impl MemoryGraph {
    /// Create an empty, uninitialized graph with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    fn writable(&self) -> StorageResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn attach(&mut self, seq: u64, rel: &Relationship) {
        self.outgoing
            .entry(rel.source_node_id.clone())
            .or_default()
            .insert(seq, rel.id.clone());
        self.incoming
            .entry(rel.target_node_id.clone())
            .or_default()
            .insert(seq, rel.id.clone());
    }

    fn detach(&mut self, seq: u64, rel: &Relationship) {
        for (index, node_id) in [
            (&mut self.outgoing, &rel.source_node_id),
            (&mut self.incoming, &rel.target_node_id),
        ] {
            if let Some(ids) = index.get_mut(node_id) {
                ids.remove(&seq);
                if ids.is_empty() {
                    index.remove(node_id);
                }
            }
        }
    }

    fn collect_relationships(&self, ids: Option<&BTreeMap<u64, RelationshipId>>) -> Vec<Relationship> {
        ids.map(|ids| {
            ids.values()
                .filter_map(|id| self.relationships.get(id).map(|slot| slot.value.clone()))
                .collect()
        })
        .unwrap_or_default()
    }
}

impl GraphStore for MemoryGraph {
    fn initialize(&mut self) -> StorageResult<()> {
        self.initialized = true;
        tracing::info!(
            nodes = self.nodes.len(),
            relationships = self.relationships.len(),
            "memory graph initialized"
        );
        Ok(())
    }

    fn shutdown(&mut self) -> StorageResult<()> {
        self.initialized = false;
        tracing::info!("memory graph shut down");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn config(&self) -> &GraphConfig {
        &self.config
    }
}

impl GraphBackend for MemoryGraph {
    fn load_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        Ok(self.nodes.get(id).map(|slot| slot.value.clone()))
    }

    fn save_node(&mut self, node: &Node) -> StorageResult<()> {
        self.writable()?;
        if let Some(slot) = self.nodes.get_mut(&node.id) {
            slot.value = node.clone();
            return Ok(());
        }
        let seq = self.next_seq();
        self.node_order.insert(seq, node.id.clone());
        self.nodes.insert(
            node.id.clone(),
            Slot {
                seq,
                value: node.clone(),
            },
        );
        Ok(())
    }

    fn remove_node(&mut self, id: &NodeId) -> StorageResult<bool> {
        self.writable()?;
        let Some(slot) = self.nodes.remove(id) else {
            return Ok(false);
        };
        self.node_order.remove(&slot.seq);
        Ok(true)
    }

    fn scan_nodes(&self) -> StorageResult<Vec<Node>> {
        Ok(self
            .node_order
            .values()
            .filter_map(|id| self.nodes.get(id).map(|slot| slot.value.clone()))
            .collect())
    }

    fn load_relationship(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>> {
        Ok(self.relationships.get(id).map(|slot| slot.value.clone()))
    }

    fn save_relationship(&mut self, relationship: &Relationship) -> StorageResult<()> {
        self.writable()?;
        let existing = self
            .relationships
            .get(&relationship.id)
            .map(|slot| (slot.seq, slot.value.clone()));

        let seq = match existing {
            Some((seq, previous)) => {
                let moved = previous.source_node_id != relationship.source_node_id
                    || previous.target_node_id != relationship.target_node_id;
                if moved {
                    self.detach(seq, &previous);
                    self.attach(seq, relationship);
                }
                seq
            }
            None => {
                let seq = self.next_seq();
                self.relationship_order.insert(seq, relationship.id.clone());
                self.attach(seq, relationship);
                seq
            }
        };
        self.relationships.insert(
            relationship.id.clone(),
            Slot {
                seq,
                value: relationship.clone(),
            },
        );
        Ok(())
    }

    fn remove_relationship(&mut self, id: &RelationshipId) -> StorageResult<bool> {
        self.writable()?;
        let Some(slot) = self.relationships.remove(id) else {
            return Ok(false);
        };
        self.detach(slot.seq, &slot.value);
        self.relationship_order.remove(&slot.seq);
        Ok(true)
    }

    fn scan_relationships(&self) -> StorageResult<Vec<Relationship>> {
        Ok(self
            .relationship_order
            .values()
            .filter_map(|id| self.relationships.get(id).map(|slot| slot.value.clone()))
            .collect())
    }

    fn relationships_from(&self, id: &NodeId) -> StorageResult<Vec<Relationship>> {
        Ok(self.collect_relationships(self.outgoing.get(id)))
    }

    fn relationships_to(&self, id: &NodeId) -> StorageResult<Vec<Relationship>> {
        Ok(self.collect_relationships(self.incoming.get(id)))
    }

    fn purge(&mut self) -> StorageResult<()> {
        self.writable()?;
        self.nodes.clear();
        self.node_order.clear();
        self.relationships.clear();
        self.relationship_order.clear();
        self.outgoing.clear();
        self.incoming.clear();
        Ok(())
    }
}
