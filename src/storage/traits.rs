//! Storage trait definitions
//!
//! `GraphStore` is the contract every backend honors. Backends implement the
//! crate-private `GraphBackend` primitives; every contract operation is
//! provided on top of them so initialization gating, referential integrity,
//! cascade deletion and the graph algorithms behave identically across
//! backends.

use super::backend::GraphBackend;
use crate::config::GraphConfig;
use crate::graph::{
    CreateNodeInput, CreateRelationshipInput, Node, NodeId, Relationship, RelationshipId,
    UpdateNodeInput, UpdateRelationshipInput,
};
use crate::query::{
    Direction, FindQuery, GraphPath, GraphStats, PathQuery, SimilarityMatch, TraversalResult,
    TraverseQuery, VectorQuery,
};
use crate::snapshot::{self, ExportFormat, ExportReport, GraphSnapshot, ImportReport, MergeStrategy};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store not initialized")]
    NotInitialized,

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    /// Unknown node or relationship id
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NodeNotFound(_) | StorageError::RelationshipNotFound(_)
        )
    }

    /// File read/write or snapshot decoding failure
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            StorageError::Io(_)
                | StorageError::Serialization(_)
                | StorageError::Parse(_)
                | StorageError::DateParse(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

fn type_allowed(types: &[&str], candidate: &str) -> bool {
    types.is_empty() || types.contains(&candidate)
}

/// Trait for graph storage backends
///
/// Mutating operations take `&mut self`: a store has a single writer and the
/// borrow checker enforces it. All methods may block. Only this crate's
/// backends can implement it.
#[allow(private_bounds)]
pub trait GraphStore: GraphBackend + Send + Sync {
    // === Lifecycle ===

    fn initialize(&mut self) -> StorageResult<()>;

    fn shutdown(&mut self) -> StorageResult<()>;

    fn is_initialized(&self) -> bool;

    fn config(&self) -> &GraphConfig;

    // === Contract operations ===

    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    fn create_node(&mut self, input: CreateNodeInput) -> StorageResult<Node> {
        self.ensure_initialized()?;
        if let Some(ref vector) = input.vector {
            self.config().check_vector(vector)?;
        }
        let node = input.into_node();
        self.save_node(&node)?;
        tracing::debug!(id = %node.id, node_type = %node.node_type, "created node");
        Ok(node)
    }

    /// Best-effort batch: invalid items are skipped with a warning and
    /// items created before a failure stay committed.
    fn create_nodes(&mut self, inputs: Vec<CreateNodeInput>) -> StorageResult<Vec<Node>> {
        self.ensure_initialized()?;
        let mut created = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            match self.create_node(input) {
                Ok(node) => created.push(node),
                Err(e) => tracing::warn!(index, error = %e, "skipping node in batch"),
            }
        }
        Ok(created)
    }

    fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        self.ensure_initialized()?;
        self.load_node(id)
    }

    fn update_node(&mut self, id: &NodeId, patch: UpdateNodeInput) -> StorageResult<Node> {
        self.ensure_initialized()?;
        if let Some(ref vector) = patch.vector {
            self.config().check_vector(vector)?;
        }
        let mut node = self
            .load_node(id)?
            .ok_or_else(|| StorageError::NodeNotFound(id.clone()))?;
        node.apply(patch);
        self.save_node(&node)?;
        tracing::debug!(id = %node.id, "updated node");
        Ok(node)
    }

    /// Delete a node and every relationship where it is source or target
    fn delete_node(&mut self, id: &NodeId) -> StorageResult<bool> {
        self.ensure_initialized()?;
        if self.load_node(id)?.is_none() {
            return Ok(false);
        }

        let attached = self.adjacent_relationships(id, Direction::Both)?;
        for rel in &attached {
            self.remove_relationship(&rel.id)?;
        }
        let removed = self.remove_node(id)?;
        tracing::debug!(id = %id, cascaded = attached.len(), "deleted node");
        Ok(removed)
    }

    fn query_nodes(&self, query: &FindQuery) -> StorageResult<Vec<Node>> {
        self.ensure_initialized()?;
        Ok(query.execute(self.scan_nodes()?))
    }

    /// Fails with `NodeNotFound` if either endpoint is missing; nothing is
    /// written in that case.
    fn create_relationship(&mut self, input: CreateRelationshipInput) -> StorageResult<Relationship> {
        self.ensure_initialized()?;
        for endpoint in [&input.source_node_id, &input.target_node_id] {
            if self.load_node(endpoint)?.is_none() {
                return Err(StorageError::NodeNotFound(endpoint.clone()));
            }
        }
        let rel = input.into_relationship();
        self.save_relationship(&rel)?;
        tracing::debug!(
            id = %rel.id,
            relationship_type = %rel.relationship_type,
            source = %rel.source_node_id,
            target = %rel.target_node_id,
            "created relationship"
        );
        Ok(rel)
    }

    /// Best-effort batch: items with a missing endpoint are skipped with a warning
    fn create_relationships(
        &mut self,
        inputs: Vec<CreateRelationshipInput>,
    ) -> StorageResult<Vec<Relationship>> {
        self.ensure_initialized()?;
        let mut created = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            match self.create_relationship(input) {
                Ok(rel) => created.push(rel),
                Err(e) => tracing::warn!(index, error = %e, "skipping relationship in batch"),
            }
        }
        Ok(created)
    }

    fn get_relationship(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>> {
        self.ensure_initialized()?;
        self.load_relationship(id)
    }

    fn update_relationship(
        &mut self,
        id: &RelationshipId,
        patch: UpdateRelationshipInput,
    ) -> StorageResult<Relationship> {
        self.ensure_initialized()?;
        let mut rel = self
            .load_relationship(id)?
            .ok_or_else(|| StorageError::RelationshipNotFound(id.clone()))?;
        rel.apply(patch);
        self.save_relationship(&rel)?;
        tracing::debug!(id = %rel.id, "updated relationship");
        Ok(rel)
    }

    fn delete_relationship(&mut self, id: &RelationshipId) -> StorageResult<bool> {
        self.ensure_initialized()?;
        self.remove_relationship(id)
    }

    fn query_relationships(&self, query: &FindQuery) -> StorageResult<Vec<Relationship>> {
        self.ensure_initialized()?;
        Ok(query.execute(self.scan_relationships()?))
    }

    /// Outgoing relationships, optionally restricted to `types` (empty = all)
    fn get_outgoing_relationships(
        &self,
        id: &NodeId,
        types: &[&str],
    ) -> StorageResult<Vec<Relationship>> {
        self.ensure_initialized()?;
        let rels = self.relationships_from(id)?;
        Ok(rels
            .into_iter()
            .filter(|r| type_allowed(types, &r.relationship_type))
            .collect())
    }

    fn get_incoming_relationships(
        &self,
        id: &NodeId,
        types: &[&str],
    ) -> StorageResult<Vec<Relationship>> {
        self.ensure_initialized()?;
        let rels = self.relationships_to(id)?;
        Ok(rels
            .into_iter()
            .filter(|r| type_allowed(types, &r.relationship_type))
            .collect())
    }

    fn get_all_relationships(
        &self,
        id: &NodeId,
        types: &[&str],
    ) -> StorageResult<Vec<Relationship>> {
        self.ensure_initialized()?;
        let rels = self.adjacent_relationships(id, Direction::Both)?;
        Ok(rels
            .into_iter()
            .filter(|r| type_allowed(types, &r.relationship_type))
            .collect())
    }

    /// Distinct neighbours of `id`, in relationship order
    fn get_related_nodes(
        &self,
        id: &NodeId,
        direction: Direction,
        relationship_types: &[&str],
        node_types: &[&str],
    ) -> StorageResult<Vec<Node>> {
        self.ensure_initialized()?;
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut related = Vec::new();

        for rel in self.adjacent_relationships(id, direction)? {
            if !type_allowed(relationship_types, &rel.relationship_type) {
                continue;
            }
            let neighbor_id = rel.other_end(id);
            if !seen.insert(neighbor_id.clone()) {
                continue;
            }
            if let Some(neighbor) = self.load_node(neighbor_id)? {
                if type_allowed(node_types, &neighbor.node_type) {
                    related.push(neighbor);
                }
            }
        }

        Ok(related)
    }

    fn vector_search(&self, query: &VectorQuery) -> StorageResult<Vec<SimilarityMatch>> {
        self.ensure_initialized()?;
        query.execute(self)
    }

    fn traverse_graph(&self, query: &TraverseQuery) -> StorageResult<TraversalResult> {
        self.ensure_initialized()?;
        query.execute(self)
    }

    fn find_shortest_path(&self, query: &PathQuery) -> StorageResult<Option<GraphPath>> {
        self.ensure_initialized()?;
        query.shortest(self)
    }

    fn find_all_paths(&self, query: &PathQuery) -> StorageResult<Vec<GraphPath>> {
        self.ensure_initialized()?;
        query.all(self)
    }

    fn get_graph_stats(&self) -> StorageResult<GraphStats> {
        self.ensure_initialized()?;
        Ok(GraphStats::collect(
            &self.scan_nodes()?,
            &self.scan_relationships()?,
        ))
    }

    /// Remove everything. `confirm` must be `true`.
    fn clear_graph(&mut self, confirm: bool) -> StorageResult<()> {
        self.ensure_initialized()?;
        if !confirm {
            return Err(StorageError::InvalidArgument(
                "clear_graph requires explicit confirmation".to_string(),
            ));
        }
        self.purge()?;
        tracing::info!("graph cleared");
        Ok(())
    }

    /// Materialize the whole graph
    fn snapshot(&self) -> StorageResult<GraphSnapshot> {
        self.ensure_initialized()?;
        Ok(GraphSnapshot {
            nodes: self.scan_nodes()?,
            relationships: self.scan_relationships()?,
        })
    }

    /// Write a snapshot to `path`. For CSV `path` is a directory that
    /// receives `nodes.csv` and `relationships.csv`.
    fn export_graph(&self, format: ExportFormat, path: &Path) -> StorageResult<ExportReport> {
        let snapshot = self.snapshot()?;
        snapshot::write_snapshot(&snapshot, format, path)?;
        let report = ExportReport {
            format,
            nodes: snapshot.nodes.len(),
            relationships: snapshot.relationships.len(),
        };
        tracing::info!(
            format = %format,
            nodes = report.nodes,
            relationships = report.relationships,
            path = %path.display(),
            "exported graph"
        );
        Ok(report)
    }

    fn import_graph(
        &mut self,
        format: ExportFormat,
        path: &Path,
        strategy: MergeStrategy,
    ) -> StorageResult<ImportReport> {
        self.ensure_initialized()?;
        let snapshot = snapshot::read_snapshot(format, path)?;
        self.import_snapshot(snapshot, strategy)
    }

    fn import_snapshot(
        &mut self,
        snapshot: GraphSnapshot,
        strategy: MergeStrategy,
    ) -> StorageResult<ImportReport> {
        self.ensure_initialized()?;
        let report = snapshot::apply_snapshot(self, snapshot, strategy)?;
        tracing::info!(
            strategy = %strategy,
            nodes_created = report.nodes_created,
            nodes_updated = report.nodes_updated,
            nodes_skipped = report.nodes_skipped,
            relationships_created = report.relationships_created,
            relationships_updated = report.relationships_updated,
            relationships_skipped = report.relationships_skipped,
            "imported graph"
        );
        Ok(report)
    }
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
