//! Whole-graph snapshots: export, import and merge strategies
//!
//! A snapshot is every node and relationship of a store. Serializers turn
//! it into files; `apply_snapshot` loads one back into a store.

mod csv;
mod graphml;
mod json;

pub use self::csv::{read_csv_dir, write_csv_dir, NODES_FILE, RELATIONSHIPS_FILE};
pub use self::graphml::to_graphml;
pub use self::json::{read_json, write_json};

use crate::graph::{Node, Relationship, UpdateNodeInput, UpdateRelationshipInput};
use chrono::{DateTime, Utc};
use crate::storage::{GraphStore, StorageError, StorageResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Serialization format of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    #[value(name = "graphml")]
    GraphMl,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::GraphMl => "graphml",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "graphml" => Ok(ExportFormat::GraphMl),
            other => Err(StorageError::InvalidArgument(format!(
                "unknown export format: {other}"
            ))),
        }
    }
}

/// How imported entities interact with ones already in the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStrategy {
    /// Clear the store, then load
    Replace,
    /// Patch entities whose id exists, insert the rest
    #[default]
    Merge,
    /// Leave entities whose id exists untouched
    SkipDuplicates,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeStrategy::Replace => "replace",
            MergeStrategy::Merge => "merge",
            MergeStrategy::SkipDuplicates => "skip-duplicates",
        };
        f.write_str(name)
    }
}

impl FromStr for MergeStrategy {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "replace" => Ok(MergeStrategy::Replace),
            "merge" => Ok(MergeStrategy::Merge),
            "skip-duplicates" => Ok(MergeStrategy::SkipDuplicates),
            other => Err(StorageError::InvalidArgument(format!(
                "unknown merge strategy: {other}"
            ))),
        }
    }
}

/// Every node and relationship of a graph, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl GraphSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub format: ExportFormat,
    pub nodes: usize,
    pub relationships: usize,
}

/// Outcome of an import, per entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub nodes_skipped: usize,
    pub relationships_created: usize,
    pub relationships_updated: usize,
    pub relationships_skipped: usize,
}

/// Serialize `snapshot` to `path`. CSV writes a directory.
pub fn write_snapshot(snapshot: &GraphSnapshot, format: ExportFormat, path: &Path) -> StorageResult<()> {
    match format {
        ExportFormat::Json => write_json(snapshot, path),
        ExportFormat::Csv => write_csv_dir(snapshot, path),
        ExportFormat::GraphMl => {
            ensure_parent_dir(path)?;
            std::fs::write(path, to_graphml(snapshot)?)?;
            Ok(())
        }
    }
}

pub fn read_snapshot(format: ExportFormat, path: &Path) -> StorageResult<GraphSnapshot> {
    match format {
        ExportFormat::Json => read_json(path),
        ExportFormat::Csv => read_csv_dir(path),
        ExportFormat::GraphMl => Err(StorageError::InvalidArgument(
            "GraphML import is not supported".to_string(),
        )),
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Raise `updated_at` to `created_at` when a snapshot row has them reversed.
/// Returns whether anything changed.
fn clamp_updated_at(created_at: DateTime<Utc>, updated_at: &mut DateTime<Utc>) -> bool {
    if *updated_at < created_at {
        *updated_at = created_at;
        true
    } else {
        false
    }
}

/// Load a snapshot into `store`.
///
/// Inserted entities keep their snapshot ids and timestamps. Every node is
/// written before any relationship is checked, so a relationship may refer
/// to a node that appears later in the snapshot. Relationships whose
/// endpoints are still missing are skipped with a warning, as are nodes whose
/// vector does not fit the store's configured dimension. An `updatedAt`
/// earlier than `createdAt` is raised to `createdAt`.
pub fn apply_snapshot<S: GraphStore + ?Sized>(
    store: &mut S,
    snapshot: GraphSnapshot,
    strategy: MergeStrategy,
) -> StorageResult<ImportReport> {
    store.ensure_initialized()?;
    let mut report = ImportReport::default();

    if strategy == MergeStrategy::Replace {
        store.purge()?;
    }

    for mut node in snapshot.nodes {
        if clamp_updated_at(node.created_at, &mut node.updated_at) {
            tracing::warn!(id = %node.id, "imported node updated before it was created");
        }
        if let Some(ref vector) = node.vector {
            if let Err(e) = store.config().check_vector(vector) {
                tracing::warn!(id = %node.id, error = %e, "skipping imported node");
                report.nodes_skipped += 1;
                continue;
            }
        }

        match store.load_node(&node.id)? {
            None => {
                store.save_node(&node)?;
                report.nodes_created += 1;
            }
            Some(_) if strategy == MergeStrategy::SkipDuplicates => {
                report.nodes_skipped += 1;
            }
            Some(mut existing) => {
                let mut patch = UpdateNodeInput::new()
                    .label(node.label)
                    .properties(node.properties);
                patch.vector = node.vector;
                existing.apply(patch);
                store.save_node(&existing)?;
                report.nodes_updated += 1;
            }
        }
    }

    for mut rel in snapshot.relationships {
        if clamp_updated_at(rel.created_at, &mut rel.updated_at) {
            tracing::warn!(id = %rel.id, "imported relationship updated before it was created");
        }
        let mut missing = None;
        for endpoint in [&rel.source_node_id, &rel.target_node_id] {
            if store.load_node(endpoint)?.is_none() {
                missing = Some(endpoint.clone());
                break;
            }
        }
        if let Some(endpoint) = missing {
            tracing::warn!(id = %rel.id, missing = %endpoint, "skipping dangling relationship");
            report.relationships_skipped += 1;
            continue;
        }

        match store.load_relationship(&rel.id)? {
            None => {
                store.save_relationship(&rel)?;
                report.relationships_created += 1;
            }
            Some(_) if strategy == MergeStrategy::SkipDuplicates => {
                report.relationships_skipped += 1;
            }
            Some(mut existing) => {
                existing.apply(
                    UpdateRelationshipInput::new()
                        .label(rel.label)
                        .properties(rel.properties),
                );
                store.save_relationship(&existing)?;
                report.relationships_updated += 1;
            }
        }
    }

    Ok(report)
}
