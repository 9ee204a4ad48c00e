//! SQLite storage backend for knowgraph

use super::backend::GraphBackend;
use super::traits::{GraphStore, OpenStore, StorageError, StorageResult};
use crate::config::GraphConfig;
use crate::graph::{Node, NodeId, Relationship, RelationshipId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const NODE_COLUMNS: &str =
    "id, node_type, label, properties_json, vector_json, created_at, updated_at";

const RELATIONSHIP_COLUMNS: &str = "id, relationship_type, label, properties_json, \
     source_id, target_id, created_at, updated_at";

/// Raw column values of a `nodes` row
struct NodeRow {
    id: String,
    node_type: String,
    label: String,
    properties_json: String,
    vector_json: Option<String>,
    created_at: String,
    updated_at: String,
}

impl NodeRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            node_type: row.get(1)?,
            label: row.get(2)?,
            properties_json: row.get(3)?,
            vector_json: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_node(self) -> StorageResult<Node> {
        let vector = match self.vector_json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        Ok(Node {
            id: NodeId::from_string(self.id),
            node_type: self.node_type,
            label: self.label,
            properties: serde_json::from_str(&self.properties_json)?,
            vector,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Raw column values of a `relationships` row
struct RelationshipRow {
    id: String,
    relationship_type: String,
    label: String,
    properties_json: String,
    source_id: String,
    target_id: String,
    created_at: String,
    updated_at: String,
}

impl RelationshipRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            relationship_type: row.get(1)?,
            label: row.get(2)?,
            properties_json: row.get(3)?,
            source_id: row.get(4)?,
            target_id: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_relationship(self) -> StorageResult<Relationship> {
        Ok(Relationship {
            id: RelationshipId::from_string(self.id),
            relationship_type: self.relationship_type,
            label: self.label,
            properties: serde_json::from_str(&self.properties_json)?,
            source_node_id: NodeId::from_string(self.source_id),
            target_node_id: NodeId::from_string(self.target_id),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| StorageError::DateParse(e.to_string()))?
        .with_timezone(&Utc))
}

/// SQLite-backed graph store
///
/// One database file holds a `nodes` and a `relationships` table. Rows are
/// returned in insertion order (autoincrement `seq`); upserts keep the
/// original `seq`. Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    config: GraphConfig,
    initialized: bool,
}

impl SqliteStore {
    /// Open (or create) a database file with an explicit configuration
    pub fn open_with_config(path: impl AsRef<Path>, config: GraphConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        // Enable WAL mode for concurrent reads during writes
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(Self::from_connection(conn, config))
    }

    pub fn in_memory_with_config(config: GraphConfig) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, config))
    }

    fn from_connection(conn: Connection, config: GraphConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            config,
            initialized: false,
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Connection for a write; the schema only exists after `initialize`
    fn lock_for_write(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        self.lock()
    }

    /// Create tables and indexes. Safe to run against an existing database.
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                node_type TEXT NOT NULL,
                label TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                vector_json TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_nodes_type ON nodes(node_type);

            CREATE TABLE IF NOT EXISTS relationships (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                relationship_type TEXT NOT NULL,
                label TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Indexes for adjacency lookups
            CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_id);
            CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships(target_id);
            CREATE INDEX IF NOT EXISTS idx_relationships_type ON relationships(relationship_type);
            "#,
        )?;
        Ok(())
    }

    fn select_nodes(&self, filter: &str, params: &[&dyn ToSql]) -> StorageResult<Vec<Node>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {NODE_COLUMNS} FROM nodes {filter} ORDER BY seq");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, NodeRow::read)?;

        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(row?.into_node()?);
        }
        Ok(nodes)
    }

    fn select_relationships(
        &self,
        filter: &str,
        params: &[&dyn ToSql],
    ) -> StorageResult<Vec<Relationship>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {RELATIONSHIP_COLUMNS} FROM relationships {filter} ORDER BY seq");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, RelationshipRow::read)?;

        let mut relationships = Vec::new();
        for row in rows {
            relationships.push(row?.into_relationship()?);
        }
        Ok(relationships)
    }

    fn count(&self, table: &str) -> StorageResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_config(path, GraphConfig::default())
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::in_memory_with_config(GraphConfig::default())
    }
}

impl GraphStore for SqliteStore {
    fn initialize(&mut self) -> StorageResult<()> {
        Self::init_schema(&*self.lock()?)?;
        self.initialized = true;
        let nodes = self.count("nodes")?;
        let relationships = self.count("relationships")?;
        tracing::info!(nodes, relationships, "sqlite store initialized");
        Ok(())
    }

    fn shutdown(&mut self) -> StorageResult<()> {
        self.initialized = false;
        tracing::info!("sqlite store shut down");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn config(&self) -> &GraphConfig {
        &self.config
    }
}

impl GraphBackend for SqliteStore {
    // === Node primitives ===

    fn load_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1"),
                params![id.as_str()],
                NodeRow::read,
            )
            .optional()?;

        row.map(NodeRow::into_node).transpose()
    }

    fn save_node(&mut self, node: &Node) -> StorageResult<()> {
        let properties = serde_json::to_string(&node.properties)?;
        let vector = node
            .vector
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.lock_for_write()?;
        conn.execute(
            r#"
            INSERT INTO nodes (id, node_type, label, properties_json, vector_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                node_type = excluded.node_type,
                label = excluded.label,
                properties_json = excluded.properties_json,
                vector_json = excluded.vector_json,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
            params![
                node.id.as_str(),
                node.node_type,
                node.label,
                properties,
                vector,
                node.created_at.to_rfc3339(),
                node.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn remove_node(&mut self, id: &NodeId) -> StorageResult<bool> {
        let conn = self.lock_for_write()?;
        let rows = conn.execute("DELETE FROM nodes WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }

    fn scan_nodes(&self) -> StorageResult<Vec<Node>> {
        self.select_nodes("", &[])
    }

    // === Relationship primitives ===

    fn load_relationship(&self, id: &RelationshipId) -> StorageResult<Option<Relationship>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {RELATIONSHIP_COLUMNS} FROM relationships WHERE id = ?1"),
                params![id.as_str()],
                RelationshipRow::read,
            )
            .optional()?;

        row.map(RelationshipRow::into_relationship).transpose()
    }

    fn save_relationship(&mut self, relationship: &Relationship) -> StorageResult<()> {
        let properties = serde_json::to_string(&relationship.properties)?;

        let conn = self.lock_for_write()?;
        conn.execute(
            r#"
            INSERT INTO relationships (id, relationship_type, label, properties_json,
                                       source_id, target_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                relationship_type = excluded.relationship_type,
                label = excluded.label,
                properties_json = excluded.properties_json,
                source_id = excluded.source_id,
                target_id = excluded.target_id,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
            params![
                relationship.id.as_str(),
                relationship.relationship_type,
                relationship.label,
                properties,
                relationship.source_node_id.as_str(),
                relationship.target_node_id.as_str(),
                relationship.created_at.to_rfc3339(),
                relationship.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn remove_relationship(&mut self, id: &RelationshipId) -> StorageResult<bool> {
        let conn = self.lock_for_write()?;
        let rows = conn.execute("DELETE FROM relationships WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }

    fn scan_relationships(&self) -> StorageResult<Vec<Relationship>> {
        self.select_relationships("", &[])
    }

    fn relationships_from(&self, id: &NodeId) -> StorageResult<Vec<Relationship>> {
        self.select_relationships("WHERE source_id = ?1", &[&id.as_str()])
    }

    fn relationships_to(&self, id: &NodeId) -> StorageResult<Vec<Relationship>> {
        self.select_relationships("WHERE target_id = ?1", &[&id.as_str()])
    }

    fn purge(&mut self) -> StorageResult<()> {
        let conn = self.lock_for_write()?;
        conn.execute_batch(
            r#"
            BEGIN;
            DELETE FROM relationships;
            DELETE FROM nodes;
            COMMIT;
            "#,
        )?;
        Ok(())
    }
}
