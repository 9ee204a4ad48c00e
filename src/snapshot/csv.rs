//! CSV snapshot format
//!
//! A snapshot is a directory with two tables, `nodes.csv` and
//! `relationships.csv`, each starting with a header row. `properties` and
//! `vector` columns hold JSON. Fields are quoted when they contain a comma,
//! a quote or a line break; `properties` is always quoted.

use super::GraphSnapshot;
use crate::graph::{Node, NodeId, Properties, Relationship, RelationshipId};
use crate::storage::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;

pub const NODES_FILE: &str = "nodes.csv";
pub const RELATIONSHIPS_FILE: &str = "relationships.csv";

const NODE_HEADER: [&str; 7] = [
    "id",
    "type",
    "label",
    "properties",
    "vector",
    "createdAt",
    "updatedAt",
];

const RELATIONSHIP_HEADER: [&str; 8] = [
    "id",
    "type",
    "label",
    "sourceNodeId",
    "targetNodeId",
    "properties",
    "createdAt",
    "updatedAt",
];

// === Writing ===

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quote(field)
    } else {
        field.to_string()
    }
}

fn push_record(out: &mut String, fields: &[String]) {
    out.push_str(&fields.join(","));
    out.push('\n');
}

pub(crate) fn nodes_to_csv(nodes: &[Node]) -> StorageResult<String> {
    let mut out = String::new();
    push_record(&mut out, &NODE_HEADER.map(String::from));
    for node in nodes {
        let vector = match node.vector {
            Some(ref v) => escape(&serde_json::to_string(v)?),
            None => String::new(),
        };
        push_record(
            &mut out,
            &[
                escape(node.id.as_str()),
                escape(&node.node_type),
                escape(&node.label),
                quote(&serde_json::to_string(&node.properties)?),
                vector,
                node.created_at.to_rfc3339(),
                node.updated_at.to_rfc3339(),
            ],
        );
    }
    Ok(out)
}

pub(crate) fn relationships_to_csv(relationships: &[Relationship]) -> StorageResult<String> {
    let mut out = String::new();
    push_record(&mut out, &RELATIONSHIP_HEADER.map(String::from));
    for rel in relationships {
        push_record(
            &mut out,
            &[
                escape(rel.id.as_str()),
                escape(&rel.relationship_type),
                escape(&rel.label),
                escape(rel.source_node_id.as_str()),
                escape(rel.target_node_id.as_str()),
                quote(&serde_json::to_string(&rel.properties)?),
                rel.created_at.to_rfc3339(),
                rel.updated_at.to_rfc3339(),
            ],
        );
    }
    Ok(out)
}

/// Write `nodes.csv` and `relationships.csv` into `dir`, creating it if needed
pub fn write_csv_dir(snapshot: &GraphSnapshot, dir: &Path) -> StorageResult<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(NODES_FILE), nodes_to_csv(&snapshot.nodes)?)?;
    std::fs::write(
        dir.join(RELATIONSHIPS_FILE),
        relationships_to_csv(&snapshot.relationships)?,
    )?;
    Ok(())
}

// === Reading ===

/// Split CSV text into records. Quoted fields may span lines.
pub(crate) fn parse_records(input: &str) -> StorageResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                let blank = record.len() == 1 && record[0].is_empty();
                if !blank {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(StorageError::Parse("unterminated quoted field".to_string()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// One data row addressed by header name
struct CsvRow<'a> {
    line: usize,
    columns: &'a HashMap<&'a str, usize>,
    values: &'a [String],
}

impl<'a> CsvRow<'a> {
    fn get(&self, name: &str) -> StorageResult<&'a str> {
        let index = self.columns.get(name).copied().ok_or_else(|| {
            StorageError::Parse(format!("missing column: {name}"))
        })?;
        Ok(self.values.get(index).map(String::as_str).unwrap_or(""))
    }

    fn required(&self, name: &str) -> StorageResult<&'a str> {
        let value = self.get(name)?;
        if value.is_empty() {
            return Err(StorageError::Parse(format!(
                "line {}: empty {name}",
                self.line
            )));
        }
        Ok(value)
    }

    /// `None` when the column is absent or the cell is empty
    fn optional(&self, name: &str) -> StorageResult<Option<&'a str>> {
        if !self.columns.contains_key(name) {
            return Ok(None);
        }
        let value = self.get(name)?;
        Ok((!value.is_empty()).then_some(value))
    }

    fn properties(&self) -> StorageResult<Properties> {
        match self.optional("properties")? {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Properties::new()),
        }
    }

    /// Missing or empty timestamps fall back to `fallback`
    fn timestamp(&self, name: &str, fallback: DateTime<Utc>) -> StorageResult<DateTime<Utc>> {
        let Some(value) = self.optional(name)? else {
            return Ok(fallback);
        };
        Ok(DateTime::parse_from_rfc3339(value)
            .map_err(|e| StorageError::DateParse(format!("line {}: {e}", self.line)))?
            .with_timezone(&Utc))
    }
}

/// Parse a table and hand each data row to `f`
fn read_table<T>(
    input: &str,
    mut f: impl FnMut(&CsvRow<'_>) -> StorageResult<T>,
) -> StorageResult<Vec<T>> {
    let records = parse_records(input)?;
    let Some((header, rows)) = records.split_first() else {
        return Ok(Vec::new());
    };
    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    rows.iter()
        .enumerate()
        .map(|(i, values)| {
            f(&CsvRow {
                line: i + 2,
                columns: &columns,
                values,
            })
        })
        .collect()
}

pub(crate) fn nodes_from_csv(input: &str) -> StorageResult<Vec<Node>> {
    read_table(input, |row| {
        let now = Utc::now();
        let created_at = row.timestamp("createdAt", now)?;
        let vector = match row.optional("vector")? {
            Some(json) => Some(serde_json::from_str(json)?),
            None => None,
        };
        Ok(Node {
            id: NodeId::from_string(row.required("id")?),
            node_type: row.required("type")?.to_string(),
            label: row.get("label")?.to_string(),
            properties: row.properties()?,
            vector,
            created_at,
            updated_at: row.timestamp("updatedAt", created_at)?,
        })
    })
}

pub(crate) fn relationships_from_csv(input: &str) -> StorageResult<Vec<Relationship>> {
    read_table(input, |row| {
        let created_at = row.timestamp("createdAt", Utc::now())?;
        Ok(Relationship {
            id: RelationshipId::from_string(row.required("id")?),
            relationship_type: row.required("type")?.to_string(),
            label: row.get("label")?.to_string(),
            properties: row.properties()?,
            source_node_id: NodeId::from_string(row.required("sourceNodeId")?),
            target_node_id: NodeId::from_string(row.required("targetNodeId")?),
            created_at,
            updated_at: row.timestamp("updatedAt", created_at)?,
        })
    })
}

/// Read a CSV snapshot directory. `relationships.csv` may be absent.
pub fn read_csv_dir(dir: &Path) -> StorageResult<GraphSnapshot> {
    let nodes = nodes_from_csv(&std::fs::read_to_string(dir.join(NODES_FILE))?)?;
    let relationships_path = dir.join(RELATIONSHIPS_FILE);
    let relationships = if relationships_path.exists() {
        relationships_from_csv(&std::fs::read_to_string(relationships_path)?)?
    } else {
        Vec::new()
    };
    Ok(GraphSnapshot {
        nodes,
        relationships,
    })
}
