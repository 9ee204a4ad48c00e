//! GraphML export
//!
//! Write-only: every node and relationship becomes a `<node>`/`<edge>` with
//! `<data>` entries for its fields. Properties and vectors are stored as
//! JSON strings.

use super::GraphSnapshot;
use crate::storage::StorageResult;
use chrono::{DateTime, Utc};

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";

/// `(key id, applies to, attribute name)`
const KEYS: [(&str, &str, &str); 11] = [
    ("n_type", "node", "type"),
    ("n_label", "node", "label"),
    ("n_properties", "node", "properties"),
    ("n_vector", "node", "vector"),
    ("n_createdAt", "node", "createdAt"),
    ("n_updatedAt", "node", "updatedAt"),
    ("e_type", "edge", "type"),
    ("e_label", "edge", "label"),
    ("e_properties", "edge", "properties"),
    ("e_createdAt", "edge", "createdAt"),
    ("e_updatedAt", "edge", "updatedAt"),
];

pub(crate) fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn data(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("      <data key=\"{key}\">{}</data>\n", escape_xml(value)));
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Render a snapshot as a GraphML document
pub fn to_graphml(snapshot: &GraphSnapshot) -> StorageResult<String> {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<graphml xmlns=\"{GRAPHML_NS}\">\n"));
    for (id, domain, name) in KEYS {
        out.push_str(&format!(
            "  <key id=\"{id}\" for=\"{domain}\" attr.name=\"{name}\" attr.type=\"string\"/>\n"
        ));
    }
    out.push_str("  <graph id=\"G\" edgedefault=\"directed\">\n");

    for node in &snapshot.nodes {
        out.push_str(&format!("    <node id=\"{}\">\n", escape_xml(node.id.as_str())));
        data(&mut out, "n_type", &node.node_type);
        data(&mut out, "n_label", &node.label);
        data(&mut out, "n_properties", &serde_json::to_string(&node.properties)?);
        if let Some(ref vector) = node.vector {
            data(&mut out, "n_vector", &serde_json::to_string(vector)?);
        }
        data(&mut out, "n_createdAt", &timestamp(&node.created_at));
        data(&mut out, "n_updatedAt", &timestamp(&node.updated_at));
        out.push_str("    </node>\n");
    }

    for rel in &snapshot.relationships {
        out.push_str(&format!(
            "    <edge id=\"{}\" source=\"{}\" target=\"{}\">\n",
            escape_xml(rel.id.as_str()),
            escape_xml(rel.source_node_id.as_str()),
            escape_xml(rel.target_node_id.as_str())
        ));
        data(&mut out, "e_type", &rel.relationship_type);
        data(&mut out, "e_label", &rel.label);
        data(&mut out, "e_properties", &serde_json::to_string(&rel.properties)?);
        data(&mut out, "e_createdAt", &timestamp(&rel.created_at));
        data(&mut out, "e_updatedAt", &timestamp(&rel.updated_at));
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n</graphml>\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Relationship};

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn document_structure() {
        let a = Node::new("PERSON", "Ada <Lovelace>").with_vector(vec![1.0]);
        let b = Node::new("ORGANIZATION", "Acme & Co");
        let rel = Relationship::new(a.id.clone(), b.id.clone(), "WORKS_AT", "works at");
        let snapshot = GraphSnapshot {
            nodes: vec![a.clone(), b],
            relationships: vec![rel.clone()],
        };

        let xml = to_graphml(&snapshot).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("edgedefault=\"directed\""));
        assert_eq!(xml.matches("<node ").count(), 2);
        assert_eq!(xml.matches("<edge ").count(), 1);
        assert_eq!(xml.matches("key=\"n_vector\"").count(), 1);
        assert!(xml.contains("Ada &lt;Lovelace&gt;"));
        assert!(xml.contains("Acme &amp; Co"));
        assert!(xml.contains(&format!(
            "source=\"{}\" target=\"{}\"",
            rel.source_node_id, rel.target_node_id
        )));
        assert!(xml.contains(&format!("<node id=\"{}\">", a.id)));
        assert!(xml.trim_end().ends_with("</graphml>"));
    }
}
