//! Serialization tests against the snapshot wire format

use serde_json::{json, Value};

/// Fixture: a node as it appears in a JSON export
fn exported_node_fixture() -> Value {
    json!({
        "id": "node-alice",
        "type": "PERSON",
        "label": "Alice",
        "properties": {
            "age": 30,
            "score": 0.75,
            "active": true,
            "nickname": null,
            "tags": ["engineer", "speaker"]
        },
        "vector": [0.1, 0.2, 0.3],
        "createdAt": "2025-11-29T08:00:00Z",
        "updatedAt": "2025-11-30T10:23:00Z"
    })
}

/// Fixture: a relationship as it appears in a JSON export
fn exported_relationship_fixture() -> Value {
    json!({
        "id": "rel-works-at",
        "type": "WORKS_AT",
        "label": "works at",
        "properties": {
            "since": 2019
        },
        "sourceNodeId": "node-alice",
        "targetNodeId": "node-acme",
        "createdAt": "2025-11-29T08:00:00Z",
        "updatedAt": "2025-11-29T08:00:00Z"
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{Node, NodeId, PropertyValue, Relationship, RelationshipId};

    #[test]
    fn node_id_serializes_as_string() {
        let id = NodeId::from_string("node-alice");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"node-alice\"");
    }

    #[test]
    fn relationship_id_deserializes_from_string() {
        let id: RelationshipId = serde_json::from_str("\"rel-works-at\"").unwrap();
        assert_eq!(id.as_str(), "rel-works-at");
    }

    #[test]
    fn can_deserialize_exported_node_fixture() {
        let result: Result<Node, _> = serde_json::from_value(exported_node_fixture());
        assert!(result.is_ok(), "Failed to deserialize node fixture: {:?}", result.err());

        let node = result.unwrap();
        assert_eq!(node.id.as_str(), "node-alice");
        assert_eq!(node.node_type, "PERSON");
        assert_eq!(node.properties["age"], PropertyValue::Int(30));
        assert_eq!(node.properties["score"], PropertyValue::Float(0.75));
        assert_eq!(node.properties["active"], PropertyValue::Bool(true));
        assert!(node.properties["nickname"].is_null());
        assert_eq!(
            node.properties["tags"],
            PropertyValue::Array(vec!["engineer".into(), "speaker".into()])
        );
        assert_eq!(node.vector, Some(vec![0.1, 0.2, 0.3]));
        assert!(node.updated_at > node.created_at);
    }

    #[test]
    fn can_deserialize_exported_relationship_fixture() {
        let result: Result<Relationship, _> =
            serde_json::from_value(exported_relationship_fixture());
        assert!(result.is_ok(), "Failed to deserialize relationship fixture: {:?}", result.err());

        let rel = result.unwrap();
        assert_eq!(rel.relationship_type, "WORKS_AT");
        assert_eq!(rel.source_node_id.as_str(), "node-alice");
        assert_eq!(rel.target_node_id.as_str(), "node-acme");
        assert_eq!(rel.properties["since"], PropertyValue::Int(2019));
    }

    #[test]
    fn node_without_properties_or_vector_deserializes() {
        let mut fixture = exported_node_fixture();
        let obj = fixture.as_object_mut().unwrap();
        obj.remove("properties");
        obj.remove("vector");

        let node: Node = serde_json::from_value(fixture).unwrap();
        assert!(node.properties.is_empty());
        assert!(node.vector.is_none());
    }

    #[test]
    fn serialized_node_has_camel_case_structure() {
        let node = Node::new("PERSON", "Alice").with_property("age", 30i64);
        let json = serde_json::to_value(&node).unwrap();

        assert!(json["id"].is_string());
        assert_eq!(json["type"], "PERSON");
        assert_eq!(json["label"], "Alice");
        assert_eq!(json["properties"]["age"], 30);
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
        // Absent vectors are omitted
        assert!(json.get("vector").is_none());
        assert!(json.get("node_type").is_none());
    }

    #[test]
    fn serialized_relationship_has_camel_case_structure() {
        let rel = Relationship::new(
            NodeId::from_string("node-a"),
            NodeId::from_string("node-b"),
            "KNOWS",
            "knows",
        );
        let json = serde_json::to_value(&rel).unwrap();

        assert_eq!(json["type"], "KNOWS");
        assert_eq!(json["sourceNodeId"], "node-a");
        assert_eq!(json["targetNodeId"], "node-b");
        assert!(json["properties"].is_object());
        assert!(json.get("relationship_type").is_none());
    }

    #[test]
    fn node_roundtrip_preserves_everything() {
        let node = Node::new("CONCEPT", "travel")
            .with_property("weight", 1.5)
            .with_vector(vec![0.5, -0.5]);

        let json = serde_json::to_string(&node).unwrap();
        let node2: Node = serde_json::from_str(&json).unwrap();

        assert_eq!(node, node2);
    }
}
