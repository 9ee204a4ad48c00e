//! Directed, typed relationships between nodes

use super::node::{NodeId, Properties, PropertyValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(String);

impl RelationshipId {
    /// Create a new random RelationshipId
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a RelationshipId from an existing string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RelationshipId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A directed relationship `source -[type]-> target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Unique identifier
    pub id: RelationshipId,
    /// Type of relationship (e.g., "KNOWS", "WORKS_AT")
    #[serde(rename = "type")]
    pub relationship_type: String,
    /// Display label
    pub label: String,
    /// Additional properties
    #[serde(default)]
    pub properties: Properties,
    /// Source node
    pub source_node_id: NodeId,
    /// Target node
    pub target_node_id: NodeId,
    /// When the relationship was created
    pub created_at: DateTime<Utc>,
    /// When the relationship was last modified
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new relationship with a fresh id
    pub fn new(
        source: NodeId,
        target: NodeId,
        relationship_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RelationshipId::new(),
            relationship_type: relationship_type.into(),
            label: label.into(),
            properties: HashMap::new(),
            source_node_id: source,
            target_node_id: target,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether the relationship touches the node as source or target
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source_node_id == node_id || &self.target_node_id == node_id
    }

    /// The endpoint opposite `from`. For self-loops this is `from` itself.
    pub fn other_end(&self, from: &NodeId) -> &NodeId {
        if &self.source_node_id == from {
            &self.target_node_id
        } else {
            &self.source_node_id
        }
    }

    /// Apply a patch. Endpoints and type are immutable.
    pub fn apply(&mut self, patch: UpdateRelationshipInput) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(properties) = patch.properties {
            self.properties = properties;
        }
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// Input for creating a relationship. Both endpoints must exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationshipInput {
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub label: String,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    #[serde(default)]
    pub properties: Properties,
}

impl CreateRelationshipInput {
    pub fn new(
        source: NodeId,
        target: NodeId,
        relationship_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            relationship_type: relationship_type.into(),
            label: label.into(),
            source_node_id: source,
            target_node_id: target,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn into_relationship(self) -> Relationship {
        let mut rel = Relationship::new(
            self.source_node_id,
            self.target_node_id,
            self.relationship_type,
            self.label,
        );
        rel.properties = self.properties;
        rel
    }
}

/// Patch for an existing relationship
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRelationshipInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl UpdateRelationshipInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }
}
