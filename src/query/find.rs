//! Find queries: filter, sort and paginate nodes or relationships
//!
//! The same `FindQuery` drives `query_nodes` and `query_relationships`;
//! anything implementing `Queryable` can be evaluated.

use super::types::SortDirection;
use crate::graph::{Node, Properties, PropertyValue, Relationship};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A sortable field value extracted from an entity
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
    Bool(bool),
    Other(String),
}

impl SortKey {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Null => None,
            PropertyValue::Bool(b) => Some(SortKey::Bool(*b)),
            PropertyValue::Int(i) => Some(SortKey::Number(*i as f64)),
            PropertyValue::Float(f) if f.is_nan() => None,
            PropertyValue::Float(f) => Some(SortKey::Number(*f)),
            PropertyValue::String(s) => Some(SortKey::Text(s.clone())),
            PropertyValue::Array(_) => Some(SortKey::Other(value.to_string())),
        }
    }

    fn as_text(&self) -> String {
        match self {
            SortKey::Number(n) => n.to_string(),
            SortKey::Text(s) | SortKey::Other(s) => s.clone(),
            SortKey::Time(t) => t.to_rfc3339(),
            SortKey::Bool(b) => b.to_string(),
        }
    }

    /// Type-aware comparison; mixed kinds fall back to string comparison
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            _ => self.as_text().cmp(&other.as_text()),
        }
    }
}

/// Compare two optional keys. Missing values sort last in either direction.
pub fn compare_keys(a: Option<&SortKey>, b: Option<&SortKey>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = a.compare(b);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
    }
}

/// An entity the query evaluator can filter and sort
pub trait Queryable {
    fn entity_type(&self) -> &str;
    fn label(&self) -> &str;
    fn properties(&self) -> &Properties;
    /// Built-in field by name; `None` means "not a built-in field"
    fn builtin_field(&self, name: &str) -> Option<SortKey>;

    /// Value used when sorting by `name`: built-in field first, then property
    fn sort_key(&self, name: &str) -> Option<SortKey> {
        self.builtin_field(name)
            .or_else(|| self.properties().get(name).and_then(SortKey::from_property))
    }
}

impl Queryable for Node {
    fn entity_type(&self) -> &str {
        &self.node_type
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn builtin_field(&self, name: &str) -> Option<SortKey> {
        match name {
            "id" => Some(SortKey::Text(self.id.to_string())),
            "type" => Some(SortKey::Text(self.node_type.clone())),
            "label" => Some(SortKey::Text(self.label.clone())),
            "createdAt" => Some(SortKey::Time(self.created_at)),
            "updatedAt" => Some(SortKey::Time(self.updated_at)),
            _ => None,
        }
    }
}

impl Queryable for Relationship {
    fn entity_type(&self) -> &str {
        &self.relationship_type
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn builtin_field(&self, name: &str) -> Option<SortKey> {
        match name {
            "id" => Some(SortKey::Text(self.id.to_string())),
            "type" => Some(SortKey::Text(self.relationship_type.clone())),
            "label" => Some(SortKey::Text(self.label.clone())),
            "sourceNodeId" => Some(SortKey::Text(self.source_node_id.to_string())),
            "targetNodeId" => Some(SortKey::Text(self.target_node_id.to_string())),
            "createdAt" => Some(SortKey::Time(self.created_at)),
            "updatedAt" => Some(SortKey::Time(self.updated_at)),
            _ => None,
        }
    }
}

/// Query for finding entities by various criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    /// Accept only these types
    pub types: Option<Vec<String>>,
    /// Accept only these labels
    pub labels: Option<Vec<String>>,
    /// Every key must be present with an equal value
    pub properties: Properties,
    /// Field or property key to sort by
    pub order_by: Option<String>,
    pub order: SortDirection,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Number of results to skip
    pub offset: Option<usize>,
}

impl FindQuery {
    /// Create a new empty query (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by type (may be called repeatedly to accept several)
    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.types.get_or_insert_with(Vec::new).push(entity_type.into());
        self
    }

    /// Filter by label (may be called repeatedly to accept several)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.get_or_insert_with(Vec::new).push(label.into());
        self
    }

    /// Filter by property value
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortDirection) -> Self {
        self.order_by = Some(field.into());
        self.order = order;
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results (for pagination)
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Check if an entity matches all filter criteria
    pub fn matches<T: Queryable>(&self, item: &T) -> bool {
        if let Some(ref types) = self.types {
            if !types.iter().any(|t| t == item.entity_type()) {
                return false;
            }
        }

        if let Some(ref labels) = self.labels {
            if !labels.iter().any(|l| l == item.label()) {
                return false;
            }
        }

        self.properties.iter().all(|(key, expected)| {
            item.properties()
                .get(key)
                .is_some_and(|value| value.matches(expected))
        })
    }

    /// Filter, sort and paginate `items`
    pub fn execute<T: Queryable>(&self, items: Vec<T>) -> Vec<T> {
        let mut matched: Vec<T> = items.into_iter().filter(|item| self.matches(item)).collect();

        if let Some(ref field) = self.order_by {
            let mut keyed: Vec<(Option<SortKey>, T)> = matched
                .into_iter()
                .map(|item| (item.sort_key(field), item))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), self.order));
            matched = keyed.into_iter().map(|(_, item)| item).collect();
        }

        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        matched.into_iter().skip(offset).take(limit).collect()
    }
}
