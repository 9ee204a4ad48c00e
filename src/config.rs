//! Store configuration
//!
//! An explicit value handed to a backend at construction. There is no
//! process-wide configuration state.

use crate::storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by every `GraphStore` backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Whether `vector_search` is available
    pub enable_vector_search: bool,
    /// Required embedding length; `None` accepts any length
    pub vector_dimension: Option<usize>,
    /// Default log filter used by the binary when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            enable_vector_search: true,
            vector_dimension: None,
            log_level: "info".to_string(),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector_dimension(mut self, dimension: usize) -> Self {
        self.vector_dimension = Some(dimension);
        self
    }

    pub fn with_vector_search(mut self, enabled: bool) -> Self {
        self.enable_vector_search = enabled;
        self
    }

    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> StorageResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> StorageResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Reject embeddings whose length differs from the configured dimension
    pub fn check_vector(&self, vector: &[f32]) -> StorageResult<()> {
        if vector.is_empty() {
            return Err(StorageError::InvalidArgument(
                "vector must not be empty".to_string(),
            ));
        }
        match self.vector_dimension {
            Some(expected) if expected != vector.len() => Err(StorageError::InvalidArgument(format!(
                "vector dimension mismatch: expected {}, got {}",
                expected,
                vector.len()
            ))),
            _ => Ok(()),
        }
    }
}
