//! Cosine-similarity search over node embeddings
//!
//! Vectors are supplied by callers; nothing here computes embeddings.

use super::types::SimilarityMatch;
use crate::storage::{GraphStore, StorageError, StorageResult};

/// Cosine similarity; zero-magnitude input yields 0.0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Nearest-neighbour query by embedding
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    /// Restrict candidates to these node types (empty = all)
    pub node_types: Vec<String>,
    pub limit: Option<usize>,
    pub min_similarity: Option<f32>,
}

impl VectorQuery {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            node_types: Vec::new(),
            limit: None,
            min_similarity: None,
        }
    }

    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_types.push(node_type.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn min_similarity(mut self, threshold: f32) -> Self {
        self.min_similarity = Some(threshold);
        self
    }

    /// Rank every candidate node descending by similarity.
    ///
    /// Fails with `InvalidArgument` when the query length differs from a
    /// stored candidate vector. Nodes without a vector are not candidates.
    pub fn execute<S: GraphStore + ?Sized>(&self, store: &S) -> StorageResult<Vec<SimilarityMatch>> {
        let config = store.config();
        if !config.enable_vector_search {
            return Err(StorageError::InvalidArgument(
                "vector search is disabled".to_string(),
            ));
        }
        config.check_vector(&self.vector)?;

        let mut matches = Vec::new();
        for node in store.scan_nodes()? {
            if !self.node_types.is_empty() && !self.node_types.iter().any(|t| t == &node.node_type) {
                continue;
            }
            let Some(ref vector) = node.vector else {
                continue;
            };
            if vector.len() != self.vector.len() {
                return Err(StorageError::InvalidArgument(format!(
                    "vector dimension mismatch: query has {}, node {} has {}",
                    self.vector.len(),
                    node.id,
                    vector.len()
                )));
            }
            let similarity = cosine_similarity(&self.vector, vector);
            if similarity.is_nan() {
                continue;
            }
            matches.push(SimilarityMatch { node, similarity });
        }

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        if let Some(threshold) = self.min_similarity {
            matches.retain(|m| m.similarity >= threshold);
        }
        if let Some(limit) = self.limit {
            matches.truncate(limit);
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::graph::{CreateNodeInput, MemoryGraph};

    fn create_test_graph(config: GraphConfig) -> MemoryGraph {
        let mut graph = MemoryGraph::with_config(config);
        graph.initialize().unwrap();
        for (label, node_type, vector) in [
            ("travel", "CONCEPT", vec![0.9, 0.1, 0.0]),
            ("journey", "CONCEPT", vec![0.85, 0.15, 0.05]),
            ("democracy", "CONCEPT", vec![0.0, 0.1, 0.95]),
            ("airline", "ORGANIZATION", vec![0.8, 0.2, 0.1]),
        ] {
            graph
                .create_node(CreateNodeInput::new(node_type, label).with_vector(vector))
                .unwrap();
        }
        graph.create_node(CreateNodeInput::new("CONCEPT", "unembedded")).unwrap();
        graph
    }

    fn labels(matches: &[SimilarityMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.node.label.as_str()).collect()
    }

    #[test]
    fn cosine_similarity_correct() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6, "identical vectors");

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 1e-6, "orthogonal vectors");

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 1e-6, "opposite vectors");
    }

    #[test]
    fn cosine_similarity_zero_vector() {
        let a = vec![1.0, 0.0, 0.0];
        let zero = vec![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
    }

    #[test]
    fn exact_vector_ranks_first() {
        let graph = create_test_graph(GraphConfig::new().with_vector_dimension(3));
        let matches = VectorQuery::new(vec![0.0, 0.1, 0.95]).execute(&graph).unwrap();

        assert_eq!(matches[0].node.label, "democracy");
        assert!((matches[0].similarity - 1.0).abs() < 1e-5);
        assert_eq!(matches.len(), 4, "unembedded node is not a candidate");
    }

    #[test]
    fn node_type_filter_and_limit() {
        let graph = create_test_graph(GraphConfig::new());
        let matches = VectorQuery::new(vec![1.0, 0.0, 0.0])
            .with_node_type("CONCEPT")
            .limit(2)
            .execute(&graph)
            .unwrap();

        assert_eq!(labels(&matches), vec!["travel", "journey"]);
    }

    #[test]
    fn min_similarity_threshold() {
        let graph = create_test_graph(GraphConfig::new());
        let matches = VectorQuery::new(vec![1.0, 0.0, 0.0])
            .min_similarity(0.9)
            .execute(&graph)
            .unwrap();

        assert!(matches.iter().all(|m| m.similarity >= 0.9));
        assert!(!labels(&matches).contains(&"democracy"));
    }

    #[test]
    fn dimension_mismatch_is_invalid_argument() {
        let graph = create_test_graph(GraphConfig::new().with_vector_dimension(3));
        let err = VectorQuery::new(vec![1.0, 0.0]).execute(&graph).unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
    }

    #[test]
    fn mismatch_with_stored_vectors_fails_without_configured_dimension() {
        let graph = create_test_graph(GraphConfig::new());
        let err = VectorQuery::new(vec![1.0, 0.0]).execute(&graph).unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
    }

    #[test]
    fn nan_similarity_is_dropped_and_order_holds() {
        let mut graph = create_test_graph(GraphConfig::new());
        graph
            .create_node(CreateNodeInput::new("CONCEPT", "broken").with_vector(vec![f32::NAN, 0.0, 0.0]))
            .unwrap();

        let matches = VectorQuery::new(vec![1.0, 0.0, 0.0]).execute(&graph).unwrap();

        assert!(!labels(&matches).contains(&"broken"));
        assert_eq!(matches.len(), 4);
        assert!(matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn disabled_vector_search() {
        let graph = create_test_graph(GraphConfig::new().with_vector_search(false));
        let err = VectorQuery::new(vec![1.0, 0.0, 0.0]).execute(&graph).unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
    }
}
