//! In-memory managed index client.
//!
//! A linear-scan implementation of [`ManagedIndexClient`] for testing and
//! small indexes where a remote vector service is not justified. Scoring
//! matches the wire contract of the managed service: cosine similarity
//! ranks descending, euclidean distance ascending.

use super::managed::{
    CreateIndexResponse, DeleteResponse, DropIndexResponse, IndexInfo, ListIndexesResponse,
    ManagedIndexClient, RawHit, SearchResponse, UpsertResponse,
};
use crate::store::search::compare_native;
use crate::store::types::{DistanceStrategy, UpsertItem};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, trace};

struct MemoryIndex {
    dimensions: usize,
    items: BTreeMap<String, UpsertItem>,
}

/// In-memory vector index service.
pub struct MemoryIndexClient {
    strategy: DistanceStrategy,
    indexes: RwLock<HashMap<String, MemoryIndex>>,
}

impl MemoryIndexClient {
    /// Create an empty in-memory service scoring with cosine similarity.
    pub fn new() -> Self {
        Self::with_strategy(DistanceStrategy::Cosine)
    }

    /// Create an empty in-memory service with the given scoring strategy.
    pub fn with_strategy(strategy: DistanceStrategy) -> Self {
        Self {
            strategy,
            indexes: RwLock::new(HashMap::new()),
        }
    }

    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.strategy {
            DistanceStrategy::Cosine => cosine_similarity(a, b),
            DistanceStrategy::Euclidean => euclidean_distance(a, b),
        }
    }
}

impl Default for MemoryIndexClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManagedIndexClient for MemoryIndexClient {
    async fn create_index(&self, index_name: &str, dimensions: usize) -> CreateIndexResponse {
        let mut indexes = self.indexes.write().await;
        if indexes.contains_key(index_name) {
            return CreateIndexResponse::AlreadyExists;
        }

        debug!("Creating in-memory index '{}' ({} dims)", index_name, dimensions);
        indexes.insert(
            index_name.to_string(),
            MemoryIndex {
                dimensions,
                items: BTreeMap::new(),
            },
        );
        CreateIndexResponse::Created
    }

    async fn upsert_item_batch(&self, index_name: &str, items: Vec<UpsertItem>) -> UpsertResponse {
        let mut indexes = self.indexes.write().await;
        let index = match indexes.get_mut(index_name) {
            Some(index) => index,
            None => {
                return UpsertResponse::Error(format!("index '{}' does not exist", index_name))
            }
        };

        for item in &items {
            if item.vector.len() != index.dimensions {
                return UpsertResponse::Error(format!(
                    "vector dimension mismatch: expected {}, got {}",
                    index.dimensions,
                    item.vector.len()
                ));
            }
        }

        trace!("Upserting {} items into '{}'", items.len(), index_name);
        for item in items {
            index.items.insert(item.id.clone(), item);
        }
        UpsertResponse::Success
    }

    async fn search(&self, index_name: &str, vector: &[f32], top_k: usize) -> SearchResponse {
        let indexes = self.indexes.read().await;
        let index = match indexes.get(index_name) {
            Some(index) => index,
            None => {
                return SearchResponse::Error(format!("index '{}' does not exist", index_name))
            }
        };

        let mut scored: Vec<RawHit> = index
            .items
            .values()
            .map(|item| RawHit {
                id: item.id.clone(),
                score: self.score(vector, &item.vector),
                metadata: item.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            compare_native(a.score, b.score, self.strategy).then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(top_k);

        trace!("Search in '{}' returned {} hits", index_name, scored.len());
        SearchResponse::Success(scored)
    }

    async fn delete_item_batch(&self, index_name: &str, ids: &[String]) -> DeleteResponse {
        let mut indexes = self.indexes.write().await;
        let index = match indexes.get_mut(index_name) {
            Some(index) => index,
            None => {
                return DeleteResponse::Error(format!("index '{}' does not exist", index_name))
            }
        };

        for id in ids {
            index.items.remove(id);
        }
        DeleteResponse::Success
    }

    async fn list_indexes(&self) -> ListIndexesResponse {
        let indexes = self.indexes.read().await;
        let mut infos: Vec<IndexInfo> = indexes
            .iter()
            .map(|(name, index)| IndexInfo {
                name: name.clone(),
                dimensions: index.dimensions,
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        ListIndexesResponse::Success(infos)
    }

    async fn drop_index(&self, index_name: &str) -> DropIndexResponse {
        let mut indexes = self.indexes.write().await;
        match indexes.remove(index_name) {
            Some(_) => {
                debug!("Dropped in-memory index '{}'", index_name);
                DropIndexResponse::Success
            }
            None => DropIndexResponse::NotFound,
        }
    }
}

// ============================================================================
// Similarity Functions
// ============================================================================

/// Compute cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Compute Euclidean (L2) distance between two vectors.
fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, vector: Vec<f32>) -> UpsertItem {
        UpsertItem {
            id: id.to_string(),
            vector,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = vec![0.0, 0.0, 0.0];
        assert!((euclidean_distance(&a, &[3.0, 4.0, 0.0]) - 5.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_create_then_already_exists() {
        let client = MemoryIndexClient::new();
        assert!(matches!(
            client.create_index("idx", 3).await,
            CreateIndexResponse::Created
        ));
        assert!(matches!(
            client.create_index("idx", 3).await,
            CreateIndexResponse::AlreadyExists
        ));
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let client = MemoryIndexClient::new();
        client.create_index("idx", 2).await;
        client
            .upsert_item_batch(
                "idx",
                vec![
                    item("far", vec![0.0, 1.0]),
                    item("near", vec![1.0, 0.1]),
                ],
            )
            .await;

        match client.search("idx", &[1.0, 0.0], 2).await {
            SearchResponse::Success(hits) => {
                assert_eq!(hits[0].id, "near");
                assert_eq!(hits[1].id, "far");
            }
            SearchResponse::Error(message) => panic!("search failed: {message}"),
        }
    }

    #[tokio::test]
    async fn test_euclidean_ranks_ascending() {
        let client = MemoryIndexClient::with_strategy(DistanceStrategy::Euclidean);
        client.create_index("idx", 1).await;
        client
            .upsert_item_batch("idx", vec![item("a", vec![5.0]), item("b", vec![1.0])])
            .await;

        match client.search("idx", &[0.0], 2).await {
            SearchResponse::Success(hits) => {
                assert_eq!(hits[0].id, "b");
                assert!(hits[0].score < hits[1].score);
            }
            SearchResponse::Error(message) => panic!("search failed: {message}"),
        }
    }

    #[tokio::test]
    async fn test_upsert_dimension_check() {
        let client = MemoryIndexClient::new();
        client.create_index("idx", 2).await;
        let response = client
            .upsert_item_batch("idx", vec![item("a", vec![1.0, 2.0, 3.0])])
            .await;
        assert!(matches!(response, UpsertResponse::Error(_)));
    }

    #[tokio::test]
    async fn test_drop_index() {
        let client = MemoryIndexClient::new();
        client.create_index("idx", 2).await;
        assert!(matches!(
            client.drop_index("idx").await,
            DropIndexResponse::Success
        ));
        assert!(matches!(
            client.drop_index("idx").await,
            DropIndexResponse::NotFound
        ));
    }
}
