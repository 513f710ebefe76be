//! Core store types shared by every backend.

use serde::{Deserialize, Serialize};
use simdex_core::Document;
use std::collections::BTreeMap;

// ============================================================================
// DistanceStrategy
// ============================================================================

/// Distance metric for vector similarity search.
///
/// Fixed per index at creation time. An index created under one strategy
/// must never be queried as if created under the other - mismatches
/// produce wrong-but-not-crashing rankings, so lifecycle code persists
/// and verifies the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStrategy {
    /// Cosine similarity (default). Higher scores are better.
    #[default]
    Cosine,
    /// Euclidean (L2) distance. Lower scores are better.
    Euclidean,
}

impl DistanceStrategy {
    /// Get the strategy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceStrategy::Cosine => "cosine",
            DistanceStrategy::Euclidean => "euclidean",
        }
    }

    /// Whether larger scores rank earlier under this strategy.
    pub fn higher_is_better(&self) -> bool {
        matches!(self, DistanceStrategy::Cosine)
    }
}

impl std::fmt::Display for DistanceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SearchType
// ============================================================================

/// Whether the keyword index participates in ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Vector nearest-neighbor only (default).
    #[default]
    Vector,
    /// Vector plus full-text keyword ranking, fused deterministically.
    Hybrid,
}

impl SearchType {
    /// Get the search type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Vector => "vector",
            SearchType::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SearchHit
// ============================================================================

/// A single ranked result from a similarity search.
///
/// `score` is the backend-native measure, carried through unchanged:
/// a distance (lower is better) for euclidean indexes, a similarity
/// (higher is better) for cosine indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The reconstructed document.
    pub document: Document,

    /// Backend-native distance or similarity.
    pub score: f32,
}

impl SearchHit {
    /// Create a new search hit.
    pub fn new(document: Document, score: f32) -> Self {
        Self { document, score }
    }
}

// ============================================================================
// UpsertItem
// ============================================================================

/// The backend-facing unit of a batched write to the managed index
/// service, which only accepts flat string-valued metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertItem {
    /// Caller-supplied or generated item id.
    pub id: String,

    /// The embedding vector.
    pub vector: Vec<f32>,

    /// Flat string metadata, text field included.
    pub metadata: BTreeMap<String, String>,
}

// ============================================================================
// IndexDescriptor
// ============================================================================

/// What a store instance knows about its index.
///
/// Created lazily on the first ensure/discover call and cached for the
/// lifetime of the store instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,

    /// Configured vector dimensionality. `None` until first successfully
    /// created or discovered.
    pub dimensions: Option<usize>,

    /// Whether the index is known to exist in the backend.
    pub exists: bool,
}

impl IndexDescriptor {
    /// Descriptor for an index that has not been observed yet.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: None,
            exists: false,
        }
    }

    /// Descriptor for an index known to exist with the given dimensions.
    pub fn existing(name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            name: name.into(),
            dimensions: Some(dimensions),
            exists: true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_strategy() {
        assert_eq!(DistanceStrategy::Cosine.as_str(), "cosine");
        assert_eq!(DistanceStrategy::Euclidean.as_str(), "euclidean");
        assert_eq!(DistanceStrategy::default(), DistanceStrategy::Cosine);
        assert!(DistanceStrategy::Cosine.higher_is_better());
        assert!(!DistanceStrategy::Euclidean.higher_is_better());
    }

    #[test]
    fn test_search_type() {
        assert_eq!(SearchType::default(), SearchType::Vector);
        assert_eq!(SearchType::Hybrid.to_string(), "hybrid");
    }

    #[test]
    fn test_index_descriptor() {
        let desc = IndexDescriptor::unknown("default");
        assert!(!desc.exists);
        assert_eq!(desc.dimensions, None);

        let desc = IndexDescriptor::existing("default", 768);
        assert!(desc.exists);
        assert_eq!(desc.dimensions, Some(768));
    }

    #[test]
    fn test_strategy_serde_lowercase() {
        let text = serde_json::to_string(&DistanceStrategy::Euclidean).unwrap();
        assert_eq!(text, "\"euclidean\"");
        let parsed: DistanceStrategy = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(parsed, DistanceStrategy::Cosine);
    }
}
