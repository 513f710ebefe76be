//! Store configuration types and defaults.

use super::types::{DistanceStrategy, SearchType};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Default index name for the managed backend.
pub const DEFAULT_INDEX_NAME: &str = "default";

/// Reserved metadata key holding the document text.
pub const DEFAULT_TEXT_FIELD: &str = "text";

/// Maximum number of items per backend write call.
pub const MAX_UPSERT_BATCH_SIZE: usize = 128;

/// Default vector index name for the graph backend.
pub const DEFAULT_GRAPH_INDEX_NAME: &str = "vector";

/// Default full-text index name for the graph backend.
pub const DEFAULT_KEYWORD_INDEX_NAME: &str = "keyword";

/// Default node label for the graph backend.
pub const DEFAULT_NODE_LABEL: &str = "Chunk";

/// Default node property holding the embedding.
pub const DEFAULT_EMBEDDING_PROPERTY: &str = "embedding";

// ============================================================================
// ManagedStoreConfig
// ============================================================================

/// Configuration for a [`ManagedVectorStore`](crate::store::ManagedVectorStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedStoreConfig {
    /// Name of the index to write to and search.
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Reserved metadata key under which page content is stored.
    #[serde(default = "default_text_field")]
    pub text_field: String,

    /// Whether `add_vectors` creates the index on first write.
    /// When disabled, writes against an absent index fail.
    #[serde(default = "default_ensure_index_exists")]
    pub ensure_index_exists: bool,
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_text_field() -> String {
    DEFAULT_TEXT_FIELD.to_string()
}

fn default_ensure_index_exists() -> bool {
    true
}

impl Default for ManagedStoreConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            text_field: default_text_field(),
            ensure_index_exists: true,
        }
    }
}

impl ManagedStoreConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index name.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Set the reserved text field key.
    pub fn with_text_field(mut self, field: impl Into<String>) -> Self {
        self.text_field = field.into();
        self
    }

    /// Set whether writes create the index on demand.
    pub fn with_ensure_index_exists(mut self, ensure: bool) -> Self {
        self.ensure_index_exists = ensure;
        self
    }
}

// ============================================================================
// GraphStoreConfig
// ============================================================================

/// Configuration for a [`GraphVectorStore`](crate::store::GraphVectorStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStoreConfig {
    /// Vector index name.
    #[serde(default = "default_graph_index_name")]
    pub index_name: String,

    /// Full-text index name used for hybrid search.
    #[serde(default = "default_keyword_index_name")]
    pub keyword_index_name: String,

    /// Label of the nodes holding documents.
    #[serde(default = "default_node_label")]
    pub node_label: String,

    /// Node property holding the document text.
    #[serde(default = "default_text_field")]
    pub text_node_property: String,

    /// Node property holding the embedding vector.
    #[serde(default = "default_embedding_property")]
    pub embedding_node_property: String,

    /// Whether search uses the vector index alone or fuses in the
    /// full-text index.
    #[serde(default)]
    pub search_type: SearchType,

    /// Similarity function the vector index is created with.
    #[serde(default)]
    pub distance_strategy: DistanceStrategy,

    /// Drop existing index and data on construction, then recreate.
    #[serde(default)]
    pub pre_delete_collection: bool,

    /// Whether `add_vectors` creates the index on first write.
    #[serde(default = "default_ensure_index_exists")]
    pub ensure_index_exists: bool,

    /// Optional override for the retrieval return clause appended to
    /// search queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_query: Option<String>,
}

fn default_graph_index_name() -> String {
    DEFAULT_GRAPH_INDEX_NAME.to_string()
}

fn default_keyword_index_name() -> String {
    DEFAULT_KEYWORD_INDEX_NAME.to_string()
}

fn default_node_label() -> String {
    DEFAULT_NODE_LABEL.to_string()
}

fn default_embedding_property() -> String {
    DEFAULT_EMBEDDING_PROPERTY.to_string()
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            index_name: default_graph_index_name(),
            keyword_index_name: default_keyword_index_name(),
            node_label: default_node_label(),
            text_node_property: default_text_field(),
            embedding_node_property: default_embedding_property(),
            search_type: SearchType::Vector,
            distance_strategy: DistanceStrategy::Cosine,
            pre_delete_collection: false,
            ensure_index_exists: true,
            retrieval_query: None,
        }
    }
}

impl GraphStoreConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vector index name.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Set the keyword index name.
    pub fn with_keyword_index_name(mut self, name: impl Into<String>) -> Self {
        self.keyword_index_name = name.into();
        self
    }

    /// Set the node label.
    pub fn with_node_label(mut self, label: impl Into<String>) -> Self {
        self.node_label = label.into();
        self
    }

    /// Set the text node property.
    pub fn with_text_node_property(mut self, property: impl Into<String>) -> Self {
        self.text_node_property = property.into();
        self
    }

    /// Set the embedding node property.
    pub fn with_embedding_node_property(mut self, property: impl Into<String>) -> Self {
        self.embedding_node_property = property.into();
        self
    }

    /// Set the search type.
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Set the distance strategy.
    pub fn with_distance_strategy(mut self, strategy: DistanceStrategy) -> Self {
        self.distance_strategy = strategy;
        self
    }

    /// Set whether the collection is dropped and recreated on construction.
    pub fn with_pre_delete_collection(mut self, pre_delete: bool) -> Self {
        self.pre_delete_collection = pre_delete;
        self
    }

    /// Set whether writes create the index on demand.
    pub fn with_ensure_index_exists(mut self, ensure: bool) -> Self {
        self.ensure_index_exists = ensure;
        self
    }

    /// Set the retrieval query override.
    pub fn with_retrieval_query(mut self, query: impl Into<String>) -> Self {
        self.retrieval_query = Some(query.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
