//! Vector store module for simdex-db.
//!
//! One uniform contract ([`VectorStore`]) over heterogeneous backends:
//! a managed vector index service and a graph database with vector +
//! full-text indexing.
//!
//! ## Usage
//!
//! ```ignore
//! use simdex_db::store::{ManagedStoreConfig, ManagedVectorStore, VectorStore};
//!
//! let store = ManagedVectorStore::new(client, embedder, ManagedStoreConfig::new());
//!
//! // Write documents (embedded externally)
//! let ids = store.add_vectors(vectors, documents, None).await?;
//!
//! // Query similar documents
//! let hits = store.similarity_search_vector_with_score(&query, 10, None).await?;
//! ```

mod backend;
mod batch;
mod config;
mod metadata;
mod search;
mod traits;
mod types;
mod validate;

// Re-export main types
pub use config::{
    GraphStoreConfig, ManagedStoreConfig, DEFAULT_EMBEDDING_PROPERTY, DEFAULT_GRAPH_INDEX_NAME,
    DEFAULT_INDEX_NAME, DEFAULT_KEYWORD_INDEX_NAME, DEFAULT_NODE_LABEL, DEFAULT_TEXT_FIELD,
    MAX_UPSERT_BATCH_SIZE,
};
pub use metadata::{decode_metadata, encode_metadata};
pub use search::{compare_native, fuse_hybrid, RankedHit};
pub use traits::VectorStore;
pub use types::{DistanceStrategy, IndexDescriptor, SearchHit, SearchType, UpsertItem};
pub use validate::{validate_add_vectors, validate_from_texts, validate_k, Metadatas};

// Re-export backends and their client seams
pub use backend::{
    CreateIndexResponse, DeleteResponse, DropIndexResponse, GraphClient, GraphClientError,
    GraphVectorStore, IndexInfo, ListIndexesResponse, ManagedIndexClient, ManagedVectorStore,
    MemoryIndexClient, RawHit, Row, SearchResponse, UpsertResponse,
};
