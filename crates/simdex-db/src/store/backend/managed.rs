//! Managed vector index service backend.
//!
//! The service is driven through an opaque RPC client. Every call returns
//! a tagged response enum checked exhaustively at the call site, so an
//! unexpected backend state can never fall through silently. Metadata is
//! stored as a flat string map via the
//! [`metadata`](crate::store::metadata) codec, with page content under the
//! reserved text field.

use crate::error::{StoreError, StoreResult};
use crate::store::batch::chunked;
use crate::store::config::ManagedStoreConfig;
use crate::store::metadata::{decode_metadata, encode_metadata};
use crate::store::traits::VectorStore;
use crate::store::types::{IndexDescriptor, SearchHit, UpsertItem};
use crate::store::validate::{
    validate_add_vectors, validate_from_texts, validate_k, Metadatas,
};
use async_trait::async_trait;
use simdex_core::{Document, Embedder};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

// ============================================================================
// Client seam
// ============================================================================

/// A raw hit as returned by the service: item id, native distance or
/// similarity, and the flat string metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub id: String,
    pub score: f32,
    pub metadata: BTreeMap<String, String>,
}

/// Catalog entry for an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    pub name: String,
    pub dimensions: usize,
}

/// Response to a create-index call.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateIndexResponse {
    /// The index was newly created.
    Created,
    /// An index of that name already existed; its configuration is
    /// unchanged.
    AlreadyExists,
    /// The service reported a failure.
    Error(String),
}

/// Response to a batched upsert call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertResponse {
    Success,
    Error(String),
}

/// Response to a search call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResponse {
    /// Ranked hits, best-first. Empty when the index holds no vectors.
    Success(Vec<RawHit>),
    Error(String),
}

/// Response to a batched delete call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteResponse {
    Success,
    Error(String),
}

/// Response to a list-indexes call.
#[derive(Debug, Clone, PartialEq)]
pub enum ListIndexesResponse {
    Success(Vec<IndexInfo>),
    Error(String),
}

/// Response to a drop-index call.
#[derive(Debug, Clone, PartialEq)]
pub enum DropIndexResponse {
    Success,
    NotFound,
    Error(String),
}

/// The managed vector index service, as the store sees it.
///
/// Implementations are opaque RPC executors; retry policy, if any, lives
/// behind this trait, never in the store.
#[async_trait]
pub trait ManagedIndexClient: Send + Sync {
    /// Create an index with the declared dimensionality.
    async fn create_index(&self, index_name: &str, dimensions: usize) -> CreateIndexResponse;

    /// Insert-or-update one batch of items.
    async fn upsert_item_batch(&self, index_name: &str, items: Vec<UpsertItem>) -> UpsertResponse;

    /// Nearest-neighbor search, all metadata fields returned.
    async fn search(&self, index_name: &str, vector: &[f32], top_k: usize) -> SearchResponse;

    /// Delete items by id.
    async fn delete_item_batch(&self, index_name: &str, ids: &[String]) -> DeleteResponse;

    /// List all indexes in the service catalog.
    async fn list_indexes(&self) -> ListIndexesResponse;

    /// Drop an index and all its items.
    async fn drop_index(&self, index_name: &str) -> DropIndexResponse;
}

// ============================================================================
// ManagedVectorStore
// ============================================================================

/// Vector store over the managed index service.
pub struct ManagedVectorStore {
    client: Arc<dyn ManagedIndexClient>,
    embedder: Arc<dyn Embedder>,
    config: ManagedStoreConfig,
    descriptor: RwLock<IndexDescriptor>,
}

impl std::fmt::Debug for ManagedVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedVectorStore")
            .field("config", &self.config)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl ManagedVectorStore {
    /// Create a store over an existing client connection.
    pub fn new(
        client: Arc<dyn ManagedIndexClient>,
        embedder: Arc<dyn Embedder>,
        config: ManagedStoreConfig,
    ) -> Self {
        let descriptor = IndexDescriptor::unknown(&config.index_name);
        Self {
            client,
            embedder,
            config,
            descriptor: RwLock::new(descriptor),
        }
    }

    /// The service client this store drives.
    pub fn client(&self) -> &Arc<dyn ManagedIndexClient> {
        &self.client
    }

    /// Embed `texts` and store them as documents.
    ///
    /// When `metadatas` is per-text, its length must match `texts`.
    pub async fn from_texts(
        texts: Vec<String>,
        metadatas: Metadatas,
        client: Arc<dyn ManagedIndexClient>,
        embedder: Arc<dyn Embedder>,
        config: ManagedStoreConfig,
        ids: Option<Vec<String>>,
    ) -> StoreResult<Self> {
        validate_from_texts(&texts, &metadatas)?;

        let documents: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document::new(text.clone()).with_metadata(metadatas.for_index(i)))
            .collect();

        Self::from_documents(documents, client, embedder, config, ids).await
    }

    /// Embed `documents` and store them.
    pub async fn from_documents(
        documents: Vec<Document>,
        client: Arc<dyn ManagedIndexClient>,
        embedder: Arc<dyn Embedder>,
        config: ManagedStoreConfig,
        ids: Option<Vec<String>>,
    ) -> StoreResult<Self> {
        let store = Self::new(client, embedder, config);
        store.add_documents(documents, ids).await?;
        Ok(store)
    }

    /// Create the index if it does not already exist.
    ///
    /// Returns `true` if newly created, `false` if an index of that name
    /// already existed. The service ignores the requested dimensionality
    /// for a pre-existing index: the existing configuration wins and the
    /// call still returns `false`. Idempotent.
    pub async fn ensure_index_exists(&self, dimensions: usize) -> StoreResult<bool> {
        let response = self
            .client
            .create_index(&self.config.index_name, dimensions)
            .await;

        match response {
            CreateIndexResponse::Created => {
                debug!(
                    "Created index '{}' with {} dimensions",
                    self.config.index_name, dimensions
                );
                let mut descriptor = self.descriptor.write().await;
                *descriptor = IndexDescriptor::existing(&self.config.index_name, dimensions);
                Ok(true)
            }
            CreateIndexResponse::AlreadyExists => {
                let mut descriptor = self.descriptor.write().await;
                descriptor.exists = true;
                Ok(false)
            }
            CreateIndexResponse::Error(message) => Err(StoreError::backend(
                "create_index",
                &self.config.index_name,
                message,
            )),
        }
    }

    /// List the service's index catalog.
    pub async fn list_indexes(&self) -> StoreResult<Vec<IndexInfo>> {
        match self.client.list_indexes().await {
            ListIndexesResponse::Success(infos) => Ok(infos),
            ListIndexesResponse::Error(message) => Err(StoreError::backend(
                "list_indexes",
                &self.config.index_name,
                message,
            )),
        }
    }

    /// Drop the store's index. Used by the replace workflow.
    pub async fn drop_index(&self) -> StoreResult<()> {
        match self.client.drop_index(&self.config.index_name).await {
            DropIndexResponse::Success | DropIndexResponse::NotFound => {
                let mut descriptor = self.descriptor.write().await;
                *descriptor = IndexDescriptor::unknown(&self.config.index_name);
                Ok(())
            }
            DropIndexResponse::Error(message) => Err(StoreError::backend(
                "drop_index",
                &self.config.index_name,
                message,
            )),
        }
    }

    /// Fail with `IndexNotReady` unless the index is known (or found) to
    /// exist. Only consulted when ensure-on-write is disabled.
    async fn require_ready(&self) -> StoreResult<()> {
        if self.descriptor.read().await.exists {
            return Ok(());
        }

        let known = self
            .list_indexes()
            .await?
            .iter()
            .any(|info| info.name == self.config.index_name);
        if !known {
            return Err(StoreError::index_not_ready(&self.config.index_name));
        }

        let mut descriptor = self.descriptor.write().await;
        descriptor.exists = true;
        Ok(())
    }

    /// Convert one (vector, document, id) triple to the wire shape:
    /// metadata stringified, page content injected under the text field.
    fn prepare_item(&self, vector: Vec<f32>, document: &Document, id: String) -> StoreResult<UpsertItem> {
        let mut metadata = encode_metadata(&document.metadata)?;
        metadata.insert(
            self.config.text_field.clone(),
            document.page_content.clone(),
        );
        Ok(UpsertItem {
            id,
            vector,
            metadata,
        })
    }
}

#[async_trait]
impl VectorStore for ManagedVectorStore {
    async fn add_vectors(
        &self,
        vectors: Vec<Vec<f32>>,
        documents: Vec<Document>,
        ids: Option<Vec<String>>,
    ) -> StoreResult<Vec<String>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        validate_add_vectors(&vectors, &documents, ids.as_deref())?;

        if self.config.ensure_index_exists {
            self.ensure_index_exists(vectors[0].len()).await?;
        } else {
            self.require_ready().await?;
        }

        let ids: Vec<String> = match ids {
            Some(ids) => ids,
            None => (0..vectors.len())
                .map(|_| Uuid::new_v4().to_string())
                .collect(),
        };

        // Serialize every item up front: a bad metadata value fails the
        // call before anything is written.
        let mut items = Vec::with_capacity(vectors.len());
        for ((vector, document), id) in vectors.into_iter().zip(&documents).zip(&ids) {
            items.push(self.prepare_item(vector, document, id.clone())?);
        }

        for chunk in chunked(&items) {
            trace!(
                "Upserting chunk of {} items into '{}'",
                chunk.len(),
                self.config.index_name
            );
            let response = self
                .client
                .upsert_item_batch(&self.config.index_name, chunk.to_vec())
                .await;

            match response {
                UpsertResponse::Success => continue,
                UpsertResponse::Error(message) => {
                    // Chunks already acknowledged stay committed.
                    return Err(StoreError::backend(
                        "upsert",
                        &self.config.index_name,
                        message,
                    ));
                }
            }
        }

        Ok(ids)
    }

    async fn add_documents(
        &self,
        documents: Vec<Document>,
        ids: Option<Vec<String>>,
    ) -> StoreResult<Vec<String>> {
        let texts: Vec<String> = documents
            .iter()
            .map(|document| document.page_content.clone())
            .collect();
        let vectors = self.embedder.embed_documents(&texts).await?;
        self.add_vectors(vectors, documents, ids).await
    }

    async fn similarity_search_vector_with_score(
        &self,
        vector: &[f32],
        k: usize,
        _query_text: Option<&str>,
    ) -> StoreResult<Vec<SearchHit>> {
        validate_k(k)?;

        let response = self
            .client
            .search(&self.config.index_name, vector, k)
            .await;

        match response {
            SearchResponse::Success(hits) => Ok(hits
                .into_iter()
                .map(|hit| {
                    let (page_content, metadata) =
                        decode_metadata(&hit.metadata, &self.config.text_field);
                    SearchHit::new(
                        Document::new(page_content).with_metadata(metadata),
                        hit.score,
                    )
                })
                .collect()),
            SearchResponse::Error(message) => Err(StoreError::backend(
                "search",
                &self.config.index_name,
                message,
            )),
        }
    }

    async fn similarity_search(&self, query: &str, k: usize) -> StoreResult<Vec<Document>> {
        let vector = self.embedder.embed_query(query).await?;
        let hits = self
            .similarity_search_vector_with_score(&vector, k, Some(query))
            .await?;
        Ok(hits.into_iter().map(|hit| hit.document).collect())
    }

    async fn delete(&self, ids: &[String]) -> StoreResult<()> {
        match self
            .client
            .delete_item_batch(&self.config.index_name, ids)
            .await
        {
            DeleteResponse::Success => Ok(()),
            DeleteResponse::Error(message) => Err(StoreError::backend(
                "delete",
                &self.config.index_name,
                message,
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::memory::MemoryIndexClient;
    use simdex_core::{CoreResult, Metadata};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Embedder with a fixed text → vector table; unknown texts embed to
    /// the zero vector of the table's dimensionality.
    struct StubEmbedder {
        table: HashMap<String, Vec<f32>>,
        dimensions: usize,
    }

    impl StubEmbedder {
        fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            let dimensions = entries.first().map(|(_, v)| v.len()).unwrap_or(3);
            Self {
                table: entries
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.clone()))
                    .collect(),
                dimensions,
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    self.table
                        .get(text)
                        .cloned()
                        .unwrap_or_else(|| vec![0.0; self.dimensions])
                })
                .collect())
        }

        async fn embed_query(&self, text: &str) -> CoreResult<Vec<f32>> {
            Ok(self
                .table
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0; self.dimensions]))
        }
    }

    /// Client wrapper that records upsert chunk sizes and can fail a
    /// chosen upsert call.
    struct CountingClient {
        inner: MemoryIndexClient,
        upsert_sizes: Mutex<Vec<usize>>,
        calls: AtomicUsize,
        fail_on_upsert: Option<usize>,
    }

    impl CountingClient {
        fn new() -> Self {
            Self {
                inner: MemoryIndexClient::new(),
                upsert_sizes: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail_on_upsert: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                fail_on_upsert: Some(call),
                ..Self::new()
            }
        }

        fn total_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn upsert_sizes(&self) -> Vec<usize> {
            self.upsert_sizes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ManagedIndexClient for CountingClient {
        async fn create_index(&self, index_name: &str, dimensions: usize) -> CreateIndexResponse {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create_index(index_name, dimensions).await
        }

        async fn upsert_item_batch(
            &self,
            index_name: &str,
            items: Vec<UpsertItem>,
        ) -> UpsertResponse {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let call_number = {
                let mut sizes = self.upsert_sizes.lock().unwrap();
                sizes.push(items.len());
                sizes.len()
            };
            if self.fail_on_upsert == Some(call_number) {
                return UpsertResponse::Error("injected chunk failure".to_string());
            }
            self.inner.upsert_item_batch(index_name, items).await
        }

        async fn search(&self, index_name: &str, vector: &[f32], top_k: usize) -> SearchResponse {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.search(index_name, vector, top_k).await
        }

        async fn delete_item_batch(&self, index_name: &str, ids: &[String]) -> DeleteResponse {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_item_batch(index_name, ids).await
        }

        async fn list_indexes(&self) -> ListIndexesResponse {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_indexes().await
        }

        async fn drop_index(&self, index_name: &str) -> DropIndexResponse {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.drop_index(index_name).await
        }
    }

    fn store_over(client: Arc<dyn ManagedIndexClient>) -> ManagedVectorStore {
        ManagedVectorStore::new(
            client,
            Arc::new(StubEmbedder::new(&[
                ("cat", vec![1.0, 0.0, 0.0]),
                ("dog", vec![0.9, 0.1, 0.0]),
                ("submarine", vec![0.0, 0.0, 1.0]),
            ])),
            ManagedStoreConfig::new(),
        )
    }

    fn numbered_batch(n: usize) -> (Vec<Vec<f32>>, Vec<Document>, Vec<String>) {
        let vectors: Vec<Vec<f32>> = (0..n).map(|i| vec![i as f32, 1.0]).collect();
        let documents: Vec<Document> = (0..n).map(|i| Document::new(format!("doc {i}"))).collect();
        let ids: Vec<String> = (0..n).map(|i| format!("id-{i:04}")).collect();
        (vectors, documents, ids)
    }

    #[tokio::test]
    async fn test_add_and_search_round_trips_metadata() {
        let store = store_over(Arc::new(MemoryIndexClient::new()));

        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), serde_json::json!(7));
        metadata.insert("tags".to_string(), serde_json::json!(["a", "b"]));
        let document = Document::new("a cat sat").with_metadata(metadata.clone());

        let ids = store
            .add_vectors(vec![vec![1.0, 0.0, 0.0]], vec![document], None)
            .await
            .unwrap();
        assert_eq!(ids.len(), 1);

        let hits = store
            .similarity_search_vector_with_score(&[1.0, 0.0, 0.0], 1, None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.page_content, "a cat sat");
        assert_eq!(hits[0].document.metadata, metadata);
        assert!(hits[0].score > 0.99);
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_client_calls() {
        let client = Arc::new(CountingClient::new());
        let store = store_over(client.clone());

        let (vectors, _, _) = numbered_batch(2);
        let err = store
            .add_vectors(vectors, vec![Document::new("only one")], None)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation { .. }));
        assert_eq!(client.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_mixed_lengths_fail_before_any_call() {
        let client = Arc::new(CountingClient::new());
        let store = store_over(client.clone());

        let documents = vec![Document::new("a"), Document::new("b")];
        let err = store
            .add_vectors(vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]], documents, None)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation { .. }));
        assert_eq!(client.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_300_items_upsert_in_three_chunks() {
        let client = Arc::new(CountingClient::new());
        let store = store_over(client.clone());

        let (vectors, documents, ids) = numbered_batch(300);
        let written = store
            .add_vectors(vectors, documents, Some(ids.clone()))
            .await
            .unwrap();

        assert_eq!(written, ids);
        assert_eq!(client.upsert_sizes(), vec![128, 128, 44]);
    }

    #[tokio::test]
    async fn test_second_chunk_failure_is_partial() {
        let client = Arc::new(CountingClient::failing_on(2));
        let store = store_over(client.clone());

        let (vectors, documents, ids) = numbered_batch(300);
        let err = store
            .add_vectors(vectors, documents, Some(ids))
            .await
            .unwrap_err();

        match err {
            StoreError::Backend {
                operation, message, ..
            } => {
                assert_eq!(operation, "upsert");
                assert!(message.contains("injected chunk failure"));
            }
            other => panic!("expected backend error, got {other:?}"),
        }
        // Chunk 3 was never sent.
        assert_eq!(client.upsert_sizes(), vec![128, 128]);

        // Chunk 1 stays committed; chunks 2 and 3 are absent.
        let hits = store
            .similarity_search_vector_with_score(&[0.0, 1.0], 300, None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 128);
        let returned: std::collections::BTreeSet<String> = hits
            .iter()
            .map(|hit| hit.document.page_content.clone())
            .collect();
        assert!(returned.contains("doc 0"));
        assert!(returned.contains("doc 127"));
        assert!(!returned.contains("doc 128"));
        assert!(!returned.contains("doc 299"));
    }

    #[tokio::test]
    async fn test_ensure_index_exists_twice() {
        let store = store_over(Arc::new(MemoryIndexClient::new()));
        assert!(store.ensure_index_exists(768).await.unwrap());
        assert!(!store.ensure_index_exists(768).await.unwrap());
        // A differing dimension is ignored by the service: the existing
        // index wins and the call reports "already existed".
        assert!(!store.ensure_index_exists(1024).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_k_zero_is_invalid() {
        let store = store_over(Arc::new(MemoryIndexClient::new()));
        let err = store
            .similarity_search_vector_with_score(&[1.0, 0.0, 0.0], 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_search_empty_index_returns_empty() {
        let store = store_over(Arc::new(MemoryIndexClient::new()));
        store.ensure_index_exists(3).await.unwrap();

        let hits = store
            .similarity_search_vector_with_score(&[1.0, 0.0, 0.0], 5, None)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_from_search() {
        let store = store_over(Arc::new(MemoryIndexClient::new()));

        let (vectors, documents, ids) = numbered_batch(4);
        store
            .add_vectors(vectors, documents, Some(ids.clone()))
            .await
            .unwrap();

        store
            .delete(&[ids[0].clone(), ids[1].clone()])
            .await
            .unwrap();

        let hits = store
            .similarity_search_vector_with_score(&[0.0, 1.0], 10, None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        for hit in hits {
            assert_ne!(hit.document.page_content, "doc 0");
            assert_ne!(hit.document.page_content, "doc 1");
        }
    }

    #[tokio::test]
    async fn test_add_documents_embeds_and_searches() {
        let store = store_over(Arc::new(MemoryIndexClient::new()));

        let documents = vec![
            Document::new("cat"),
            Document::new("dog"),
            Document::new("submarine"),
        ];
        store.add_documents(documents, None).await.unwrap();

        let results = store.similarity_search("cat", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].page_content, "cat");
        assert_eq!(results[1].page_content, "dog");
    }

    #[tokio::test]
    async fn test_from_texts_metadata_count_mismatch() {
        let result = ManagedVectorStore::from_texts(
            vec!["a".to_string(), "b".to_string()],
            Metadatas::PerText(vec![Metadata::new()]),
            Arc::new(MemoryIndexClient::new()),
            Arc::new(StubEmbedder::new(&[("a", vec![1.0]), ("b", vec![2.0])])),
            ManagedStoreConfig::new(),
            None,
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Number of texts (2)"));
    }

    #[tokio::test]
    async fn test_from_texts_shared_metadata() {
        let mut shared = Metadata::new();
        shared.insert("source".to_string(), serde_json::json!("fixture"));

        let store = ManagedVectorStore::from_texts(
            vec!["a".to_string(), "b".to_string()],
            Metadatas::Shared(shared.clone()),
            Arc::new(MemoryIndexClient::new()),
            Arc::new(StubEmbedder::new(&[("a", vec![1.0]), ("b", vec![2.0])])),
            ManagedStoreConfig::new(),
            None,
        )
        .await
        .unwrap();

        let hits = store
            .similarity_search_vector_with_score(&[1.0], 2, None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        for hit in hits {
            assert_eq!(hit.document.metadata, shared);
        }
    }

    #[tokio::test]
    async fn test_write_without_ensure_fails_not_ready() {
        let client = Arc::new(CountingClient::new());
        let store = ManagedVectorStore::new(
            client.clone(),
            Arc::new(StubEmbedder::new(&[("a", vec![1.0])])),
            ManagedStoreConfig::new().with_ensure_index_exists(false),
        );

        let err = store
            .add_vectors(vec![vec![1.0]], vec![Document::new("a")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IndexNotReady { .. }));
        // Only the catalog lookup ran; nothing was written.
        assert!(client.upsert_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_drop_index_resets_descriptor() {
        let store = store_over(Arc::new(MemoryIndexClient::new()));
        store.ensure_index_exists(3).await.unwrap();
        store.drop_index().await.unwrap();
        // Recreating after a drop reports "newly created" again.
        assert!(store.ensure_index_exists(3).await.unwrap());
    }
}
