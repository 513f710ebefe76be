//! Graph database backend with vector and full-text indexing.
//!
//! The database is driven through an opaque parameterized-query client
//! (Cypher-style statements). Documents live as labeled nodes: the text
//! and embedding are node properties, metadata is stored as typed
//! properties on the same node. Vector search goes through the native
//! vector index; hybrid search additionally queries the full-text index
//! and fuses the two ranked lists client-side (see
//! [`search`](crate::store::search) for the fusion policy).
//!
//! Index lifecycle: the vector index is discovered from the backend
//! catalog or created with the dimensionality of the first batch of
//! vectors. The full-text index is looked up by name or by covered
//! properties and only created when no match exists.

use crate::error::{StoreError, StoreResult};
use crate::store::batch::chunked;
use crate::store::config::GraphStoreConfig;
use crate::store::search::{fuse_hybrid, RankedHit};
use crate::store::traits::VectorStore;
use crate::store::types::{IndexDescriptor, SearchHit, SearchType};
use crate::store::validate::{
    validate_add_vectors, validate_from_texts, validate_k, Metadatas,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use simdex_core::{Document, Embedder, Metadata};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Nodes fetched per round when backfilling embeddings over an existing
/// graph.
const BACKFILL_BATCH_SIZE: usize = 1000;

// ============================================================================
// Client seam
// ============================================================================

/// A result row: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

/// Failure reported by the graph client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphClientError {
    /// The database reported an error.
    #[error("{0}")]
    Failed(String),
    /// The host environment cancelled the call. Statements already
    /// acknowledged remain committed.
    #[error("query cancelled")]
    Cancelled,
}

/// The graph database, as the store sees it: an executor of
/// parameterized statements.
///
/// Implementations own the session/driver; the store never constructs
/// statements from un-parameterized user data except for identifiers
/// (labels, property keys, index names), which come from configuration.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Run one statement and return its rows.
    async fn query(&self, statement: &str, params: Value) -> Result<Vec<Row>, GraphClientError>;

    /// Cheap connectivity probe, run once at store construction.
    async fn verify_connectivity(&self) -> Result<(), GraphClientError>;

    /// Close the underlying connection. Called at most once by the store.
    async fn close(&self);
}

// ============================================================================
// GraphVectorStore
// ============================================================================

/// Vector store over a graph database with vector + full-text indexes.
pub struct GraphVectorStore {
    client: Arc<dyn GraphClient>,
    embedder: Arc<dyn Embedder>,
    config: GraphStoreConfig,
    descriptor: RwLock<IndexDescriptor>,
    closed: AtomicBool,
}

impl std::fmt::Debug for GraphVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphVectorStore")
            .field("config", &self.config)
            .field("descriptor", &self.descriptor)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl GraphVectorStore {
    /// Connect a store over an existing client.
    ///
    /// Verifies connectivity; when `pre_delete_collection` is set, drops
    /// the existing index and its nodes first (the replace workflow).
    pub async fn initialize(
        client: Arc<dyn GraphClient>,
        embedder: Arc<dyn Embedder>,
        config: GraphStoreConfig,
    ) -> StoreResult<Self> {
        client
            .verify_connectivity()
            .await
            .map_err(|e| map_client_error(e, "verify_connectivity", &config.index_name))?;

        let store = Self {
            descriptor: RwLock::new(IndexDescriptor::unknown(&config.index_name)),
            client,
            embedder,
            config,
            closed: AtomicBool::new(false),
        };

        if store.config.pre_delete_collection {
            store.drop_index().await?;
        }

        Ok(store)
    }

    /// Embed `texts` and store them as documents.
    pub async fn from_texts(
        texts: Vec<String>,
        metadatas: Metadatas,
        client: Arc<dyn GraphClient>,
        embedder: Arc<dyn Embedder>,
        config: GraphStoreConfig,
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
        client: Arc<dyn GraphClient>,
        embedder: Arc<dyn Embedder>,
        config: GraphStoreConfig,
        ids: Option<Vec<String>>,
    ) -> StoreResult<Self> {
        let store = Self::initialize(client, embedder, config).await?;
        store.add_documents(documents, ids).await?;
        Ok(store)
    }

    /// Open a store over an index that must already exist.
    ///
    /// Fails with `IndexNotFound` when the catalog has no such vector
    /// index; with hybrid search configured, the keyword index must exist
    /// too.
    pub async fn from_existing_index(
        client: Arc<dyn GraphClient>,
        embedder: Arc<dyn Embedder>,
        config: GraphStoreConfig,
    ) -> StoreResult<Self> {
        let store = Self::initialize(client, embedder, config).await?;

        let dimensions = store
            .retrieve_existing_index()
            .await?
            .ok_or_else(|| StoreError::index_not_found(&store.config.index_name))?;

        if store.config.search_type == SearchType::Hybrid {
            let candidates = vec![store.config.text_node_property.clone()];
            store
                .retrieve_existing_keyword_index(&candidates)
                .await?
                .ok_or_else(|| StoreError::index_not_found(&store.config.keyword_index_name))?;
        }

        let mut descriptor = store.descriptor.write().await;
        *descriptor = IndexDescriptor::existing(&store.config.index_name, dimensions);
        drop(descriptor);

        Ok(store)
    }

    /// Adopt an existing graph of nodes that carry text but not yet
    /// embeddings.
    ///
    /// Discovers or creates the vector (and, for hybrid, keyword) index
    /// over `text_node_properties`, then walks the graph in fetch batches
    /// embedding nodes whose embedding property is still null.
    pub async fn from_existing_graph(
        client: Arc<dyn GraphClient>,
        embedder: Arc<dyn Embedder>,
        config: GraphStoreConfig,
        text_node_properties: Vec<String>,
    ) -> StoreResult<Self> {
        if text_node_properties.is_empty() {
            return Err(StoreError::invalid_argument(
                "text_node_properties must not be empty".to_string(),
            ));
        }

        let store = Self::initialize(client, embedder, config).await?;

        // Probe dimensionality once; index creation needs it before any
        // node is embedded.
        let probe = store.embedder.embed_query("dimension probe").await?;
        store.ensure_ready(probe.len()).await?;

        if store.config.search_type == SearchType::Hybrid {
            store.ensure_keyword_index(&text_node_properties).await?;
        }

        loop {
            let fetched = store.backfill_batch(&text_node_properties).await?;
            if fetched < BACKFILL_BATCH_SIZE {
                break;
            }
        }

        Ok(store)
    }

    /// Close the backend connection. Repeated calls are no-ops.
    pub async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Closing graph client for index '{}'", self.config.index_name);
            self.client.close().await;
        }
    }

    // ------------------------------------------------------------------------
    // Index lifecycle
    // ------------------------------------------------------------------------

    /// Create the vector index with the declared dimensionality.
    pub async fn create_new_index(&self, dimensions: usize) -> StoreResult<()> {
        info!(
            "Creating vector index '{}' ({} dims, {})",
            self.config.index_name, dimensions, self.config.distance_strategy
        );
        self.run(
            "create_index",
            "CALL db.index.vector.createNodeIndex($indexName, $nodeLabel, \
             $embeddingProperty, toInteger($dimensions), $similarityFunction)",
            json!({
                "indexName": self.config.index_name,
                "nodeLabel": self.config.node_label,
                "embeddingProperty": self.config.embedding_node_property,
                "dimensions": dimensions,
                "similarityFunction": self.config.distance_strategy.as_str(),
            }),
        )
        .await?;
        Ok(())
    }

    /// Look the vector index up in the backend catalog and return its
    /// configured dimensionality, or `None` when absent.
    ///
    /// Matches by index name, or by node label + embedding property for
    /// indexes created out-of-band under a different name.
    pub async fn retrieve_existing_index(&self) -> StoreResult<Option<usize>> {
        let rows = self
            .run(
                "retrieve_index",
                "SHOW INDEXES YIELD name, type, labelsOrTypes, properties, options \
                 WHERE type = 'VECTOR' AND (name = $indexName \
                 OR (labelsOrTypes[0] = $nodeLabel AND properties[0] = $embeddingProperty)) \
                 RETURN name, options",
                json!({
                    "indexName": self.config.index_name,
                    "nodeLabel": self.config.node_label,
                    "embeddingProperty": self.config.embedding_node_property,
                }),
            )
            .await?;

        // Prefer the row matching the configured name when several match.
        let row = rows
            .iter()
            .find(|row| row_string(row, "name") == self.config.index_name)
            .or_else(|| rows.first());

        let Some(row) = row else {
            return Ok(None);
        };

        let dimensions = row
            .get("options")
            .and_then(|options| options.get("indexConfig"))
            .and_then(|config| config.get("vector.dimensions"))
            .and_then(Value::as_u64)
            .map(|dims| dims as usize);

        trace!(
            "Catalog lookup for '{}' found dimensions {:?}",
            self.config.index_name,
            dimensions
        );
        Ok(dimensions)
    }

    /// Look up a full-text index covering the candidate text properties.
    ///
    /// Returns the index name to query, or `None` when no existing index
    /// matches by name or by covered properties.
    pub async fn retrieve_existing_keyword_index(
        &self,
        candidate_properties: &[String],
    ) -> StoreResult<Option<String>> {
        let rows = self
            .run(
                "retrieve_keyword_index",
                "SHOW INDEXES YIELD name, type, labelsOrTypes, properties \
                 WHERE type = 'FULLTEXT' AND (name = $keywordIndexName \
                 OR (labelsOrTypes = [$nodeLabel] AND properties = $textProperties)) \
                 RETURN name, properties",
                json!({
                    "keywordIndexName": self.config.keyword_index_name,
                    "nodeLabel": self.config.node_label,
                    "textProperties": candidate_properties,
                }),
            )
            .await?;

        let row = rows
            .iter()
            .find(|row| row_string(row, "name") == self.config.keyword_index_name)
            .or_else(|| rows.first());

        Ok(row.map(|row| row_string(row, "name")))
    }

    /// Create the full-text index over `properties` unless a matching one
    /// already exists (creation is skipped, not duplicated).
    pub async fn create_keyword_index(&self, properties: &[String]) -> StoreResult<()> {
        if let Some(existing) = self.retrieve_existing_keyword_index(properties).await? {
            debug!("Keyword index '{}' already covers the text properties", existing);
            return Ok(());
        }

        info!("Creating keyword index '{}'", self.config.keyword_index_name);
        self.run(
            "create_keyword_index",
            "CALL db.index.fulltext.createNodeIndex($keywordIndexName, \
             [$nodeLabel], $textProperties)",
            json!({
                "keywordIndexName": self.config.keyword_index_name,
                "nodeLabel": self.config.node_label,
                "textProperties": properties,
            }),
        )
        .await?;
        Ok(())
    }

    /// Drop the vector index and delete its nodes. Returns the store to
    /// the uninitialized state; not reversible.
    pub async fn drop_index(&self) -> StoreResult<()> {
        info!("Dropping index '{}' and its nodes", self.config.index_name);
        self.run(
            "drop_index",
            &format!(
                "MATCH (n:`{}`) CALL {{ WITH n DETACH DELETE n }} \
                 IN TRANSACTIONS OF 10000 ROWS",
                self.config.node_label
            ),
            json!({}),
        )
        .await?;
        self.run(
            "drop_index",
            &format!("DROP INDEX `{}` IF EXISTS", self.config.index_name),
            json!({}),
        )
        .await?;

        let mut descriptor = self.descriptor.write().await;
        *descriptor = IndexDescriptor::unknown(&self.config.index_name);
        Ok(())
    }

    /// Make the vector index Ready for a batch of `dimensions`-length
    /// vectors: use the cached descriptor, else discover from the
    /// catalog, else create.
    ///
    /// A discovered index whose configured dimensionality differs from
    /// the batch fails the call - querying across a dimension mismatch
    /// would rank garbage.
    async fn ensure_ready(&self, dimensions: usize) -> StoreResult<()> {
        {
            let descriptor = self.descriptor.read().await;
            if descriptor.exists {
                if let Some(existing) = descriptor.dimensions {
                    if existing != dimensions {
                        return Err(StoreError::backend(
                            "ensure_index",
                            &self.config.index_name,
                            format!(
                                "existing index has {existing} dimensions, batch has {dimensions}"
                            ),
                        ));
                    }
                }
                return Ok(());
            }
        }

        let discovered = self.retrieve_existing_index().await?;
        match discovered {
            Some(existing) if existing != dimensions => {
                return Err(StoreError::backend(
                    "ensure_index",
                    &self.config.index_name,
                    format!("existing index has {existing} dimensions, batch has {dimensions}"),
                ));
            }
            Some(_) => {}
            None => self.create_new_index(dimensions).await?,
        }

        let mut descriptor = self.descriptor.write().await;
        *descriptor = IndexDescriptor::existing(&self.config.index_name, dimensions);
        Ok(())
    }

    /// Ensure the keyword index exists for hybrid search.
    async fn ensure_keyword_index(&self, properties: &[String]) -> StoreResult<()> {
        self.create_keyword_index(properties).await
    }

    /// Fail with `IndexNotReady` unless the index is cached or
    /// discoverable.
    async fn require_ready(&self) -> StoreResult<()> {
        if self.descriptor.read().await.exists {
            return Ok(());
        }

        match self.retrieve_existing_index().await? {
            Some(dimensions) => {
                let mut descriptor = self.descriptor.write().await;
                *descriptor = IndexDescriptor::existing(&self.config.index_name, dimensions);
                Ok(())
            }
            None => Err(StoreError::index_not_ready(&self.config.index_name)),
        }
    }

    // ------------------------------------------------------------------------
    // Query plumbing
    // ------------------------------------------------------------------------

    async fn run(&self, operation: &str, statement: &str, params: Value) -> StoreResult<Vec<Row>> {
        trace!("Running {} against '{}'", operation, self.config.index_name);
        self.client
            .query(statement, params)
            .await
            .map_err(|e| map_client_error(e, operation, &self.config.index_name))
    }

    /// Return clause shared by both search modalities. The configured
    /// `retrieval_query` overrides it verbatim.
    fn retrieval_clause(&self) -> String {
        match &self.config.retrieval_query {
            Some(query) => query.clone(),
            None => format!(
                "RETURN node.id AS id, node.`{text}` AS text, score, \
                 node {{ .*, `{text}`: Null, `{embedding}`: Null, id: Null }} AS metadata",
                text = self.config.text_node_property,
                embedding = self.config.embedding_node_property,
            ),
        }
    }

    async fn vector_query(&self, vector: &[f32], k: usize) -> StoreResult<Vec<Row>> {
        self.run(
            "search",
            &format!(
                "CALL db.index.vector.queryNodes($indexName, toInteger($k), $embedding) \
                 YIELD node, score {}",
                self.retrieval_clause()
            ),
            json!({
                "indexName": self.config.index_name,
                "k": k,
                "embedding": vector,
            }),
        )
        .await
    }

    async fn keyword_query(&self, query_text: &str, k: usize) -> StoreResult<Vec<Row>> {
        self.run(
            "keyword_search",
            &format!(
                "CALL db.index.fulltext.queryNodes($keywordIndexName, $query, \
                 {{limit: toInteger($k)}}) YIELD node, score {}",
                self.retrieval_clause()
            ),
            json!({
                "keywordIndexName": self.config.keyword_index_name,
                "query": query_text,
                "k": k,
            }),
        )
        .await
    }

    /// Write one chunk of rows: merge on id, set text + embedding, merge
    /// the typed metadata properties.
    async fn write_chunk(&self, rows: &[Value]) -> StoreResult<()> {
        trace!(
            "Writing chunk of {} rows to label '{}'",
            rows.len(),
            self.config.node_label
        );
        self.run(
            "upsert",
            &format!(
                "UNWIND $rows AS row \
                 MERGE (c:`{label}` {{id: row.id}}) \
                 WITH c, row \
                 SET c.`{embedding}` = row.embedding, c.`{text}` = row.text \
                 SET c += row.metadata",
                label = self.config.node_label,
                embedding = self.config.embedding_node_property,
                text = self.config.text_node_property,
            ),
            json!({ "rows": rows }),
        )
        .await?;
        Ok(())
    }

    /// Embed one batch of not-yet-embedded nodes; returns how many were
    /// fetched.
    async fn backfill_batch(&self, text_node_properties: &[String]) -> StoreResult<usize> {
        let rows = self
            .run(
                "backfill_fetch",
                &format!(
                    "MATCH (n:`{label}`) \
                     WHERE n.`{embedding}` IS null \
                     AND any(p IN $textProperties WHERE n[p] IS NOT null) \
                     RETURN elementId(n) AS id, \
                     reduce(acc = '', p IN $textProperties | \
                     acc + '\\n' + p + ': ' + coalesce(n[p], '')) AS text \
                     LIMIT toInteger($limit)",
                    label = self.config.node_label,
                    embedding = self.config.embedding_node_property,
                ),
                json!({
                    "textProperties": text_node_properties,
                    "limit": BACKFILL_BATCH_SIZE,
                }),
            )
            .await?;

        if rows.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = rows.iter().map(|row| row_string(row, "text")).collect();
        let vectors = self.embedder.embed_documents(&texts).await?;

        let data: Vec<Value> = rows
            .iter()
            .zip(&vectors)
            .map(|(row, vector)| json!({ "id": row_string(row, "id"), "embedding": vector }))
            .collect();

        debug!("Backfilling embeddings for {} nodes", data.len());
        self.run(
            "backfill_write",
            &format!(
                "UNWIND $data AS row MATCH (n) WHERE elementId(n) = row.id \
                 SET n.`{embedding}` = row.embedding",
                embedding = self.config.embedding_node_property,
            ),
            json!({ "data": data }),
        )
        .await?;

        Ok(rows.len())
    }

    fn row_to_hit(&self, row: &Row) -> SearchHit {
        let text = row_string(row, "text");
        let metadata = row_metadata(row, "metadata");
        SearchHit::new(
            Document::new(text).with_metadata(metadata),
            row_f32(row, "score"),
        )
    }
}

#[async_trait]
impl VectorStore for GraphVectorStore {
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
            self.ensure_ready(vectors[0].len()).await?;
            if self.config.search_type == SearchType::Hybrid {
                let candidates = vec![self.config.text_node_property.clone()];
                self.ensure_keyword_index(&candidates).await?;
            }
        } else {
            self.require_ready().await?;
        }

        let ids: Vec<String> = match ids {
            Some(ids) => ids,
            None => (0..vectors.len())
                .map(|_| Uuid::new_v4().to_string())
                .collect(),
        };

        let rows: Vec<Value> = vectors
            .into_iter()
            .zip(&documents)
            .zip(&ids)
            .map(|((vector, document), id)| {
                json!({
                    "id": id,
                    "text": document.page_content,
                    "embedding": vector,
                    "metadata": Value::Object(document.metadata.clone()),
                })
            })
            .collect();

        for chunk in chunked(&rows) {
            // First failing chunk aborts; earlier chunks stay committed.
            self.write_chunk(chunk).await?;
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
        query_text: Option<&str>,
    ) -> StoreResult<Vec<SearchHit>> {
        validate_k(k)?;
        // Local precondition: hybrid needs the raw query text before any
        // network call is issued.
        if self.config.search_type == SearchType::Hybrid && query_text.is_none() {
            return Err(StoreError::invalid_argument(
                "hybrid search requires query_text".to_string(),
            ));
        }
        self.require_ready().await?;

        let vector_rows = self.vector_query(vector, k).await?;

        match self.config.search_type {
            SearchType::Vector => Ok(vector_rows
                .iter()
                .map(|row| self.row_to_hit(row))
                .collect()),
            SearchType::Hybrid => {
                let query_text = query_text.unwrap_or_default();

                let keyword_rows = self.keyword_query(query_text, k).await?;

                let mut documents: HashMap<String, &Row> = HashMap::new();
                let vector_hits: Vec<RankedHit> = vector_rows
                    .iter()
                    .map(|row| {
                        let id = row_string(row, "id");
                        documents.entry(id.clone()).or_insert(row);
                        (id, row_f32(row, "score"))
                    })
                    .collect();
                let keyword_hits: Vec<RankedHit> = keyword_rows
                    .iter()
                    .map(|row| {
                        let id = row_string(row, "id");
                        documents.entry(id.clone()).or_insert(row);
                        (id, row_f32(row, "score"))
                    })
                    .collect();

                let fused = fuse_hybrid(&vector_hits, &keyword_hits, k);
                Ok(fused
                    .into_iter()
                    .filter_map(|(id, score)| {
                        documents.get(id.as_str()).map(|row| {
                            let mut hit = self.row_to_hit(row);
                            hit.score = score;
                            hit
                        })
                    })
                    .collect())
            }
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
        debug!("Deleting {} nodes from '{}'", ids.len(), self.config.node_label);
        self.run(
            "delete",
            &format!(
                "MATCH (n:`{}`) WHERE n.id IN $ids DETACH DELETE n",
                self.config.node_label
            ),
            json!({ "ids": ids }),
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// Row helpers
// ============================================================================

fn map_client_error(error: GraphClientError, operation: &str, index: &str) -> StoreError {
    match error {
        GraphClientError::Cancelled => StoreError::Cancelled,
        GraphClientError::Failed(message) => StoreError::backend(operation, index, message),
    }
}

fn row_string(row: &Row, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn row_f32(row: &Row, key: &str) -> f32 {
    row.get(key).and_then(Value::as_f64).unwrap_or_default() as f32
}

/// Extract a metadata object, dropping null-valued keys (the retrieval
/// clause nulls out the reserved text/embedding/id properties).
fn row_metadata(row: &Row, key: &str) -> Metadata {
    match row.get(key) {
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        _ => Metadata::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
