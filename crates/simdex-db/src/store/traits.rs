//! The vector store facade trait.

use super::types::SearchHit;
use crate::error::StoreResult;
use async_trait::async_trait;
use simdex_core::Document;

/// Uniform contract every store backend implements.
///
/// A store owns its backend connection and an
/// [`Embedder`](simdex_core::Embedder), and is driven by a single logical
/// caller issuing operations sequentially. Operations are self-contained;
/// the only state carried between calls is the cached index descriptor.
///
/// ## Implementation Notes
///
/// - Shape validation (counts, vector lengths, id counts) happens at this
///   boundary, before any network call.
/// - Writes are non-atomic: a failed batch leaves every chunk before the
///   failure committed.
/// - `search` results are ranked best-first under the index's distance
///   strategy.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Write embedding vectors and their documents to the index.
    ///
    /// When `ids` is `None`, a random unique id is generated per item.
    /// Returns the ids actually written, in input order. An empty batch
    /// is a successful no-op.
    async fn add_vectors(
        &self,
        vectors: Vec<Vec<f32>>,
        documents: Vec<Document>,
        ids: Option<Vec<String>>,
    ) -> StoreResult<Vec<String>>;

    /// Embed the documents' page contents, then delegate to
    /// [`add_vectors`](Self::add_vectors).
    async fn add_documents(
        &self,
        documents: Vec<Document>,
        ids: Option<Vec<String>>,
    ) -> StoreResult<Vec<String>>;

    /// Nearest-neighbor search by query vector.
    ///
    /// `query_text` feeds the keyword side of hybrid search; backends
    /// without a keyword index ignore it. Returns at most `k` hits,
    /// best-first. Fails with `InvalidArgument` when `k == 0`; an empty
    /// index yields an empty result, not an error.
    async fn similarity_search_vector_with_score(
        &self,
        vector: &[f32],
        k: usize,
        query_text: Option<&str>,
    ) -> StoreResult<Vec<SearchHit>>;

    /// Embed the query text, then search. Drops scores.
    async fn similarity_search(&self, query: &str, k: usize) -> StoreResult<Vec<Document>>;

    /// Delete items by id. Deleted ids never appear in later searches.
    async fn delete(&self, ids: &[String]) -> StoreResult<()>;
}
