//! The embedding seam.
//!
//! Stores consume an [`Embedder`] to turn text into vectors; nothing in
//! this workspace implements a real model. Providers live in downstream
//! crates (or in test fakes) and are passed in at store construction.

use crate::error::CoreResult;
use async_trait::async_trait;

/// A provider that turns text into fixed-length embedding vectors.
///
/// ## Implementation Notes
///
/// - All texts embedded by one provider instance must produce vectors of
///   identical length; stores discover index dimensionality from the
///   first batch.
/// - Implementations should be cheap to share behind an `Arc`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of document texts, one vector per text, in order.
    async fn embed_documents(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> CoreResult<Vec<f32>>;
}
