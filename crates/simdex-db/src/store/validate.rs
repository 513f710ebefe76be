//! Boundary validation shared by every backend.
//!
//! All checks here run before any client call, so a failure never leaves
//! partial backend state. Messages carry the literal mismatching values.

use crate::error::{StoreError, StoreResult};
use simdex_core::{Document, Metadata};

/// Validate the shape of an `add_vectors` batch.
///
/// Checks, in order:
/// - vector count equals document count,
/// - all vectors have the same length,
/// - when ids are supplied, their count equals the vector count.
pub fn validate_add_vectors(
    vectors: &[Vec<f32>],
    documents: &[Document],
    ids: Option<&[String]>,
) -> StoreResult<()> {
    if documents.len() != vectors.len() {
        return Err(StoreError::validation(format!(
            "Number of vectors ({}) does not equal number of documents ({})",
            vectors.len(),
            documents.len()
        )));
    }

    if let Some(first) = vectors.first() {
        for vector in &vectors[1..] {
            if vector.len() != first.len() {
                return Err(StoreError::validation(format!(
                    "All vectors must have the same length: expected {}, got {}",
                    first.len(),
                    vector.len()
                )));
            }
        }
    }

    if let Some(ids) = ids {
        if ids.len() != vectors.len() {
            return Err(StoreError::validation(format!(
                "Number of ids ({}) does not equal number of vectors ({})",
                ids.len(),
                vectors.len()
            )));
        }
    }

    Ok(())
}

/// Per-text metadata for `from_texts` construction.
///
/// Either one metadata object per text, or a single object shared by all.
#[derive(Debug, Clone)]
pub enum Metadatas {
    /// One metadata map per text; counts must match.
    PerText(Vec<Metadata>),
    /// A single map applied to every text.
    Shared(Metadata),
}

impl Metadatas {
    /// Resolve the metadata for text `index`.
    pub fn for_index(&self, index: usize) -> Metadata {
        match self {
            Metadatas::PerText(list) => list.get(index).cloned().unwrap_or_default(),
            Metadatas::Shared(map) => map.clone(),
        }
    }
}

/// Validate `from_texts` inputs: when metadatas is a list, its length
/// must match the texts. A single shared map skips the check.
pub fn validate_from_texts(texts: &[String], metadatas: &Metadatas) -> StoreResult<()> {
    if let Metadatas::PerText(list) = metadatas {
        if list.len() != texts.len() {
            return Err(StoreError::validation(format!(
                "Number of texts ({}) does not equal number of metadatas ({})",
                texts.len(),
                list.len()
            )));
        }
    }
    Ok(())
}

/// Validate the result count for a search.
pub fn validate_k(k: usize) -> StoreResult<()> {
    if k == 0 {
        return Err(StoreError::invalid_argument(
            "k must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
