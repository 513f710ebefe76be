//! The document value type shared by every store backend.

use serde::{Deserialize, Serialize};

/// Open key/value metadata attached to a document.
///
/// Values are arbitrary JSON; each backend decides how to persist them
/// (flat string map or typed properties).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// An immutable piece of text plus its metadata.
///
/// A `Document` has no identity of its own - position in a batch, or an
/// explicitly supplied id, identifies it. Updates are modeled as
/// delete-by-id followed by re-insert, never in-place mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The text content of the document.
    pub page_content: String,

    /// Open metadata map.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Set the metadata map.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Insert a single metadata entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
