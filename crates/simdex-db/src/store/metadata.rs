//! Metadata codec for the managed index backend.
//!
//! The managed service only accepts flat string-valued metadata maps, so
//! every value is serialized to JSON text on the way in and parsed back on
//! the way out. The reserved text field carries the page content and is
//! excluded from the decoded metadata map.
//!
//! Round-trip law: `decode(encode(m)) == m` for any JSON metadata map `m`.

use crate::error::StoreResult;
use simdex_core::Metadata;
use std::collections::BTreeMap;

/// Serialize every metadata value to JSON text.
///
/// A value that cannot be serialized fails the whole call before anything
/// is written.
pub fn encode_metadata(metadata: &Metadata) -> StoreResult<BTreeMap<String, String>> {
    let mut encoded = BTreeMap::new();
    for (key, value) in metadata {
        encoded.insert(key.clone(), serde_json::to_string(value)?);
    }
    Ok(encoded)
}

/// Reverse [`encode_metadata`], splitting out the reserved text field.
///
/// Returns the page content (empty string when the text field is absent)
/// and the decoded metadata map with the text field removed. A value that
/// does not parse as JSON is kept verbatim as a JSON string, so hits
/// written by foreign clients still decode.
pub fn decode_metadata(
    encoded: &BTreeMap<String, String>,
    text_field: &str,
) -> (String, Metadata) {
    let page_content = encoded.get(text_field).cloned().unwrap_or_default();

    let mut metadata = Metadata::new();
    for (key, value) in encoded {
        if key == text_field {
            continue;
        }
        let parsed = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.clone()));
        metadata.insert(key.clone(), parsed);
    }

    (page_content, metadata)
}

// ============================================================================
// Tests
// ============================================================================
