//! # simdex-core
//!
//! Domain layer for simdex - the document model and the embedding seam.
//!
//! This crate holds the types every store backend shares, isolated from the
//! infrastructure implementations in `simdex-db`. By separating these
//! concerns:
//!
//! - Changes to store backends never ripple into the domain types
//! - Embedding providers can be swapped without touching storage code
//! - Testing is easy with fake `Embedder` implementations
//!
//! ## Architecture
//!
//! ```text
//! caller → simdex-db (stores) → (traits)
//!                ↑
//!          simdex-core (Document, Embedder)
//! ```
//!
//! ## Modules
//!
//! - `document`: the `Document` value type (page content + metadata)
//! - `embedding`: the `Embedder` collaborator trait
//! - `error`: `CoreError` / `CoreResult`

pub mod document;
pub mod embedding;
pub mod error;

pub use document::{Document, Metadata};
pub use embedding::Embedder;
pub use error::{CoreError, CoreResult};
