//! # simdex-db
//!
//! Infrastructure layer for simdex - vector store backends and hybrid
//! search.
//!
//! This crate provides the store implementations that are isolated from
//! the domain types in `simdex-core`. By separating these concerns:
//!
//! - Changes to `simdex-core` compile fast (no backend plumbing)
//! - Store backends can be swapped without changing domain logic
//! - Testing is easy with in-memory client implementations
//!
//! ## Architecture
//!
//! ```text
//! caller → VectorStore (trait)
//!              ↑
//!    ManagedVectorStore ── ManagedIndexClient (RPC seam)
//!    GraphVectorStore ──── GraphClient (query seam)
//!              ↑
//!         simdex-core (Document, Embedder)
//! ```
//!
//! ## Modules
//!
//! - `store`: the facade trait, codec, batching, search fusion, backends
//! - `error`: `StoreError` / `StoreResult`
//!
//! ## Usage
//!
//! ```ignore
//! use simdex_db::store::{ManagedStoreConfig, ManagedVectorStore, VectorStore};
//!
//! let store = ManagedVectorStore::new(client, embedder, ManagedStoreConfig::new());
//! let ids = store.add_documents(documents, None).await?;
//! let results = store.similarity_search("what is a cat", 5).await?;
//! ```

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
