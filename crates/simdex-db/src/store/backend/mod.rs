//! Store backend implementations.
//!
//! ## Available Backends
//!
//! - `managed`: managed vector index service driven over an RPC client
//! - `graph`: graph database with native vector + full-text indexes
//! - `memory`: in-process implementation of the managed client, for
//!   testing and small indexes

mod graph;
mod managed;
mod memory;

pub use graph::{GraphClient, GraphClientError, GraphVectorStore, Row};
pub use managed::{
    CreateIndexResponse, DeleteResponse, DropIndexResponse, IndexInfo, ListIndexesResponse,
    ManagedIndexClient, ManagedVectorStore, RawHit, SearchResponse, UpsertResponse,
};
pub use memory::MemoryIndexClient;
