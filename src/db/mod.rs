//! Vector storage for document chunks.
//!
//! - `ares-vector` (default) - Pure Rust embedded HNSW vector database, persisted to disk
//! - in-memory - brute-force cosine search, nothing persisted
//!
//! Select the backend with `rag.vector_store` in `pdfrag.toml`.

#![allow(missing_docs)]

pub mod vectorstore;

#[cfg(feature = "ares-vector")]
pub mod ares_vector;

pub use vectorstore::{
    CollectionInfo, CollectionStats, InMemoryVectorStore, VectorStore, VectorStoreProvider,
};

#[cfg(feature = "ares-vector")]
pub use ares_vector::AresVectorStore;
