//! # PDF RAG Server
//!
//! An HTTP assistant that indexes uploaded PDF documents and answers questions
//! with a local language model grounded on their content.
//!
//! ## Overview
//!
//! The server is a thin orchestration layer over mature engines:
//!
//! | Concern | Engine |
//! |---------|--------|
//! | PDF loading | `pdf-extract` |
//! | Chunking | `text-splitter` |
//! | Embeddings | `fastembed` (default) or Ollama |
//! | Vector store | `ares-vector` (default) or in-memory |
//! | Generation | Ollama via `ollama-rs` |
//!
//! It can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `pdfrag-server` binary
//! 2. **As a library** - Build a [`RagPipeline`] and call it directly
//!
//! ### Library Example
//!
//! ```rust,ignore
//! use pdfrag::{ConfigManager, RagPipeline};
//! use std::sync::Arc;
//!
//! let config_manager = Arc::new(ConfigManager::new("pdfrag.toml")?);
//! let pipeline = RagPipeline::from_config(config_manager).await?;
//!
//! pipeline.ingest_pdf("manual.pdf", std::fs::read("manual.pdf")?).await?;
//! let answer = pipeline.ask("How do I reset the device?").await?;
//! println!("{}", answer.answer);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama chat and embeddings (default) |
//! | `ares-vector` | Embedded HNSW vector store (default) |
//! | `local-embeddings` | fastembed ONNX embeddings (default) |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui/` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`db`] - Vector store abstraction
//! - [`llm`] - LLM client implementations
//! - [`rag`] - PDF loading, chunking, embeddings and the RAG pipeline
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Vector stores.
pub mod db;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use api::routes::create_app;
pub use llm::{LLMClient, Provider};
pub use rag::{IngestReport, RagPipeline};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, PdfRagConfig};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Ingestion and question-answering pipeline
    pub rag: Arc<RagPipeline>,
}

impl AppState {
    pub fn new(rag: RagPipeline) -> Self {
        Self {
            config_manager: Arc::clone(rag.config_manager()),
            rag: Arc::new(rag),
        }
    }
}
