//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! # Module Structure
//!
//! - [`rag::loader`](crate::rag::loader) - Per-page text extraction from PDF bytes
//! - [`rag::chunker`](crate::rag::chunker) - Character chunks with overlap
//! - [`rag::embeddings`](crate::rag::embeddings) - Dense embedding providers (fastembed, Ollama)
//! - [`rag::prompt`](crate::rag::prompt) - Prompt template and answer cleanup
//! - [`rag::pipeline`](crate::rag::pipeline) - Ingestion and question answering
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - Uploaded PDF is saved, split into pages, chunked and embedded
//! 2. **Storage** - Embeddings stored in the vector store with source and page
//! 3. **Retrieval** - Query embedded, chunks above the score threshold retrieved
//! 4. **Generation** - LLM answers from the retrieved context
//!
//! # Example
//!
//! ```ignore
//! use pdfrag::rag::pipeline::RagPipeline;
//!
//! let pipeline = RagPipeline::from_config(config_manager).await?;
//! let report = pipeline.ingest_pdf("manual.pdf", bytes).await?;
//! let answer = pipeline.ask("How do I reset the device?").await?;
//! ```

pub mod chunker;
pub mod embeddings;
pub mod loader;
pub mod pipeline;
pub mod prompt;

pub use pipeline::{IngestReport, RagPipeline};
