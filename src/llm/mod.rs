//! LLM Provider Clients
//!
//! - [`LLMClient`] - The trait the RAG pipeline generates through
//! - [`Provider`] - Runtime provider selection built from the `[llm]` config section
//!
//! # Example
//!
//! ```ignore
//! use pdfrag::llm::Provider;
//!
//! let client = Provider::from_config(&config.llm).create_client()?;
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider};

#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;
