//! Mock implementations for testing.
//!
//! Stand-ins for the language model and the embedding model so pipeline and
//! API tests run without Ollama or ONNX weights.

use async_trait::async_trait;
use parking_lot::Mutex;
use pdfrag::llm::LLMClient;
use pdfrag::rag::embeddings::Embedder;
use pdfrag::types::{AppError, Result};
use std::sync::Arc;

/// Mock LLM client with a canned response.
///
/// Records the last prompt it received so tests can check what context the
/// pipeline assembled.
///
/// # Examples
///
/// ```ignore
/// let client = MockLLMClient::new("Hello, world!");
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    last_prompt: Arc<Mutex<Option<String>>>,
    last_system: Arc<Mutex<Option<String>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            last_prompt: Arc::new(Mutex::new(None)),
            last_system: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }

    pub fn last_system(&self) -> Option<String> {
        self.last_system.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        *self.last_prompt.lock() = Some(prompt.to_string());
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        *self.last_system.lock() = Some(system.to_string());
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Deterministic bag-of-words embedder.
///
/// Each word is hashed into one of `dimensions` buckets, so texts sharing
/// words have a high cosine similarity.
#[derive(Clone)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(17usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[hash % self.dimensions] += 1.0;
        }
        v
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}
