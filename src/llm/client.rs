//! LLM client abstraction
//!
//! Generation is served by a local Ollama instance. The [`LLMClient`] trait
//! keeps the pipeline independent of the provider so tests can substitute a
//! mock.

use crate::types::Result;
use crate::utils::toml_config::{LlmConfig, LlmProviderKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// # Example
/// ```rust,ignore
/// let provider = Provider::Ollama {
///     base_url: "http://localhost:11434".to_string(),
///     model: "llama3".to_string(),
/// };
/// let client = provider.create_client()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// Ollama local LLM provider
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Provider described by the `[llm]` config section.
    pub fn from_config(config: &LlmConfig) -> Self {
        match config.provider {
            LlmProviderKind::Ollama => Provider::Ollama {
                base_url: config.base_url.clone(),
                model: config.model.clone(),
            },
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the base URL cannot be parsed or the
    /// provider's feature is disabled.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url, model.clone())?,
            )),
            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { .. } => Err(crate::types::AppError::Configuration(
                "Ollama provider requires the `ollama` feature".into(),
            )),
        }
    }
}
