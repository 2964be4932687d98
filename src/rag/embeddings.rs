//! Dense embedding providers.
//!
//! - [`FastEmbedEmbedder`] runs ONNX models in-process (feature `local-embeddings`)
//! - [`OllamaEmbedder`] calls a running Ollama server (feature `ollama`)

use crate::types::{AppError, Result};
use crate::utils::toml_config::{EmbeddingProviderKind, EmbeddingsConfig};
use async_trait::async_trait;
use std::sync::Arc;

/// Turns text into vectors. Document and query embeddings may differ for
/// asymmetric models, hence two methods.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of document chunks, one vector per input, in order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier, for logs and health output.
    fn model_name(&self) -> &str;
}

/// Check the provider returned one vector per input.
pub(crate) fn expect_count(expected: usize, vectors: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        return Err(AppError::Internal(format!(
            "Embedding provider returned {} vectors for {} inputs",
            vectors.len(),
            expected
        )));
    }
    Ok(vectors)
}

/// Build the embedder selected in config.
pub async fn create_embedder(config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProviderKind::FastEmbed => {
            #[cfg(feature = "local-embeddings")]
            {
                let embedder = FastEmbedEmbedder::new(&config.model, config.show_download_progress)
                    .await?;
                Ok(Arc::new(embedder))
            }
            #[cfg(not(feature = "local-embeddings"))]
            {
                Err(AppError::Configuration(
                    "fastembed embeddings require the `local-embeddings` feature".into(),
                ))
            }
        }
        EmbeddingProviderKind::Ollama => {
            #[cfg(feature = "ollama")]
            {
                let embedder = OllamaEmbedder::new(&config.base_url, &config.model)?;
                Ok(Arc::new(embedder))
            }
            #[cfg(not(feature = "ollama"))]
            {
                Err(AppError::Configuration(
                    "Ollama embeddings require the `ollama` feature".into(),
                ))
            }
        }
    }
}

// ============================================================================
// FastEmbed
// ============================================================================

#[cfg(feature = "local-embeddings")]
pub use self::fast::FastEmbedEmbedder;

#[cfg(feature = "local-embeddings")]
mod fast {
    use super::{expect_count, Embedder};
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Map a model code to a fastembed model.
    pub fn parse_model(code: &str) -> Result<EmbeddingModel> {
        match code {
            "BAAI/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
            "BAAI/bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
            "sentence-transformers/all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
            "nomic-ai/nomic-embed-text-v1.5" => Ok(EmbeddingModel::NomicEmbedTextV15),
            other => Err(AppError::Configuration(format!(
                "Unsupported fastembed model '{}'",
                other
            ))),
        }
    }

    /// In-process ONNX embeddings.
    pub struct FastEmbedEmbedder {
        model: Arc<Mutex<TextEmbedding>>,
        model_name: String,
    }

    impl FastEmbedEmbedder {
        /// Load (downloading on first use) the named model.
        pub async fn new(model_code: &str, show_download_progress: bool) -> Result<Self> {
            let model = parse_model(model_code)?;
            let loaded = tokio::task::spawn_blocking(move || {
                TextEmbedding::try_new(
                    InitOptions::new(model).with_show_download_progress(show_download_progress),
                )
            })
            .await
            .map_err(|e| AppError::Internal(format!("Embedding init task failed: {}", e)))?
            .map_err(|e| AppError::Embedding(format!("Failed to init embeddings: {}", e)))?;

            tracing::info!(model = %model_code, "Loaded fastembed model");

            Ok(Self {
                model: Arc::new(Mutex::new(loaded)),
                model_name: model_code.to_string(),
            })
        }

        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            let model = Arc::clone(&self.model);
            tokio::task::spawn_blocking(move || {
                let mut guard = model.lock();
                guard.embed(texts, None)
            })
            .await
            .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
            .map_err(|e| AppError::Embedding(e.to_string()))
        }
    }

    #[async_trait]
    impl Embedder for FastEmbedEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let vectors = self.embed(texts.to_vec()).await?;
            expect_count(texts.len(), vectors)
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            self.embed(vec![text.to_string()])
                .await?
                .pop()
                .ok_or_else(|| AppError::Embedding("No embedding returned for query".into()))
        }

        fn model_name(&self) -> &str {
            &self.model_name
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_known_models() {
            assert!(parse_model("BAAI/bge-small-en-v1.5").is_ok());
            assert!(parse_model("sentence-transformers/all-MiniLM-L6-v2").is_ok());
        }

        #[test]
        fn test_parse_unknown_model() {
            assert!(matches!(
                parse_model("made-up/model"),
                Err(AppError::Configuration(_))
            ));
        }
    }
}

// ============================================================================
// Ollama
// ============================================================================

#[cfg(feature = "ollama")]
pub use self::ollama::OllamaEmbedder;

#[cfg(feature = "ollama")]
mod ollama {
    use super::{expect_count, Embedder};
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
    use ollama_rs::Ollama;

    /// Embeddings served by Ollama's `/api/embed`.
    pub struct OllamaEmbedder {
        client: Ollama,
        model: String,
    }

    impl OllamaEmbedder {
        pub fn new(base_url: &str, model: &str) -> Result<Self> {
            let client = Ollama::try_new(base_url).map_err(|e| {
                AppError::Configuration(format!("Invalid Ollama URL '{}': {}", base_url, e))
            })?;
            Ok(Self {
                client,
                model: model.to_string(),
            })
        }

        async fn embed(&self, input: EmbeddingsInput) -> Result<Vec<Vec<f32>>> {
            let request = GenerateEmbeddingsRequest::new(self.model.clone(), input);
            let response = self
                .client
                .generate_embeddings(request)
                .await
                .map_err(|e| AppError::Embedding(format!("Ollama embedding error: {}", e)))?;
            Ok(response.embeddings)
        }
    }

    #[async_trait]
    impl Embedder for OllamaEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let vectors = self
                .embed(EmbeddingsInput::Multiple(texts.to_vec()))
                .await?;
            expect_count(texts.len(), vectors)
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            self.embed(EmbeddingsInput::Single(text.to_string()))
                .await?
                .pop()
                .ok_or_else(|| AppError::Embedding("No embedding returned for query".into()))
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}
