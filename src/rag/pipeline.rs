//! RAG orchestration: ingest PDFs, answer questions over them.
//!
//! Chunking and retrieval parameters are read from the current config
//! snapshot on every call, so a hot-reloaded `pdfrag.toml` applies to the
//! next request.

use crate::db::{VectorStore, VectorStoreProvider};
use crate::llm::{LLMClient, Provider};
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::{create_embedder, expect_count, Embedder};
use crate::rag::loader::PdfLoader;
use crate::rag::prompt::{self, DEFAULT_PROMPT_TEMPLATE};
use crate::types::{
    AppError, AskResponse, Document, DocumentMetadata, PageDocument, Result, SearchResult, Source,
};
use crate::utils::toml_config::ConfigManager;
use chrono::Utc;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of indexing one PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub filename: String,
    /// Number of pages loaded.
    pub doc_len: usize,
    /// Number of chunks embedded and stored.
    pub chunks: usize,
}

pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LLMClient>,
    config: Arc<ConfigManager>,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LLMClient>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            embedder,
            store,
            llm,
            config,
        }
    }

    /// Build embedder, vector store and LLM client from the loaded config.
    pub async fn from_config(config: Arc<ConfigManager>) -> Result<Self> {
        let snapshot = config.config();

        let embedder = create_embedder(&snapshot.embeddings).await?;
        let store: Arc<dyn VectorStore> = Arc::from(
            VectorStoreProvider::from_config(&snapshot.rag)
                .create_store()
                .await?,
        );
        let llm = Provider::from_config(&snapshot.llm).create_client()?;

        tracing::info!(
            llm = %llm.model_name(),
            embeddings = %embedder.model_name(),
            vector_store = store.provider_name(),
            "RAG pipeline ready"
        );

        Ok(Self::new(embedder, store, llm, config))
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn llm(&self) -> &Arc<dyn LLMClient> {
        &self.llm
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    /// Send a question straight to the model, without retrieval.
    pub async fn query(&self, question: &str) -> Result<String> {
        let question = require_text(question)?;
        let config = self.config.config();

        let raw = match config.llm.system_prompt.as_deref() {
            Some(system) => self.llm.generate_with_system(system, question).await?,
            None => self.llm.generate(question).await?,
        };

        Ok(prompt::clean_answer(&raw))
    }

    /// Save an uploaded PDF under the upload directory and index it.
    pub async fn ingest_pdf(&self, file_name: &str, bytes: Vec<u8>) -> Result<IngestReport> {
        let file_name = sanitize_file_name(file_name)?;

        if bytes.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Uploaded file '{}' is empty",
                file_name
            )));
        }
        if !PdfLoader::is_pdf(&file_name, &bytes) {
            return Err(AppError::UnsupportedMediaType(format!(
                "'{}' is not a PDF document",
                file_name
            )));
        }

        let config = self.config.config();
        tokio::fs::create_dir_all(&config.rag.upload_dir).await?;
        let save_path = config.rag.upload_dir.join(&file_name);
        tokio::fs::write(&save_path, &bytes).await?;

        let source = save_path.display().to_string();
        tracing::info!(filename = %file_name, path = %source, bytes = bytes.len(), "Saved upload");

        let pages = PdfLoader::load_bytes(bytes, &source).await?;
        self.ingest_pages(&file_name, pages).await
    }

    /// Chunk, embed and store already-extracted pages.
    ///
    /// The collection is created on first use, sized to the embedder's output.
    pub async fn ingest_pages(
        &self,
        filename: &str,
        pages: Vec<PageDocument>,
    ) -> Result<IngestReport> {
        let start = Instant::now();
        let config = self.config.config();
        let rag = &config.rag;

        let chunker = TextChunker::new(rag.chunk_size, rag.chunk_overlap)?;
        let chunks = chunker.split_documents(&pages);
        if chunks.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "No text could be chunked from '{}'",
                filename
            )));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = expect_count(texts.len(), self.embedder.embed_documents(&texts).await?)?;

        if let Some(first) = embeddings.first() {
            self.ensure_collection(&rag.collection, first.len()).await?;
        }

        let created_at = Utc::now();
        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Document {
                id: format!("{}#{}", chunk.metadata.source, chunk.index),
                content: chunk.content,
                metadata: DocumentMetadata {
                    source: chunk.metadata.source,
                    page: chunk.metadata.page,
                    chunk_index: chunk.index,
                    created_at,
                },
                embedding: Some(embedding),
            })
            .collect();

        let stored = self.store.upsert(&rag.collection, &documents).await?;
        let pruned = self.prune_stale(&rag.collection, &documents).await?;

        tracing::info!(
            filename = %filename,
            pages = pages.len(),
            chunks = stored,
            pruned,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document ingested"
        );

        Ok(IngestReport {
            filename: filename.to_string(),
            doc_len: pages.len(),
            chunks: stored,
        })
    }

    /// Answer a question from the indexed documents.
    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let start = Instant::now();
        let question = require_text(question)?;
        let config = self.config.config();
        let rag = &config.rag;

        let results = self.retrieve(question, rag.top_k, rag.score_threshold, &rag.collection).await?;

        let context = prompt::format_context(&results);
        let template = rag
            .prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_PROMPT_TEMPLATE);
        let rendered = prompt::render(template, question, &context);

        let raw = self.llm.generate(&rendered).await?;
        let answer = prompt::clean_answer(&raw);

        let sources: Vec<Source> = results
            .into_iter()
            .map(|r| Source {
                source: r.document.metadata.source,
                page: r.document.metadata.page,
                page_content: r.document.content,
            })
            .collect();

        tracing::info!(
            sources = sources.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(AskResponse { answer, sources })
    }

    /// Number of chunks in the configured collection; zero if it doesn't exist yet.
    pub async fn document_count(&self) -> Result<usize> {
        let collection = &self.config.config().rag.collection;
        if !self.store.collection_exists(collection).await? {
            return Ok(0);
        }
        self.store.count(collection).await
    }

    async fn retrieve(
        &self,
        question: &str,
        top_k: usize,
        threshold: f32,
        collection: &str,
    ) -> Result<Vec<SearchResult>> {
        if !self.store.collection_exists(collection).await? {
            tracing::debug!(collection = %collection, "Collection not created yet, nothing to retrieve");
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed_query(question).await?;
        let results = self
            .store
            .search(collection, &embedding, top_k, threshold)
            .await?;

        tracing::debug!(
            collection = %collection,
            retrieved = results.len(),
            threshold,
            "Retrieved context"
        );

        Ok(results)
    }

    /// Drop chunks of the ingested sources that the new version no longer has.
    async fn prune_stale(&self, collection: &str, documents: &[Document]) -> Result<usize> {
        let current: HashSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        let sources: BTreeSet<&str> = documents
            .iter()
            .map(|d| d.metadata.source.as_str())
            .collect();

        let mut stale = Vec::new();
        for source in sources {
            stale.extend(
                self.store
                    .source_ids(collection, source)
                    .await?
                    .into_iter()
                    .filter(|id| !current.contains(id.as_str())),
            );
        }

        if stale.is_empty() {
            return Ok(0);
        }
        self.store.delete(collection, &stale).await
    }

    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        if self.store.collection_exists(collection).await? {
            return Ok(());
        }

        if let Err(e) = self.store.create_collection(collection, dimensions).await {
            // A concurrent upload may have created it first
            if !self.store.collection_exists(collection).await? {
                return Err(e);
            }
            tracing::debug!(collection = %collection, error = %e, "Collection already created");
            return Ok(());
        }

        tracing::info!(collection = %collection, dimensions, "Created collection");
        Ok(())
    }
}

fn require_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Query must not be empty".into()));
    }
    Ok(trimmed)
}

/// Reduce a client-supplied file name to its final path component.
pub fn sanitize_file_name(name: &str) -> Result<String> {
    // Treat both separators as path separators regardless of platform
    let normalized = name.trim().replace('\\', "/");
    let base = Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .unwrap_or_default();

    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::InvalidInput(format!(
            "Invalid file name '{}'",
            name
        )));
    }

    Ok(base.to_string())
}
