//! AresVector - Pure Rust Vector Store Implementation
//!
//! HNSW-backed store from the `ares-vector` crate. The index keeps vectors
//! and ids; chunk text and page metadata live in a `documents.json` sidecar
//! so answers can cite their sources after a restart.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = AresVectorStore::new(Some("./db".into())).await?;
//! store.create_collection("documents", 384).await?;
//! store.upsert("documents", &docs).await?;
//! let results = store.search("documents", &embedding, 20, 0.1).await?;
//! ```

use crate::types::{AppError, Document, Result, SearchResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::vectorstore::{checked_embedding, CollectionInfo, CollectionStats, VectorStore};
use ares_vector::types::MetadataValue;
use ares_vector::{Config, DistanceMetric, VectorDb, VectorMetadata};

const DOCUMENTS_FILE: &str = "documents.json";

type DocumentMap = HashMap<String, HashMap<String, Document>>;

/// Embedded HNSW vector store with optional persistence.
pub struct AresVectorStore {
    /// The underlying vector database (VectorDb is Clone and uses Arc internally)
    db: VectorDb,
    /// Storage path (None for in-memory)
    path: Option<PathBuf>,
    /// Document storage, keyed by collection then document id
    documents: Arc<RwLock<DocumentMap>>,
}

impl AresVectorStore {
    /// Open the store, loading any persisted collections under `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized or loaded.
    pub async fn new(path: Option<PathBuf>) -> Result<Self> {
        let config = match path {
            Some(ref p) => Config::persistent(p.clone()),
            None => Config::memory(),
        };

        let db = VectorDb::open(config).await.map_err(|e| {
            AppError::VectorStore(format!("Failed to initialize AresVector: {}", e))
        })?;

        let store = Self {
            db,
            path,
            documents: Arc::new(RwLock::new(HashMap::new())),
        };

        if let Some(ref path) = store.path {
            store.load_documents(path).await?;
        }

        tracing::info!(
            path = ?store.path,
            collections = store.db.list_collections().len(),
            "Opened AresVector store"
        );

        Ok(store)
    }

    /// Load document metadata from disk.
    async fn load_documents(&self, path: &Path) -> Result<()> {
        let docs_path = path.join(DOCUMENTS_FILE);
        if !docs_path.exists() {
            return Ok(());
        }

        let data = tokio::fs::read_to_string(&docs_path).await?;
        let loaded: DocumentMap = serde_json::from_str(&data).map_err(|e| {
            AppError::VectorStore(format!("Failed to parse {}: {}", docs_path.display(), e))
        })?;

        *self.documents.write() = loaded;
        Ok(())
    }

    /// Save document metadata and flush the index to disk.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        // Serialize under the lock, write without it
        let data = {
            let docs = self.documents.read();
            serde_json::to_string(&*docs)
                .map_err(|e| AppError::Internal(format!("Failed to serialize documents: {}", e)))?
        };

        tokio::fs::create_dir_all(path).await?;
        tokio::fs::write(path.join(DOCUMENTS_FILE), data).await?;

        self.db
            .persist()
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to persist index: {}", e)))
    }

    /// Insert or update each vector and record its document in the sidecar.
    async fn write_vectors(
        &self,
        collection: &str,
        documents: &[Document],
        dimensions: usize,
    ) -> Result<()> {
        for doc in documents {
            let embedding = checked_embedding(doc, dimensions)?;
            let meta = Some(Self::metadata_for(doc));

            let exists = self
                .db
                .contains(collection, &doc.id)
                .map_err(|e| AppError::VectorStore(e.to_string()))?;
            let written = if exists {
                self.db.update(collection, &doc.id, embedding, meta).await
            } else {
                self.db.insert(collection, &doc.id, embedding, meta).await
            };
            written.map_err(|e| AppError::VectorStore(format!("Failed to insert vector: {}", e)))?;

            let stored = Document {
                embedding: None,
                ..doc.clone()
            };
            self.documents
                .write()
                .entry(collection.to_string())
                .or_default()
                .insert(doc.id.clone(), stored);
        }
        Ok(())
    }

    fn metadata_for(doc: &Document) -> VectorMetadata {
        VectorMetadata::from_pairs([
            ("source", MetadataValue::String(doc.metadata.source.clone())),
            ("page", MetadataValue::Int(doc.metadata.page as i64)),
        ])
    }
}

#[async_trait]
impl VectorStore for AresVectorStore {
    fn provider_name(&self) -> &'static str {
        "ares-vector"
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if self.db.collection_exists(name) {
            return Err(AppError::InvalidInput(format!(
                "Collection '{}' already exists",
                name
            )));
        }

        self.db
            .create_collection(name, dimensions, DistanceMetric::Cosine)
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to create collection: {}", e)))?;

        self.documents
            .write()
            .insert(name.to_string(), HashMap::new());

        self.persist().await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        if !self.db.collection_exists(name) {
            return Err(AppError::NotFound(format!("Collection '{}' not found", name)));
        }

        self.db
            .delete_collection(name)
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to delete collection: {}", e)))?;

        self.documents.write().remove(name);

        self.persist().await
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let mut infos = Vec::new();
        for name in self.db.list_collections() {
            if let Ok(collection) = self.db.get_collection(&name) {
                let stats = collection.stats();
                infos.push(CollectionInfo {
                    name,
                    dimensions: stats.dimensions,
                    document_count: stats.vector_count,
                });
            }
        }
        Ok(infos)
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.db.collection_exists(name))
    }

    async fn collection_stats(&self, name: &str) -> Result<CollectionStats> {
        let collection = self
            .db
            .get_collection(name)
            .map_err(|_| AppError::NotFound(format!("Collection '{}' not found", name)))?;

        let stats = collection.stats();

        Ok(CollectionStats {
            name: stats.name,
            document_count: stats.vector_count,
            dimensions: stats.dimensions,
            distance_metric: format!("{:?}", stats.metric).to_lowercase(),
        })
    }

    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let dimensions = self
            .db
            .get_collection(collection)
            .map_err(|_| AppError::NotFound(format!("Collection '{}' not found", collection)))?
            .dimensions();

        for doc in documents {
            checked_embedding(doc, dimensions)?;
        }

        // Vectors written before a failure stay in the index, so the sidecar
        // is flushed either way to keep the two in step
        let written = self.write_vectors(collection, documents, dimensions).await;
        let persisted = self.persist().await;
        written?;
        persisted?;

        Ok(documents.len())
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        if !self.db.collection_exists(collection) {
            return Err(AppError::NotFound(format!(
                "Collection '{}' not found",
                collection
            )));
        }

        let mut deleted = 0;
        for id in ids {
            let removed = self
                .db
                .delete(collection, id)
                .await
                .map_err(|e| AppError::VectorStore(format!("Failed to delete vector: {}", e)))?;

            let had_doc = self
                .documents
                .write()
                .get_mut(collection)
                .map(|col| col.remove(id).is_some())
                .unwrap_or(false);
            if removed || had_doc {
                deleted += 1;
            }
        }

        self.persist().await?;

        Ok(deleted)
    }

    async fn source_ids(&self, collection: &str, source: &str) -> Result<Vec<String>> {
        if !self.db.collection_exists(collection) {
            return Err(AppError::NotFound(format!(
                "Collection '{}' not found",
                collection
            )));
        }

        let docs = self.documents.read();
        Ok(docs
            .get(collection)
            .map(|col| {
                col.values()
                    .filter(|doc| doc.metadata.source == source)
                    .map(|doc| doc.id.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        if !self.db.collection_exists(collection) {
            return Err(AppError::NotFound(format!(
                "Collection '{}' not found",
                collection
            )));
        }

        let hits = self
            .db
            .search_with_threshold(collection, embedding, limit, threshold)
            .await
            .map_err(|e| AppError::VectorStore(format!("Search failed: {}", e)))?;

        let docs = self.documents.read();
        let collection_docs = docs.get(collection);

        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .filter(|hit| hit.score >= threshold)
            .filter_map(|hit| {
                let doc = collection_docs?.get(&hit.id)?;
                Some(SearchResult {
                    document: doc.clone(),
                    score: hit.score,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }
}
