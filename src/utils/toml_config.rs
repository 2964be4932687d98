//! TOML-based configuration for the PDF RAG server
//!
//! Every section and key carries a serde default, so an empty `pdfrag.toml`
//! is a valid configuration. A handful of environment variables override the
//! file after it is parsed.
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `ConfigManager` for thread-safe access to the current configuration.
//! Chunking, retrieval and prompt settings are read per request and follow
//! reloads; listener address and backends are fixed at startup.

use crate::rag::prompt::{CONTEXT_PLACEHOLDER, INPUT_PLACEHOLDER};
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pdfrag.toml";

/// Quiet period after the last file event before a hot reload.
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Root configuration structure loaded from pdfrag.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfRagConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub rag: RagConfig,
}

// ============= Server Configuration =============

/// Route prefix the API is mounted under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Dev,
    Prod,
}

impl Stage {
    pub fn prefix(&self) -> &'static str {
        match self {
            Stage::Dev => "/dev",
            Stage::Prod => "/prod",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Dev => "dev",
            Stage::Prod => "prod",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub stage: Stage,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Upper bound for request bodies, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_mb() -> usize {
    32
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            stage: Stage::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,

    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Optional system prompt sent with plain `/ai` queries
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            base_url: default_ollama_url(),
            model: default_llm_model(),
            system_prompt: None,
        }
    }
}

// ============= Embeddings Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    #[default]
    FastEmbed,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Ollama server used when `provider = "ollama"`
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    #[serde(default = "default_true")]
    pub show_download_progress: bool,
}

fn default_embedding_model() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: default_embedding_model(),
            base_url: default_ollama_url(),
            show_download_progress: true,
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VectorStoreKind {
    #[default]
    AresVector,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Directory uploaded PDFs are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Directory the vector index persists to
    #[serde(default = "default_vector_path")]
    pub vector_path: PathBuf,

    #[serde(default)]
    pub vector_store: VectorStoreKind,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Maximum number of chunks handed to the model
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity for a chunk to be retrieved
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Replaces the built-in prompt; must contain `{input}` and `{context}`
    #[serde(default)]
    pub prompt_template: Option<String>,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("pdf")
}

fn default_vector_path() -> PathBuf {
    PathBuf::from("db")
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_chunk_size() -> usize {
    1024
}

fn default_chunk_overlap() -> usize {
    80
}

fn default_top_k() -> usize {
    20
}

fn default_score_threshold() -> f32 {
    0.1
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            vector_path: default_vector_path(),
            vector_store: VectorStoreKind::default(),
            collection: default_collection(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            prompt_template: None,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' has an invalid value: {1}")]
    InvalidEnvVar(String, String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl PdfRagConfig {
    /// Load configuration from a TOML file, apply env overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config: PdfRagConfig = toml::from_str(&content)?;
        config.apply_env_overrides()?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path`, or fall back to defaults when the default file is absent.
    ///
    /// An explicitly named file that does not exist is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() && path == Path::new(DEFAULT_CONFIG_FILE) {
            warn!(
                "{} not found, using built-in defaults",
                DEFAULT_CONFIG_FILE
            );
            let mut config = PdfRagConfig::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }
        Self::load(path)
    }

    /// Apply `PDFRAG_HOST`, `PDFRAG_PORT`, `OLLAMA_URL` and `PDFRAG_MODEL`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("PDFRAG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PDFRAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("PDFRAG_PORT".to_string(), port))?;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.llm.base_url = url.clone();
            self.embeddings.base_url = url;
        }
        if let Ok(model) = std::env::var("PDFRAG_MODEL") {
            self.llm.model = model;
        }
        Ok(())
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }

        let rag = &self.rag;
        if rag.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.chunk_size must be greater than zero".to_string(),
            ));
        }
        if rag.chunk_overlap >= rag.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                rag.chunk_overlap, rag.chunk_size
            )));
        }
        if rag.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.top_k must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&rag.score_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "rag.score_threshold ({}) must be within [0, 1]",
                rag.score_threshold
            )));
        }
        if rag.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "rag.collection must not be empty".to_string(),
            ));
        }
        if let Some(ref template) = rag.prompt_template {
            for placeholder in [INPUT_PLACEHOLDER, CONTEXT_PLACEHOLDER] {
                if !template.contains(placeholder) {
                    return Err(ConfigError::ValidationError(format!(
                        "rag.prompt_template is missing the {} placeholder",
                        placeholder
                    )));
                }
            }
        }

        Ok(())
    }

    /// Serialize back to TOML (used by `config --full`)
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<PdfRagConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let requested = path.as_ref();
        let config = PdfRagConfig::load_or_default(requested)?;

        // Convert to absolute path for reliable file watching
        let path = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(requested)
        };

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: PdfRagConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<PdfRagConfig> {
        self.config.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = PdfRagConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        if !self.config_path.exists() {
            warn!(
                "Not watching {:?}: file does not exist",
                self.config_path
            );
            return Ok(());
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = config_path.file_name().map(|n| n.to_os_string());

        // Create debounced file watcher
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        // Spawn reload handler; bursts of events collapse into one reload
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // Wait until the file has been quiet for the whole window
                loop {
                    match tokio::time::timeout(RELOAD_DEBOUNCE, rx.recv()).await {
                        Ok(Some(())) => continue,
                        Ok(None) => return,
                        Err(_) => break,
                    }
                }

                match PdfRagConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: PdfRagConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.stage, Stage::Dev);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.embeddings.model, "BAAI/bge-small-en-v1.5");
        assert_eq!(config.rag.chunk_size, 1024);
        assert_eq!(config.rag.chunk_overlap, 80);
        assert_eq!(config.rag.top_k, 20);
        assert!((config.rag.score_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.rag.upload_dir, PathBuf::from("pdf"));
        assert_eq!(config.rag.vector_path, PathBuf::from("db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[server]
host = "127.0.0.1"
port = 9000
stage = "prod"
log_format = "json"

[llm]
model = "mistral"

[embeddings]
provider = "ollama"
model = "nomic-embed-text"

[rag]
vector_store = "memory"
chunk_size = 500
chunk_overlap = 50
top_k = 4
score_threshold = 0.35
"#;
        let config: PdfRagConfig = toml::from_str(content).unwrap();

        assert_eq!(config.server.stage, Stage::Prod);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.embeddings.provider, EmbeddingProviderKind::Ollama);
        assert_eq!(config.rag.vector_store, VectorStoreKind::Memory);
        assert_eq!(config.rag.top_k, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let mut config = PdfRagConfig::default();
        config.rag.chunk_size = 100;
        config.rag.chunk_overlap = 100;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = PdfRagConfig::default();
        config.rag.score_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = PdfRagConfig::default();
        config.rag.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prompt_template_requires_placeholders() {
        let mut config = PdfRagConfig::default();
        config.rag.prompt_template = Some("Question: {input}".to_string());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("{context}"));

        config.rag.prompt_template = Some("Q: {input}\nC: {context}".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stage_prefix() {
        assert_eq!(Stage::Dev.prefix(), "/dev");
        assert_eq!(Stage::Prod.prefix(), "/prod");
    }

    #[test]
    fn test_config_manager_from_config() {
        let mut config = PdfRagConfig::default();
        config.rag.top_k = 3;

        let manager = ConfigManager::from_config(config);
        assert_eq!(manager.config().rag.top_k, 3);
    }

    #[test]
    fn test_max_upload_bytes() {
        let server = ServerConfig {
            max_upload_mb: 2,
            ..Default::default()
        };
        assert_eq!(server.max_upload_bytes(), 2 * 1024 * 1024);
    }
}
