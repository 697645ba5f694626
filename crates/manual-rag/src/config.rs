//! Configuration for the retrieval engine

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Storage locations
    pub storage: StorageConfig,
    /// Serving-layer settings used when rendering citations
    pub server: ServerConfig,
}

/// Token-window chunking configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in whitespace tokens
    pub chunk_tokens: usize,
    /// Tokens shared by consecutive windows of a section
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_tokens: 900,
            chunk_overlap: 120,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 8 }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model identifier, recorded in the manifest
    pub model: String,
    /// Number of texts embedded concurrently
    pub batch_size: usize,
    /// Retries per embedding request
    pub max_retries: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            batch_size: 64,
            max_retries: 2,
            timeout_secs: 60,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Generation timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            generate_model: "qwen2.5:3b-instruct".to_string(),
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the normalized Markdown documents
    pub raw_dir: PathBuf,
    /// Directory holding chunks.sqlite, vectors.bin and manifest.json
    pub index_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = std::env::current_dir()
            .ok()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            raw_dir: base.join("data").join("raw"),
            index_dir: base.join("data").join("index"),
        }
    }
}

/// Serving-layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Prefix of citation links into rendered source documents
    pub view_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            view_prefix: "/view".to_string(),
        }
    }
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse TOML configuration text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::config(format!("Invalid TOML: {}", e)))
    }

    /// Apply overrides using the historical environment variable names
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(v) = lookup("CHUNK_TOKENS") {
            self.chunking.chunk_tokens = parse_var("CHUNK_TOKENS", &v)?;
        }
        if let Some(v) = lookup("CHUNK_OVERLAP") {
            self.chunking.chunk_overlap = parse_var("CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = lookup("TOP_K") {
            self.retrieval.top_k = parse_var("TOP_K", &v)?;
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.llm.base_url = host;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.llm.generate_model = model;
        }
        if let Some(v) = lookup("GENERATION_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_var("GENERATION_TIMEOUT_SECS", &v)?;
        }
        if let Some(dir) = lookup("RAW_DIR") {
            self.storage.raw_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("INDEX_DIR") {
            self.storage.index_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_tokens == 0 {
            return Err(Error::config("chunk_tokens must be greater than zero"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_tokens {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_tokens ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_tokens
            )));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::config("embeddings.batch_size must be greater than zero"));
        }
        if self.embeddings.model.trim().is_empty() {
            return Err(Error::config("embeddings.model must not be empty"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::config("llm.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Embedding model identifier recorded alongside the index
    pub fn embedding_model_id(&self) -> &str {
        &self.embeddings.model
    }

    /// Timeout for one generation round trip
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Default number of passages per question
    pub fn top_k(&self) -> usize {
        self.retrieval.top_k
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{} has an invalid value: {:?}", key, value)))
}
