//! Error types for the retrieval engine

use thiserror::Error;

/// Result type alias for manual-rag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Retrieval engine errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document could not be used for ingestion
    #[error("Unsupported document '{source_id}': {message}")]
    UnsupportedDocument { source_id: String, message: String },

    /// Embedding provider failed
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Generation provider failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Generation provider did not answer in time
    #[error("Generation timed out after {secs}s")]
    GenerationTimeout { secs: u64 },

    /// Persisted index artifacts are missing or unreadable
    #[error("Failed to load index: {0}")]
    IndexLoad(String),

    /// Persisted index does not match the running configuration
    #[error("Index manifest mismatch: {0}")]
    ManifestMismatch(String),

    /// Nothing to answer from
    #[error("No context found: {0}")]
    NoContext(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an unsupported document error
    pub fn unsupported(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedDocument {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an index load error
    pub fn index_load(message: impl Into<String>) -> Self {
        Self::IndexLoad(message.into())
    }

    /// Create a manifest mismatch error
    pub fn manifest_mismatch(message: impl Into<String>) -> Self {
        Self::ManifestMismatch(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error comes from loading persisted artifacts
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::IndexLoad(_) | Self::ManifestMismatch(_))
    }
}
