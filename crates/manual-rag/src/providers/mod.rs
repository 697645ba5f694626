//! Provider abstractions for embeddings and answer generation
//!
//! The retrieval engine only sees these traits; the Ollama implementations
//! are the default local backend.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::{OllamaEmbedder, OllamaLlm};
