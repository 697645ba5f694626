//! Ollama-based providers for embeddings and generation
//!
//! Wraps `OllamaClient` to implement the provider traits.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::OllamaClient;
use crate::retrieval::index::l2_normalize;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    batch_size: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &RagConfig) -> Result<Self> {
        let client = OllamaClient::new(
            &config.llm.base_url,
            Duration::from_secs(config.embeddings.timeout_secs),
            config.embeddings.max_retries,
        )?;
        Ok(Self::from_client(
            Arc::new(client),
            config.embeddings.model.clone(),
            config.embeddings.batch_size,
        ))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String, batch_size: usize) -> Self {
        Self {
            client,
            model,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let raw = self.client.embed(&self.model, text).await?;
        Ok(l2_normalize(raw))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let total_batches = texts.len().div_ceil(self.batch_size);
        let mut embeddings = Vec::with_capacity(texts.len());

        // Requests within a batch run concurrently; try_join_all keeps input order
        for (batch_num, batch) in texts.chunks(self.batch_size).enumerate() {
            let vectors = try_join_all(batch.iter().map(|text| self.embed(text))).await?;
            embeddings.extend(vectors);
            tracing::debug!(
                "Embedded batch {}/{} ({} texts)",
                batch_num + 1,
                total_batches,
                batch.len()
            );
        }

        Ok(embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider with the configured generation timeout
    pub fn new(config: &RagConfig) -> Result<Self> {
        let client = OllamaClient::new(&config.llm.base_url, config.generation_timeout(), 0)?;
        Ok(Self::from_client(
            Arc::new(client),
            config.llm.generate_model.clone(),
            config.llm.temperature,
        ))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client
            .generate(&self.model, prompt, self.temperature)
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
