//! Deterministic in-process providers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use manual_rag::error::{Error, Result};
use manual_rag::providers::{EmbeddingProvider, LlmProvider};
use manual_rag::retrieval::index::l2_normalize;
use manual_rag::{Document, RagConfig};

pub const DIMENSIONS: usize = 64;

/// Hashed bag-of-words embedder
pub struct HashEmbedder {
    model: String,
}

impl HashEmbedder {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMENSIONS];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hash: u64 = 0xcbf29ce484222325;
            for b in token.bytes() {
                hash ^= b as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            v[(hash % DIMENSIONS as u64) as usize] += 1.0;
        }
        l2_normalize(v)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Embedder whose every request fails
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("provider unavailable"))
    }

    fn model(&self) -> &str {
        "hash-v1"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Generator returning a canned answer and recording the prompts it saw
pub struct ScriptedLlm {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}

pub fn config_for(index_dir: &Path) -> RagConfig {
    let mut config = RagConfig::default();
    config.embeddings.model = "hash-v1".to_string();
    config.storage.index_dir = index_dir.to_path_buf();
    config
}

pub fn words(prefix: &str, n: usize) -> String {
    (0..n)
        .map(|i| format!("{}{}", prefix, i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Small corpus: a pump manual with two sections and a headingless note
pub fn corpus() -> Vec<Document> {
    vec![
        Document::new(
            "pumps/p100.md",
            "# Pump Manual\nThe P100 pump moves water.\n\
             ## Priming the Pump\nFill the casing with water before starting the motor.\n\
             ## Cleaning\nRinse the strainer basket weekly with clean water.",
        ),
        Document::new("notes.txt", "Warranty claims require the original receipt."),
    ]
}
