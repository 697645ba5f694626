//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Turns an assembled prompt into generated text
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (qwen2.5, phi3, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// One blocking round trip; never retried
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
