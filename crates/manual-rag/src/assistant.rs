//! Question answering over the knowledge base

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::{build_citations, cited_numbers, PromptBuilder};
use crate::providers::LlmProvider;
use crate::retrieval::Retriever;
use crate::types::{Answer, RetrievalResult};

/// Retrieves context for a question and asks the generator to answer from it
#[derive(Clone)]
pub struct Assistant {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    view_prefix: String,
}

impl Assistant {
    pub fn new(retriever: Retriever, llm: Arc<dyn LlmProvider>, view_prefix: impl Into<String>) -> Self {
        Self {
            retriever,
            llm,
            view_prefix: view_prefix.into(),
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Retrieve context and assemble the prompt without generating
    ///
    /// Fails with `NoContext` when nothing is retrieved.
    pub async fn prompt(&self, question: &str, k: Option<usize>) -> Result<(String, Vec<RetrievalResult>)> {
        let k = k.unwrap_or_else(|| self.retriever.top_k());
        let results = self.retriever.retrieve(question, k).await?;
        if results.is_empty() {
            return Err(Error::NoContext(format!(
                "no passages retrieved for: {}",
                question
            )));
        }
        Ok((PromptBuilder::build_prompt(question, &results), results))
    }

    /// Answer a question from the `k` best passages, citing them
    pub async fn ask(&self, question: &str, k: Option<usize>) -> Result<Answer> {
        let used = k.unwrap_or_else(|| self.retriever.top_k());
        let (prompt, results) = self.prompt(question, Some(used)).await?;

        tracing::debug!(
            "Asking {} ({}) with {} passages",
            self.llm.model(),
            self.llm.name(),
            results.len()
        );
        let answer = self.llm.generate(&prompt).await?;

        let citations = build_citations(&results, &self.view_prefix);
        let cited = cited_numbers(&answer, citations.len());
        if cited.is_empty() {
            tracing::debug!("Answer carries no citation markers");
        }

        Ok(Answer {
            answer,
            citations,
            cited,
            used,
        })
    }

    /// Whether the generator is reachable
    pub async fn health(&self) -> bool {
        match self.llm.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Generator health check failed: {}", e);
                false
            }
        }
    }
}
