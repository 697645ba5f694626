//! Grounding prompt for the generator
//!
//! The assembled string is the exact payload sent to the generator, so the
//! template is fixed and the output depends only on its inputs.

use crate::types::RetrievalResult;

/// First instruction line
pub const GROUNDING_INSTRUCTION: &str =
    "You answer only from the provided context. If info is missing, say so and suggest the closest section.";

/// Second instruction line
pub const CITATION_INSTRUCTION: &str =
    "Cite sources like [n] where n is the context item number.";

/// Prompt builder for retrieval-grounded questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render the question and numbered context passages
    ///
    /// ```text
    /// <grounding instruction>
    /// <citation instruction>
    ///
    /// Question:
    /// <question>
    ///
    /// Context:
    /// [1] <section_title> — <source_id>
    /// <chunk text>
    ///
    /// Answer:
    /// ```
    pub fn build_prompt(question: &str, results: &[RetrievalResult]) -> String {
        let mut parts: Vec<String> = vec![
            GROUNDING_INSTRUCTION.to_string(),
            CITATION_INSTRUCTION.to_string(),
            String::new(),
            format!("Question:\n{}\n", question),
            "Context:".to_string(),
        ];

        for (i, result) in results.iter().enumerate() {
            parts.push(Self::context_header(i + 1, result));
            parts.push(result.chunk.text.clone());
            parts.push(String::new());
        }

        parts.push("Answer:".to_string());
        parts.join("\n")
    }

    fn context_header(n: usize, result: &RetrievalResult) -> String {
        format!(
            "[{}] {} — {}",
            n, result.chunk.section_title, result.chunk.source_id
        )
    }
}
