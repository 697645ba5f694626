//! Prompt assembly, citations and the Ollama client

pub mod citation;
pub mod ollama;
pub mod prompt;

pub use citation::{build_citations, cited_numbers};
pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
