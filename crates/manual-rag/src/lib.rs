//! manual-rag: heading-aware retrieval over Markdown manuals with citation-bearing prompts
//!
//! Ingestion splits normalized Markdown into heading-scoped, token-windowed
//! chunks, embeds them and persists a metadata table, a flat inner-product
//! index and a provenance manifest. Queries retrieve the nearest chunks and
//! assemble a grounded prompt whose numbered context items become citations.

pub mod assistant;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod storage;
pub mod types;

pub use assistant::Assistant;
pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::{DocumentSource, FsDocumentSource, IngestPipeline, IngestReport};
pub use retrieval::{KnowledgeBase, Retriever};
pub use types::{Answer, Chunk, ChunkFields, Citation, Document, RetrievalResult};
