//! Vector index, persisted knowledge base and query-time retrieval

pub mod index;
mod knowledge_base;
mod retriever;

pub use index::FlatIndex;
pub use knowledge_base::KnowledgeBase;
pub use retriever::Retriever;
