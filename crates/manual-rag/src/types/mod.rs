//! Core types for the retrieval engine

pub mod chunk;
pub mod response;

pub use chunk::{Chunk, ChunkFields, Document, RetrievalResult, Section};
pub use response::{Answer, Citation};
