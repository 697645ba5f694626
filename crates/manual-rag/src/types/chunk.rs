//! Document, section and chunk types with source attribution

use serde::{Deserialize, Serialize};

/// One normalized Markdown document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable relative path used for attribution and citation links
    pub source_id: String,
    /// Markdown text
    pub text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Span of a document between one heading and the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Ancestor heading titles at increasing depth
    pub heading_path: Vec<String>,
    /// Section text, heading line included
    pub text: String,
}

/// A passage before the metadata store has assigned it an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFields {
    pub source_id: String,
    /// Heading path joined by " / "
    pub section_title: String,
    /// Slug of the deepest heading, empty when the section has none
    pub anchor: String,
    pub text: String,
}

impl ChunkFields {
    /// Number of whitespace tokens in the passage
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Attach the id handed out by the metadata store
    pub fn with_id(self, id: i64) -> Chunk {
        Chunk {
            id,
            source_id: self.source_id,
            section_title: self.section_title,
            anchor: self.anchor,
            text: self.text,
        }
    }
}

/// A stored passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based id; index ordinal `id - 1` holds its embedding
    pub id: i64,
    pub source_id: String,
    pub section_title: String,
    pub anchor: String,
    pub text: String,
}

impl Chunk {
    /// Index ordinal of this chunk's embedding
    pub fn ordinal(&self) -> usize {
        (self.id - 1) as usize
    }
}

/// One ranked passage returned by the retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// 1-based rank
    pub rank: usize,
    pub chunk: Chunk,
    /// Inner product with the query embedding
    pub score: f32,
}
