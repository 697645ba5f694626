//! Persisted index artifacts
//!
//! An index directory holds three files that are always written and loaded
//! together: the chunk metadata table, the vector index and the manifest.

mod manifest;
mod metadata;
mod staging;

use std::path::{Path, PathBuf};

pub use manifest::{Manifest, SCHEMA_VERSION};
pub use metadata::MetadataStore;
pub use staging::StagingArea;

/// SQLite metadata table file
pub const CHUNKS_DB: &str = "chunks.sqlite";
/// Serialized vector index file
pub const VECTORS_FILE: &str = "vectors.bin";
/// Provenance manifest file
pub const MANIFEST_FILE: &str = "manifest.json";

/// File locations inside one index directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    pub dir: PathBuf,
    pub chunks_db: PathBuf,
    pub vectors: PathBuf,
    pub manifest: PathBuf,
}

impl IndexPaths {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            chunks_db: dir.join(CHUNKS_DB),
            vectors: dir.join(VECTORS_FILE),
            manifest: dir.join(MANIFEST_FILE),
            dir,
        }
    }

    /// Artifacts that are absent
    pub fn missing(&self) -> Vec<&Path> {
        [&self.chunks_db, &self.vectors, &self.manifest]
            .into_iter()
            .filter(|p| !p.is_file())
            .map(|p| p.as_path())
            .collect()
    }
}
