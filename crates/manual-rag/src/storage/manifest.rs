//! Index provenance manifest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::metadata::CHUNK_COLUMNS;
use crate::error::{Error, Result};

/// Version of the on-disk layout; bump when any artifact format changes
pub const SCHEMA_VERSION: u32 = 1;

/// Provenance record stored next to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    /// Number of chunks, equal to store rows and index vectors
    pub count: usize,
    /// Embedding model the vectors were produced with
    pub embed_model: String,
    /// Embedding dimension
    pub dimensions: usize,
    /// Metadata table columns
    pub columns: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Manifest {
    pub fn new(count: usize, embed_model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            count,
            embed_model: embed_model.into(),
            dimensions,
            columns: CHUNK_COLUMNS.iter().map(|c| c.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::index_load(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::index_load(format!("{}: corrupt manifest: {}", path.display(), e)))
    }

    /// Fail unless the index was built with this schema and embedding model
    pub fn check_compatible(&self, embed_model: &str) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(Error::manifest_mismatch(format!(
                "schema version {} is not supported (expected {})",
                self.schema_version, SCHEMA_VERSION
            )));
        }
        if self.embed_model != embed_model {
            return Err(Error::manifest_mismatch(format!(
                "index was built with embedding model '{}' but '{}' is configured",
                self.embed_model, embed_model
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let manifest = Manifest::new(12, "nomic-embed-text", 768);
        manifest.write(&path).unwrap();

        let loaded = Manifest::read(&path).unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.columns, vec!["id", "source", "section_title", "anchor", "text"]);
    }

    #[test]
    fn test_model_mismatch_fails() {
        let manifest = Manifest::new(1, "nomic-embed-text", 768);
        assert!(manifest.check_compatible("nomic-embed-text").is_ok());
        assert!(matches!(
            manifest.check_compatible("all-minilm"),
            Err(Error::ManifestMismatch(_))
        ));
    }

    #[test]
    fn test_schema_mismatch_fails() {
        let mut manifest = Manifest::new(1, "m", 4);
        manifest.schema_version = SCHEMA_VERSION + 1;
        assert!(matches!(
            manifest.check_compatible("m"),
            Err(Error::ManifestMismatch(_))
        ));
    }

    #[test]
    fn test_corrupt_manifest_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Manifest::read(&path), Err(Error::IndexLoad(_))));
    }
}
