//! Loaded metadata store, vector index and manifest

use std::path::Path;

use crate::error::{Error, Result};
use crate::storage::{IndexPaths, Manifest, MetadataStore};
use crate::types::Chunk;

use super::index::FlatIndex;

/// Read-only pairing of a metadata store and vector index
///
/// Index ordinal `p` and store id `p + 1` always refer to the same chunk.
pub struct KnowledgeBase {
    store: MetadataStore,
    index: FlatIndex,
    manifest: Manifest,
}

impl KnowledgeBase {
    /// Load an index directory built for `embed_model`
    ///
    /// Fails on missing or corrupt artifacts, on a manifest written for a
    /// different schema or embedding model, and on any count disagreement.
    pub fn open(index_dir: impl AsRef<Path>, embed_model: &str) -> Result<Self> {
        let paths = IndexPaths::new(index_dir);
        let missing = paths.missing();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(Error::index_load(format!(
                "missing artifacts: {} (run ingestion first)",
                names.join(", ")
            )));
        }

        let manifest = Manifest::read(&paths.manifest)?;
        manifest.check_compatible(embed_model)?;

        let store = MetadataStore::open(&paths.chunks_db)?;
        let index = FlatIndex::load(&paths.vectors)?;

        let kb = Self::from_parts(store, index, manifest)?;
        tracing::info!(
            "Loaded index from {} ({} chunks, model {}, {} dims)",
            paths.dir.display(),
            kb.len(),
            kb.manifest.embed_model,
            kb.manifest.dimensions
        );
        Ok(kb)
    }

    /// Pair an already-built store and index
    pub fn from_parts(store: MetadataStore, index: FlatIndex, manifest: Manifest) -> Result<Self> {
        let rows = store.count()?;
        if rows != index.len() || rows != manifest.count {
            return Err(Error::manifest_mismatch(format!(
                "metadata has {} rows, index has {} vectors, manifest records {}",
                rows,
                index.len(),
                manifest.count
            )));
        }
        if index.dimensions() != manifest.dimensions {
            return Err(Error::manifest_mismatch(format!(
                "index dimension {} differs from manifest dimension {}",
                index.dimensions(),
                manifest.dimensions
            )));
        }

        Ok(Self {
            store,
            index,
            manifest,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Nearest ordinals for a query embedding
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.index.search(query, k)
    }

    /// Chunk stored for index ordinal `ordinal`
    pub fn chunk_for_ordinal(&self, ordinal: usize) -> Result<Option<Chunk>> {
        self.store.get(ordinal as i64 + 1)
    }
}
