//! Ingestion pipeline orchestration

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::index::l2_normalize;
use crate::retrieval::FlatIndex;
use crate::storage::{Manifest, MetadataStore, StagingArea};
use crate::types::ChunkFields;

use super::chunker::MarkdownChunker;
use super::source::DocumentSource;

/// Outcome of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Documents that were chunked
    pub documents: usize,
    /// Documents skipped as unsupported or unreadable
    pub skipped: usize,
    /// Chunks written to the index
    pub chunks: usize,
    /// Embedding dimension of the index
    pub dimensions: usize,
    /// Committed index directory
    pub index_dir: PathBuf,
}

/// Main ingestion pipeline
///
/// Every chunk is embedded before anything is written; the new index is
/// assembled in a staging directory and swapped in only once complete.
pub struct IngestPipeline {
    chunker: MarkdownChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index_dir: PathBuf,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(config: &RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            chunker: MarkdownChunker::new(config.chunking),
            embedder,
            index_dir: config.storage.index_dir.clone(),
        }
    }

    /// Chunk every usable document of `source`, in source order
    ///
    /// Returns the chunks plus the number of documents used and skipped.
    pub fn collect_chunks(
        &self,
        source: &dyn DocumentSource,
    ) -> Result<(Vec<ChunkFields>, usize, usize)> {
        let mut chunks = Vec::new();
        let mut documents = 0;
        let mut skipped = 0;

        for doc in source.documents()? {
            match doc {
                Ok(doc) => {
                    let doc_chunks = self.chunker.chunk_document(&doc);
                    tracing::debug!("{}: {} chunks", doc.source_id, doc_chunks.len());
                    chunks.extend(doc_chunks);
                    documents += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping document: {}", e);
                    skipped += 1;
                }
            }
        }

        Ok((chunks, documents, skipped))
    }

    /// Rebuild the index from `source`
    ///
    /// Any embedding failure aborts the run and leaves the previously
    /// committed index untouched.
    pub async fn run(&self, source: &dyn DocumentSource) -> Result<IngestReport> {
        let (chunks, documents, skipped) = self.collect_chunks(source)?;
        if chunks.is_empty() {
            return Err(Error::NoContext(format!(
                "no chunks produced from {} documents ({} skipped)",
                documents, skipped
            )));
        }

        tracing::info!(
            "Embedding {} chunks from {} documents with {} ({})",
            chunks.len(),
            documents,
            self.embedder.model(),
            self.embedder.name()
        );
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        // Stored vectors are unit length so inner product is cosine
        let embeddings: Vec<Vec<f32>> = self
            .embedder
            .embed_batch(&texts)
            .await?
            .into_iter()
            .map(l2_normalize)
            .collect();
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "Provider returned {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or_default();
        let mut index = FlatIndex::build(dimensions)?;
        for embedding in &embeddings {
            index.add(embedding)?;
        }

        let staging = StagingArea::new(&self.index_dir)?;
        let paths = staging.paths();
        {
            let store = MetadataStore::rebuild(&paths.chunks_db)?;
            let ids = store.insert_all(&chunks)?;
            if let Some((ordinal, id)) = ids
                .iter()
                .enumerate()
                .find(|(ordinal, id)| **id != *ordinal as i64 + 1)
            {
                return Err(Error::internal(format!(
                    "Metadata id {} does not match index ordinal {}",
                    id, ordinal
                )));
            }
        }
        index.save(&paths.vectors)?;
        Manifest::new(chunks.len(), self.embedder.model(), dimensions).write(&paths.manifest)?;

        let committed = staging.commit()?;
        tracing::info!("Indexed {} chunks.", chunks.len());

        Ok(IngestReport {
            documents,
            skipped,
            chunks: chunks.len(),
            dimensions,
            index_dir: committed.dir,
        })
    }
}
