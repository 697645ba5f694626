//! Query-time retrieval: embed, search, hydrate, rank

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::RetrievalResult;

use super::index::l2_normalize;
use super::knowledge_base::KnowledgeBase;

/// Finds the passages most relevant to a question
///
/// Cheap to clone; every call reads the shared, immutable knowledge base.
#[derive(Clone)]
pub struct Retriever {
    knowledge_base: Arc<KnowledgeBase>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever, failing if the index was built with another embedding model
    pub fn new(
        knowledge_base: Arc<KnowledgeBase>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Result<Self> {
        knowledge_base.manifest().check_compatible(embedder.model())?;
        Ok(Self {
            knowledge_base,
            embedder,
            top_k,
        })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge_base
    }

    /// Retrieve with the configured `top_k`
    pub async fn retrieve_default(&self, question: &str) -> Result<Vec<RetrievalResult>> {
        self.retrieve(question, self.top_k).await
    }

    /// At most `k` results ranked 1, 2, … by non-increasing score
    ///
    /// An empty result is not an error. Ordinals whose chunk cannot be
    /// hydrated are left out and the remaining results are re-ranked.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if k == 0 || self.knowledge_base.is_empty() {
            return Ok(Vec::new());
        }

        let query = l2_normalize(self.embedder.embed(question).await?);

        let kb = Arc::clone(&self.knowledge_base);
        let results = tokio::task::spawn_blocking(move || -> Result<Vec<RetrievalResult>> {
            let hits = kb.search(&query, k)?;
            let mut results = Vec::with_capacity(hits.len());
            for (ordinal, score) in hits {
                match kb.chunk_for_ordinal(ordinal)? {
                    Some(chunk) => results.push(RetrievalResult {
                        rank: results.len() + 1,
                        chunk,
                        score,
                    }),
                    None => tracing::warn!("No metadata row for index ordinal {}", ordinal),
                }
            }
            Ok(results)
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

        tracing::debug!("Retrieved {} passages for k={}", results.len(), k);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::FlatIndex;
    use crate::storage::{Manifest, MetadataStore};
    use crate::types::ChunkFields;
    use async_trait::async_trait;
    use rusqlite::Connection;

    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn model(&self) -> &str {
            "axis"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "axis"
        }
    }

    /// Store holding ids 1 and 3, so ordinal 1 has no row
    fn gapped_store(dir: &std::path::Path) -> MetadataStore {
        let path = dir.join("chunks.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE chunks (
                id INTEGER PRIMARY KEY,
                source TEXT NOT NULL,
                section_title TEXT NOT NULL,
                anchor TEXT NOT NULL,
                text TEXT NOT NULL
            );
            INSERT INTO chunks VALUES (1, 'a.md', 'A', 'a', 'first');
            INSERT INTO chunks VALUES (3, 'c.md', 'C', 'c', 'third');",
        )
        .unwrap();
        drop(conn);
        MetadataStore::open(&path).unwrap()
    }

    #[tokio::test]
    async fn test_missing_row_is_dropped_and_reranked() {
        let dir = tempfile::tempdir().unwrap();
        let store = gapped_store(dir.path());

        let mut index = FlatIndex::build(2).unwrap();
        index.add(&[0.6, 0.8]).unwrap();
        // Scores highest but maps to the absent id 2
        index.add(&[1.0, 0.0]).unwrap();

        let kb = KnowledgeBase::from_parts(store, index, Manifest::new(2, "axis", 2)).unwrap();
        let retriever = Retriever::new(Arc::new(kb), Arc::new(AxisEmbedder), 2).unwrap();

        let results = retriever.retrieve("anything", 2).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, 1);
        assert_eq!(results[0].rank, 1);
        assert!((results[0].score - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_concurrent_retrieval() {
        let store = MetadataStore::in_memory().unwrap();
        let mut index = FlatIndex::build(2).unwrap();
        for (i, v) in [[1.0, 0.0], [0.6, 0.8], [0.0, 1.0]].iter().enumerate() {
            store
                .insert(&ChunkFields {
                    source_id: format!("{}.md", i),
                    section_title: String::new(),
                    anchor: String::new(),
                    text: format!("chunk {}", i),
                })
                .unwrap();
            index.add(v).unwrap();
        }
        let kb = KnowledgeBase::from_parts(store, index, Manifest::new(3, "axis", 2)).unwrap();
        let retriever = Retriever::new(Arc::new(kb), Arc::new(AxisEmbedder), 3).unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let retriever = retriever.clone();
                tokio::spawn(async move { retriever.retrieve("q", 3).await })
            })
            .collect();

        for outcome in futures::future::join_all(handles).await {
            let results = outcome.unwrap().unwrap();
            let ids: Vec<i64> = results.iter().map(|r| r.chunk.id).collect();
            assert_eq!(ids, vec![1, 2, 3]);
        }
    }
}
