//! In-process vector index with brute-force cosine search
//!
//! Default backend for single-node deployments and tests. Embeds through an
//! [`EmbeddingProvider`] and scans linearly; swap in an ANN-backed provider
//! behind the same trait for large corpora.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::query::MetadataFilter;

use super::embedding::EmbeddingProvider;
use super::vector_index::{ChunkMetadata, IndexEntry, ScoredText, VectorIndexProvider};

struct StoredEntry {
    text: String,
    embedding: Vec<f32>,
    metadata: ChunkMetadata,
}

/// Brute-force cosine-distance vector index.
pub struct LocalVectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<StoredEntry>>,
}

impl LocalVectorIndex {
    /// Create an empty index over the given embedder.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorIndexProvider for LocalVectorIndex {
    async fn add_entries(&self, entries: &[IndexEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != entries.len() {
            return Err(Error::vector_index(format!(
                "Embedder returned {} vectors for {} texts",
                embeddings.len(),
                entries.len()
            )));
        }

        let mut store = self.entries.write();
        for (entry, embedding) in entries.iter().zip(embeddings) {
            store.push(StoredEntry {
                text: entry.text.clone(),
                embedding,
                metadata: entry.metadata.clone(),
            });
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredText>> {
        if k == 0 || self.entries.read().is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let entries = self.entries.read();
        let mut hits: Vec<ScoredText> = entries
            .iter()
            .filter(|e| filter.map_or(true, |f| f.matches(&e.metadata)))
            .map(|e| ScoredText {
                text: e.text.clone(),
                metadata: e.metadata.clone(),
                // cosine distance: 0 identical, 2 opposite
                distance: 1.0 - cosine_similarity(&query_embedding, &e.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn delete_by_document(&self, doc_id: &Uuid) -> Result<usize> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.metadata.doc_id != Some(*doc_id));
        Ok(before - entries.len())
    }

    async fn health_check(&self) -> Result<bool> {
        self.embedder.health_check().await
    }

    fn name(&self) -> &str {
        "local"
    }
}
