//! Vector index provider trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::types::query::MetadataFilter;

/// Metadata carried with every indexed chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Owning document id
    pub doc_id: Option<Uuid>,
    /// Source tag of the originating file
    pub source: Option<String>,
    /// Page number in the originating document
    pub page: Option<u32>,
    /// Section label
    pub section: Option<String>,
}

/// A text unit to be indexed
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Chunk text
    pub text: String,
    /// Chunk metadata, used for filtered search
    pub metadata: ChunkMetadata,
}

/// A search hit from the vector index
#[derive(Debug, Clone)]
pub struct ScoredText {
    /// Chunk text
    pub text: String,
    /// Chunk metadata
    pub metadata: ChunkMetadata,
    /// Distance in the index's own metric; lower is better
    pub distance: f32,
}

/// Trait for the persistent vector index and its filtered nearest-neighbor
/// search. The core only sees texts, metadata, and distances.
#[async_trait]
pub trait VectorIndexProvider: Send + Sync {
    /// Index a batch of entries.
    async fn add_entries(&self, entries: &[IndexEntry]) -> Result<()>;

    /// Search for the `k` nearest entries to the query text, best first,
    /// restricted to entries matching `filter` when one is given.
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredText>>;

    /// Remove all entries belonging to a document. Returns the removed count.
    async fn delete_by_document(&self, doc_id: &Uuid) -> Result<usize>;

    /// Check whether the index is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
