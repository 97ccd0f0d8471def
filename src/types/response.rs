//! Response types for the HTTP surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response to a document ingestion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// The stored (or pre-existing) document id
    pub doc_id: Uuid,
    /// Chunk/token statistics
    pub stats: IngestStats,
}

/// Ingestion statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of chunks the document currently has
    pub chunks: u64,
    /// Approximate token count; absent on duplicate short-circuit
    pub tokens: Option<u64>,
}

/// A single ranked passage returned by retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Passage text
    pub text: String,
    /// Final ranking score (raw index score, fused score, or rerank score)
    pub score: f32,
    /// Source tag of the originating file ("pdf", "docx", "txt")
    pub source: Option<String>,
    /// Page number in the originating document
    pub page: Option<u32>,
    /// Section label, when the source carried one
    pub section: Option<String>,
    /// Owning document id
    pub doc_id: Option<Uuid>,
}

/// Response to a retrieval query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Ranked passages, best first, at most `top_k`
    pub results: Vec<QueryResult>,
}

/// A document listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentItem {
    /// Document id
    pub id: Uuid,
    /// Original filename
    pub filename: String,
    /// Ingestion timestamp (RFC 3339)
    pub created_at: String,
    /// Number of chunks owned by this document
    pub chunks: u64,
    /// File size in bytes
    pub size: u64,
}
