//! Retrieval: lexical scoring, score fusion, reranking, and orchestration

pub mod bm25;
pub mod fusion;
pub mod rerank;
pub mod retriever;

pub use rerank::RerankOrchestrator;
pub use retriever::Retriever;

use crate::providers::ChunkMetadata;

/// A retrieval candidate as it moves through the ranking stages.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Passage text
    pub text: String,
    /// Raw vector index distance (lower is better)
    pub distance: f32,
    /// Fused hybrid score, set when hybrid ranking ran
    pub fused_score: Option<f32>,
    /// Cross-encoder score, set when reranking succeeded
    pub rerank_score: Option<f32>,
    /// Chunk metadata
    pub metadata: ChunkMetadata,
}

impl Candidate {
    /// The score reported to the caller: the most refined one available.
    ///
    /// Falls back to the raw distance, which still orders results even
    /// though it points the other way.
    pub fn effective_score(&self) -> f32 {
        self.rerank_score
            .or(self.fused_score)
            .unwrap_or(self.distance)
    }
}

impl From<crate::providers::ScoredText> for Candidate {
    fn from(hit: crate::providers::ScoredText) -> Self {
        Self {
            text: hit.text,
            distance: hit.distance,
            fused_score: None,
            rerank_score: None,
            metadata: hit.metadata,
        }
    }
}
