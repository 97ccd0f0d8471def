//! Per-request retrieval orchestration
//!
//! Every request walks the same sequence: fetch candidates from the vector
//! index, optionally fuse with lexical scores, optionally rerank, truncate.
//! No retrieval state outlives the request.

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::VectorIndexProvider;
use crate::types::{MetadataFilter, QueryRequest, QueryResult};

use super::bm25::bm25_scores;
use super::fusion::fuse;
use super::rerank::RerankOrchestrator;
use super::Candidate;

/// Orchestrates candidate fetch, hybrid fusion, reranking, and truncation.
pub struct Retriever {
    index: Arc<dyn VectorIndexProvider>,
    reranker: RerankOrchestrator,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        index: Arc<dyn VectorIndexProvider>,
        reranker: RerankOrchestrator,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            index,
            reranker,
            config,
        }
    }

    /// Answer one retrieval request with at most `top_k` ranked passages.
    pub async fn retrieve(&self, request: &QueryRequest) -> Result<Vec<QueryResult>> {
        if request.query.trim().is_empty() {
            return Err(Error::invalid_request("query must not be empty"));
        }
        if request.top_k == 0 {
            return Err(Error::invalid_request("top_k must be at least 1"));
        }

        let filter = MetadataFilter::from_request(request)?;
        let hybrid = request.hybrid.unwrap_or(self.config.hybrid_enabled);
        let top_k = request.top_k;
        let hybrid_topn = self.config.hybrid_topn;

        // Fusion and reranking both need a wider pool than top_k to be
        // worth running.
        let fetch_k = if hybrid || request.rerank {
            top_k.max(hybrid_topn)
        } else {
            top_k
        };

        let hits = self.index.search(&request.query, fetch_k, filter.as_ref()).await?;
        let mut candidates: Vec<Candidate> = hits.into_iter().map(Candidate::from).collect();

        if hybrid && !candidates.is_empty() {
            candidates = self
                .fuse_with_lexical(&request.query, candidates, top_k, filter.as_ref())
                .await?;
        }

        if request.rerank {
            candidates = self.reranker.rerank(&request.query, candidates).await;
        }

        candidates.truncate(top_k);
        Ok(candidates.into_iter().map(to_result).collect())
    }

    /// Widen a thin candidate pool, then fuse vector and lexical rankings.
    ///
    /// Widened hits are unioned in (deduplicated by text) before lexical
    /// scoring, so the vector and lexical score sequences cover the same
    /// candidates by construction.
    async fn fuse_with_lexical(
        &self,
        query: &str,
        mut candidates: Vec<Candidate>,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Candidate>> {
        if candidates.len() < top_k.max(10) {
            let widened = self
                .index
                .search(query, self.config.hybrid_topn * 2, filter)
                .await?;
            for hit in widened {
                if !candidates.iter().any(|c| c.text == hit.text) {
                    candidates.push(Candidate::from(hit));
                }
            }
        }

        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let lexical = bm25_scores(query, &texts);
        Ok(fuse(candidates, &lexical, self.config.hybrid_weight))
    }
}

fn to_result(candidate: Candidate) -> QueryResult {
    let score = candidate.effective_score();
    QueryResult {
        text: candidate.text,
        score,
        source: candidate.metadata.source,
        page: candidate.metadata.page,
        section: candidate.metadata.section,
        doc_id: candidate.metadata.doc_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as CrateResult;
    use crate::metrics::CounterRegistry;
    use crate::providers::{ChunkMetadata, IndexEntry, LocalVectorIndex, RerankProvider};
    use crate::test_support::HashingEmbedder;
    use async_trait::async_trait;
    use std::time::Duration;
    use uuid::Uuid;

    struct ReverseReranker;

    #[async_trait]
    impl RerankProvider for ReverseReranker {
        async fn score_pairs(&self, _query: &str, texts: &[String]) -> CrateResult<Vec<f32>> {
            // later candidates score higher
            Ok((0..texts.len()).map(|i| i as f32).collect())
        }
        async fn health_check(&self) -> CrateResult<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "reverse"
        }
    }

    async fn retriever_with(entries: &[(&str, Uuid)], config: RetrievalConfig) -> Retriever {
        let index = Arc::new(LocalVectorIndex::new(Arc::new(HashingEmbedder::default())));
        let batch: Vec<IndexEntry> = entries
            .iter()
            .map(|(text, doc)| IndexEntry {
                text: text.to_string(),
                metadata: ChunkMetadata {
                    doc_id: Some(*doc),
                    source: Some("txt".to_string()),
                    page: None,
                    section: None,
                },
            })
            .collect();
        index.add_entries(&batch).await.unwrap();

        let reranker = RerankOrchestrator::new(
            Arc::new(ReverseReranker),
            Duration::from_secs(5),
            Arc::new(CounterRegistry::new()),
        );
        Retriever::new(index, reranker, config)
    }

    fn request(query: &str) -> QueryRequest {
        QueryRequest::new(query)
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_any_fetch() {
        let retriever = retriever_with(&[], RetrievalConfig::default()).await;
        let err = retriever.retrieve(&request("   ")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn zero_top_k_is_rejected() {
        let retriever = retriever_with(&[], RetrievalConfig::default()).await;
        let err = retriever
            .retrieve(&request("hello").with_top_k(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn results_are_truncated_to_top_k() {
        let doc = Uuid::new_v4();
        let entries: Vec<(String, Uuid)> = (0..8).map(|i| (format!("passage number {}", i), doc)).collect();
        let refs: Vec<(&str, Uuid)> = entries.iter().map(|(t, d)| (t.as_str(), *d)).collect();
        let retriever = retriever_with(&refs, RetrievalConfig::default()).await;

        let results = retriever
            .retrieve(&request("passage").with_top_k(3))
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn document_filter_limits_results() {
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();
        let retriever = retriever_with(
            &[("shared wording", doc_a), ("shared wording too", doc_b)],
            RetrievalConfig::default(),
        )
        .await;

        let mut req = request("shared");
        req.doc_id = Some(doc_a.to_string());
        let results = retriever.retrieve(&req).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.doc_id == Some(doc_a)));
    }

    #[tokio::test]
    async fn hybrid_sets_fused_ordering() {
        let doc = Uuid::new_v4();
        let retriever = retriever_with(
            &[
                ("Python is a programming language.", doc),
                ("FastAPI is a Python framework.", doc),
                ("Entirely unrelated musings about gardening.", doc),
            ],
            RetrievalConfig {
                hybrid_enabled: false,
                ..Default::default()
            },
        )
        .await;

        let results = retriever
            .retrieve(&request("What is FastAPI?").with_top_k(3).with_hybrid(true))
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().any(|r| r.text.contains("FastAPI")));
    }

    #[tokio::test]
    async fn rerank_reorders_candidates() {
        let doc = Uuid::new_v4();
        let retriever = retriever_with(
            &[("alpha passage", doc), ("beta passage", doc)],
            RetrievalConfig::default(),
        )
        .await;

        let plain = retriever
            .retrieve(&request("alpha passage").with_top_k(2))
            .await
            .unwrap();
        let reranked = retriever
            .retrieve(&request("alpha passage").with_top_k(2).with_rerank())
            .await
            .unwrap();

        // the reverse reranker flips whatever the vector ranking produced
        assert_eq!(reranked[0].text, plain[plain.len() - 1].text);
    }

    #[tokio::test]
    async fn ingest_then_query_end_to_end() {
        use crate::ingestion::{Chunker, IngestPipeline};
        use crate::storage::DocumentDb;

        let index = Arc::new(LocalVectorIndex::new(Arc::new(HashingEmbedder::default())));
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        let pipeline = IngestPipeline::new(
            db,
            index.clone(),
            Chunker::new(500, 75).unwrap(),
        );

        pipeline
            .ingest(
                "intro.txt",
                Some("text/plain"),
                b"Python is a programming language. FastAPI is a Python framework.",
            )
            .await
            .unwrap();

        let reranker = RerankOrchestrator::new(
            Arc::new(ReverseReranker),
            Duration::from_secs(5),
            Arc::new(CounterRegistry::new()),
        );
        let retriever = Retriever::new(index, reranker, RetrievalConfig::default());

        let results = retriever
            .retrieve(&request("What is FastAPI?").with_top_k(3))
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 3);
        assert!(results.iter().any(|r| r.text.contains("FastAPI")));
        assert_eq!(results[0].source.as_deref(), Some("txt"));
    }

    #[tokio::test]
    async fn empty_index_returns_no_results() {
        let retriever = retriever_with(&[], RetrievalConfig::default()).await;
        let results = retriever.retrieve(&request("anything")).await.unwrap();
        assert!(results.is_empty());
    }
}
