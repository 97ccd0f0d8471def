//! Timeout-bounded cross-encoder reranking
//!
//! Reranking is strictly best-effort: whatever goes wrong, the caller gets
//! its candidates back in the order it supplied them, and the failure is
//! counted. The provider call runs on its own task so an elapsed timeout
//! can abort it instead of leaving it running detached.

use std::sync::Arc;
use std::time::Duration;

use crate::metrics::CounterRegistry;
use crate::providers::RerankProvider;

use super::Candidate;

/// Runs the rerank provider under a wall-clock budget.
pub struct RerankOrchestrator {
    provider: Arc<dyn RerankProvider>,
    timeout: Duration,
    counters: Arc<CounterRegistry>,
}

impl RerankOrchestrator {
    pub fn new(
        provider: Arc<dyn RerankProvider>,
        timeout: Duration,
        counters: Arc<CounterRegistry>,
    ) -> Self {
        Self {
            provider,
            timeout,
            counters,
        }
    }

    /// Re-score candidates pairwise against the query and sort descending.
    ///
    /// On provider error, score-count mismatch, join failure, or timeout
    /// the input ordering is returned unchanged and the failure counter
    /// for this provider is incremented exactly once.
    pub async fn rerank(&self, query: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
        if candidates.is_empty() {
            return candidates;
        }

        let provider = self.provider.clone();
        let component = provider.name().to_string();
        let query = query.to_string();
        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let expected = texts.len();

        let mut handle = tokio::spawn(async move { provider.score_pairs(&query, &texts).await });

        let scores = match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(Ok(scores))) if scores.len() == expected => scores,
            Ok(Ok(Ok(scores))) => {
                tracing::warn!(
                    %component,
                    expected,
                    received = scores.len(),
                    "Reranker returned misaligned scores, keeping original order"
                );
                return self.fail(&component, candidates);
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!(%component, error = %e, "Rerank failed, keeping original order");
                return self.fail(&component, candidates);
            }
            Ok(Err(e)) => {
                tracing::warn!(%component, error = %e, "Rerank task panicked, keeping original order");
                return self.fail(&component, candidates);
            }
            Err(_) => {
                handle.abort();
                tracing::warn!(
                    %component,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Rerank timed out, keeping original order"
                );
                return self.fail(&component, candidates);
            }
        };

        let mut reranked = candidates;
        for (candidate, score) in reranked.iter_mut().zip(scores) {
            candidate.rerank_score = Some(score);
        }
        reranked.sort_by(|a, b| {
            b.rerank_score
                .partial_cmp(&a.rerank_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        reranked
    }

    fn fail(&self, component: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
        self.counters.inc_rerank_failure(component);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::providers::ChunkMetadata;
    use async_trait::async_trait;

    struct FixedReranker {
        scores: Vec<f32>,
    }

    #[async_trait]
    impl RerankProvider for FixedReranker {
        async fn score_pairs(&self, _query: &str, _texts: &[String]) -> Result<Vec<f32>> {
            Ok(self.scores.clone())
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingReranker;

    #[async_trait]
    impl RerankProvider for FailingReranker {
        async fn score_pairs(&self, _query: &str, _texts: &[String]) -> Result<Vec<f32>> {
            Err(Error::internal("scoring backend unavailable"))
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SlowReranker;

    #[async_trait]
    impl RerankProvider for SlowReranker {
        async fn score_pairs(&self, _query: &str, texts: &[String]) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![0.0; texts.len()])
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "slow"
        }
    }

    fn candidates(texts: &[&str]) -> Vec<Candidate> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Candidate {
                text: t.to_string(),
                distance: i as f32 * 0.1,
                fused_score: None,
                rerank_score: None,
                metadata: ChunkMetadata::default(),
            })
            .collect()
    }

    #[tokio::test]
    async fn successful_rerank_sorts_by_score() {
        let counters = Arc::new(CounterRegistry::new());
        let orchestrator = RerankOrchestrator::new(
            Arc::new(FixedReranker {
                scores: vec![0.1, 0.9, 0.5],
            }),
            Duration::from_secs(5),
            counters.clone(),
        );

        let out = orchestrator.rerank("q", candidates(&["a", "b", "c"])).await;
        let texts: Vec<&str> = out.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "a"]);
        assert_eq!(counters.rerank_failures("fixed"), 0);
    }

    #[tokio::test]
    async fn provider_error_falls_back_and_counts_once() {
        let counters = Arc::new(CounterRegistry::new());
        let orchestrator = RerankOrchestrator::new(
            Arc::new(FailingReranker),
            Duration::from_secs(5),
            counters.clone(),
        );

        let out = orchestrator.rerank("q", candidates(&["a", "b"])).await;
        let texts: Vec<&str> = out.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert!(out.iter().all(|c| c.rerank_score.is_none()));
        assert_eq!(counters.rerank_failures("failing"), 1);
    }

    #[tokio::test]
    async fn score_count_mismatch_falls_back() {
        let counters = Arc::new(CounterRegistry::new());
        let orchestrator = RerankOrchestrator::new(
            Arc::new(FixedReranker {
                scores: vec![0.9],
            }),
            Duration::from_secs(5),
            counters.clone(),
        );

        let out = orchestrator.rerank("q", candidates(&["a", "b", "c"])).await;
        let texts: Vec<&str> = out.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_eq!(counters.rerank_failures("fixed"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back_and_counts_once() {
        let counters = Arc::new(CounterRegistry::new());
        let orchestrator = RerankOrchestrator::new(
            Arc::new(SlowReranker),
            Duration::from_millis(100),
            counters.clone(),
        );

        let out = orchestrator.rerank("q", candidates(&["a", "b"])).await;
        let texts: Vec<&str> = out.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(counters.rerank_failures("slow"), 1);
    }

    #[tokio::test]
    async fn empty_candidates_skip_the_provider() {
        let counters = Arc::new(CounterRegistry::new());
        let orchestrator = RerankOrchestrator::new(
            Arc::new(FailingReranker),
            Duration::from_secs(5),
            counters.clone(),
        );

        let out = orchestrator.rerank("q", Vec::new()).await;
        assert!(out.is_empty());
        assert_eq!(counters.rerank_failures("failing"), 0);
    }
}
