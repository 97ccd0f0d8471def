//! Cross-encoder reranking provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::RerankConfig;
use crate::error::{Error, Result};

/// Trait for pairwise (query, candidate) relevance scoring.
///
/// Returns one score per candidate text, same order as the input.
#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Score each candidate text against the query.
    async fn score_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>>;

    /// Check whether the provider is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Rerank provider backed by an HTTP cross-encoder scoring service.
///
/// The service contract: `POST /rerank` with `{model, query, documents}`
/// returns `{"scores": [f32]}` aligned with the input documents.
pub struct HttpReranker {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    scores: Vec<f32>,
}

impl HttpReranker {
    /// Create a new reranker client from config.
    ///
    /// The HTTP client carries no request timeout of its own; the rerank
    /// orchestrator enforces the wall-clock budget and aborts the task.
    pub fn new(config: &RerankConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl RerankProvider for HttpReranker {
    async fn score_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/rerank", self.base_url))
            .json(&json!({
                "model": self.model,
                "query": query,
                "documents": texts,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::internal(format!(
                "Reranker returned {}",
                response.status()
            )));
        }

        let body: RerankResponse = response.json().await?;
        Ok(body.scores)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await;
        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }

    fn name(&self) -> &str {
        "cross_encoder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RerankConfig;

    #[tokio::test]
    async fn unreachable_server_surfaces_http_error() {
        // port 1 is never listening; the connection is refused immediately
        let reranker = HttpReranker::new(&RerankConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        });

        let err = reranker
            .score_pairs("q", &["a".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
