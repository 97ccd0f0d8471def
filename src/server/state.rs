//! Shared application state

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RagConfig;
use crate::error::Result;
use crate::ingestion::{Chunker, IngestPipeline};
use crate::metrics;
use crate::providers::{
    EmbeddingProvider, HttpReranker, LocalVectorIndex, OllamaEmbedder, VectorIndexProvider,
};
use crate::retrieval::{RerankOrchestrator, Retriever};
use crate::storage::DocumentDb;

/// Embedding model warm-up state, reported by `/ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelReadiness {
    /// Warm-up has not started
    NotReady,
    /// Warm-up is in flight
    Warming,
    /// A throwaway embedding round-tripped successfully
    Ready,
}

impl ModelReadiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::Warming => "warming",
            Self::Ready => "ready",
        }
    }
}

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    db: Arc<DocumentDb>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndexProvider>,
    pipeline: IngestPipeline,
    retriever: Retriever,
    readiness: RwLock<ModelReadiness>,
}

impl AppState {
    /// Wire up providers, storage, and the pipelines from config.
    pub async fn new(config: RagConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OllamaEmbedder::new(&config.embedding));
        let index: Arc<dyn VectorIndexProvider> =
            Arc::new(LocalVectorIndex::new(embedder.clone()));
        let db = Arc::new(DocumentDb::new(&config.storage.database_path)?);

        let chunker = Chunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        let pipeline = IngestPipeline::new(db.clone(), index.clone(), chunker);

        let reranker = RerankOrchestrator::new(
            Arc::new(HttpReranker::new(&config.rerank)),
            Duration::from_secs(config.rerank.timeout_secs),
            metrics::global(),
        );
        let retriever = Retriever::new(index.clone(), reranker, config.retrieval.clone());

        // Without warm-up there is nothing to wait for.
        let readiness = if config.warmup_models {
            ModelReadiness::NotReady
        } else {
            ModelReadiness::Ready
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                embedder,
                index,
                pipeline,
                retriever,
                readiness: RwLock::new(readiness),
            }),
        })
    }

    /// Warm the embedding model in the background.
    ///
    /// Readiness moves NotReady -> Warming immediately and Warming -> Ready
    /// only when a probe embedding succeeds. Requests are served regardless;
    /// readiness is advisory for orchestration.
    pub fn spawn_warmup(&self) {
        if !self.inner.config.warmup_models {
            return;
        }
        *self.inner.readiness.write() = ModelReadiness::Warming;

        let state = self.clone();
        tokio::spawn(async move {
            let model = state.inner.config.embedding.model.clone();
            tracing::info!(%model, "Warming embedding model");
            match state.inner.embedder.embed("warmup").await {
                Ok(_) => {
                    *state.inner.readiness.write() = ModelReadiness::Ready;
                    tracing::info!(%model, "Embedding model ready");
                }
                Err(e) => {
                    tracing::warn!(%model, error = %e, "Embedding warm-up failed");
                }
            }
        });
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn db(&self) -> &DocumentDb {
        &self.inner.db
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    pub fn index(&self) -> &Arc<dyn VectorIndexProvider> {
        &self.inner.index
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    pub fn retriever(&self) -> &Retriever {
        &self.inner.retriever
    }

    pub fn readiness(&self) -> ModelReadiness {
        *self.inner.readiness.read()
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == ModelReadiness::Ready
    }
}
