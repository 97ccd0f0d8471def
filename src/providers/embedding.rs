//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for turning text into fixed-length float vectors.
///
/// The retrieval core treats the vector itself as opaque.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Default implementation calls `embed` sequentially; implementations
    /// with native batching should override.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Check whether the provider is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
