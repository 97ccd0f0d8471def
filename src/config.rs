//! Configuration for the retrieval service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Reranker configuration
    #[serde(default)]
    pub rerank: RerankConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Warm the embedding model in the background at startup
    #[serde(default = "default_warmup_models")]
    pub warmup_models: bool,
}

impl RagConfig {
    /// Load configuration from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
            }
            None => Ok(Self::default()),
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            rerank: RerankConfig::default(),
            storage: StorageConfig::default(),
            warmup_models: default_warmup_models(),
        }
    }
}

fn default_warmup_models() -> bool {
    true
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in megabytes
    pub max_upload_mb: usize,
}

impl ServerConfig {
    /// Maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_mb: 25,
        }
    }
}

/// Embedding service configuration (Ollama-compatible HTTP endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding server
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            timeout_secs: 120,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in tokens
    pub chunk_size: usize,
    /// Overlap between chunks in tokens
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 75,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of results per query
    pub top_k: usize,
    /// Enable hybrid (vector + BM25) retrieval by default
    pub hybrid_enabled: bool,
    /// Weight of the vector similarity in hybrid fusion (0.0-1.0)
    pub hybrid_weight: f32,
    /// Working-set size for hybrid and rerank candidate fetches
    pub hybrid_topn: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            hybrid_enabled: false,
            hybrid_weight: 0.6,
            hybrid_topn: 50,
        }
    }
}

/// Reranker configuration (cross-encoder scoring service)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    /// Base URL of the reranker scoring server
    pub base_url: String,
    /// Reranker model name
    pub model: String,
    /// Hard wall-clock budget for a rerank pass, in seconds
    pub timeout_secs: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            model: "BAAI/bge-reranker-v2-m3".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite document/chunk database
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let database_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rag-core")
            .join("documents.db");

        Self { database_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_settings() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 75);
        assert_eq!(config.retrieval.top_k, 5);
        assert!(!config.retrieval.hybrid_enabled);
        assert_eq!(config.retrieval.hybrid_topn, 50);
        assert_eq!(config.rerank.timeout_secs, 10);
        assert_eq!(config.server.max_upload_mb, 25);
        assert!(config.warmup_models);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: RagConfig = toml::from_str(
            r#"
            [retrieval]
            top_k = 8
            hybrid_enabled = true
            hybrid_weight = 0.5
            hybrid_topn = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.retrieval.top_k, 8);
        assert!(config.retrieval.hybrid_enabled);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.server.port, 8000);
    }
}
