//! Retrieval server binary
//!
//! Run with: cargo run --bin rag-core-server
//! Set RAG_CONFIG to point at a TOML config file.

use std::path::PathBuf;

use rag_core::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os("RAG_CONFIG").map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embedding.model);
    tracing::info!("  - Embedding dimensions: {}", config.embedding.dimensions);
    tracing::info!("  - Chunk size: {} tokens", config.chunking.chunk_size);
    tracing::info!("  - Chunk overlap: {} tokens", config.chunking.chunk_overlap);
    tracing::info!("  - Hybrid retrieval: {}", config.retrieval.hybrid_enabled);
    tracing::info!("  - Database: {}", config.storage.database_path.display());

    let server = RagServer::new(config).await?;

    tracing::info!("API: http://{}/api", server.address());
    tracing::info!("Health: http://{}/health", server.address());

    server.start().await?;

    Ok(())
}
