//! rag-core: document ingestion and hybrid retrieval service
//!
//! This crate implements the retrieval half of a RAG system: multi-format
//! document ingestion with content-fingerprint deduplication, token-based
//! chunking, and hybrid (vector + BM25) retrieval with optional
//! timeout-bounded cross-encoder reranking. Embeddings, the vector index,
//! and the reranker are pluggable collaborators behind provider traits.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

#[cfg(test)]
pub mod test_support;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document, FileType, Page},
    query::{MetadataFilter, QueryRequest},
    response::{IngestResponse, QueryResponse, QueryResult},
};
