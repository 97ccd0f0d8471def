//! Provider abstractions for the external collaborators of the retrieval core
//!
//! The core never inspects embedding vectors or index internals; it talks to
//! these traits. Local implementations (Ollama embeddings, an in-process
//! cosine index, an HTTP cross-encoder) live alongside the traits.

pub mod embedding;
pub mod local;
pub mod ollama;
pub mod reranker;
pub mod vector_index;

pub use embedding::EmbeddingProvider;
pub use local::LocalVectorIndex;
pub use ollama::OllamaEmbedder;
pub use reranker::{HttpReranker, RerankProvider};
pub use vector_index::{ChunkMetadata, IndexEntry, ScoredText, VectorIndexProvider};
