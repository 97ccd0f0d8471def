//! Core types for the retrieval service

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, FileType, Page};
pub use query::{MetadataFilter, QueryRequest};
pub use response::{DocumentItem, IngestResponse, IngestStats, QueryResponse, QueryResult};
