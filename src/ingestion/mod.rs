//! Document ingestion: parsing, chunking, and the dedup pipeline

pub mod chunker;
pub mod parser;
pub mod pipeline;

pub use chunker::Chunker;
pub use parser::FileParser;
pub use pipeline::{IngestOutcome, IngestPipeline};
