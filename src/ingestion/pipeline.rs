//! Ingestion pipeline: fingerprint, parse, chunk, persist, index

use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ingestion::chunker::Chunker;
use crate::ingestion::parser::FileParser;
use crate::providers::{ChunkMetadata, IndexEntry, VectorIndexProvider};
use crate::storage::DocumentDb;
use crate::types::{Chunk, Document, FileType};

/// SHA-256 hex fingerprint of raw uploaded bytes.
///
/// Computed before parsing so byte-identical uploads collide regardless of
/// filename or declared content type.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Result of an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The stored (or pre-existing) document
    pub document: Document,
    /// Chunks the document currently has
    pub chunks: u64,
    /// Approximate token count; absent when deduplicated
    pub tokens: Option<u64>,
    /// Whether an existing document was returned instead of a new one
    pub deduplicated: bool,
}

/// Orchestrates the full ingestion path for one uploaded file.
pub struct IngestPipeline {
    db: Arc<DocumentDb>,
    index: Arc<dyn VectorIndexProvider>,
    chunker: Chunker,
}

impl IngestPipeline {
    pub fn new(db: Arc<DocumentDb>, index: Arc<dyn VectorIndexProvider>, chunker: Chunker) -> Self {
        Self { db, index, chunker }
    }

    /// Ingest one uploaded file.
    ///
    /// A fingerprint hit short-circuits before any parsing or chunking and
    /// returns the existing document. A constraint violation at insert time
    /// means a concurrent identical upload won the race; that also resolves
    /// to the existing document.
    pub async fn ingest(
        &self,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<IngestOutcome> {
        let fingerprint = fingerprint(data);

        if let Some(existing) = self.db.find_by_fingerprint(&fingerprint)? {
            tracing::info!(
                filename,
                doc_id = %existing.id,
                "Duplicate upload, returning existing document"
            );
            return self.dedup_outcome(existing);
        }

        let file_type = FileType::from_upload(filename, content_type).ok_or_else(|| {
            Error::UnsupportedFileType(format!(
                "{} ({})",
                filename,
                content_type.unwrap_or("unknown content type")
            ))
        })?;

        let pages = FileParser::parse(file_type, filename, data)?;
        let chunks = self.chunker.chunk_pages(&pages);
        let tokens: u64 = pages
            .iter()
            .map(|p| p.content.split_whitespace().count() as u64)
            .sum();

        let document = Document::new(filename.to_string(), fingerprint, data.len() as u64);

        match self.db.insert_document_with_chunks(&document, &chunks) {
            Ok(()) => {}
            Err(Error::DuplicateFingerprint(fp)) => {
                // Lost the race against a concurrent identical upload.
                let existing = self
                    .db
                    .find_by_fingerprint(&fp)?
                    .ok_or_else(|| Error::storage("Duplicate vanished during ingestion"))?;
                return self.dedup_outcome(existing);
            }
            Err(e) => return Err(e),
        }

        // Vector write is best-effort: the relational record stands either
        // way and can be re-indexed later.
        let entries = index_entries(&document, &chunks);
        if let Err(e) = self.index.add_entries(&entries).await {
            tracing::error!(doc_id = %document.id, error = %e, "Vector index write failed");
        }

        tracing::info!(
            filename,
            doc_id = %document.id,
            chunks = chunks.len(),
            tokens,
            "Document ingested"
        );

        Ok(IngestOutcome {
            chunks: chunks.len() as u64,
            tokens: Some(tokens),
            deduplicated: false,
            document,
        })
    }

    fn dedup_outcome(&self, existing: Document) -> Result<IngestOutcome> {
        let chunks = self.db.count_chunks(&existing.id)?;
        Ok(IngestOutcome {
            document: existing,
            chunks,
            tokens: None,
            deduplicated: true,
        })
    }
}

fn index_entries(document: &Document, chunks: &[Chunk]) -> Vec<IndexEntry> {
    chunks
        .iter()
        .map(|chunk| IndexEntry {
            text: chunk.content.clone(),
            metadata: ChunkMetadata {
                doc_id: Some(document.id),
                source: chunk
                    .metadata
                    .get("source")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                page: chunk.page_number,
                section: chunk
                    .metadata
                    .get("section")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
            },
        })
        .collect()
}
