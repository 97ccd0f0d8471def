//! Query request types and metadata filters

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::vector_index::ChunkMetadata;

/// Query request for passage retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The natural-language query
    pub query: String,

    /// Number of passages to return (default: 5)
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Whether to rerank results with the cross-encoder (default: false)
    #[serde(default)]
    pub rerank: bool,

    /// Per-request override of the process-wide hybrid retrieval default
    #[serde(default)]
    pub hybrid: Option<bool>,

    /// Restrict to a single document
    #[serde(default)]
    pub doc_id: Option<String>,

    /// Restrict to a source tag (e.g. "pdf", "txt")
    #[serde(default)]
    pub source: Option<String>,

    /// Restrict to a section label
    #[serde(default)]
    pub section: Option<String>,
}

fn default_top_k() -> usize {
    5
}

impl QueryRequest {
    /// Create a new query with defaults.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: default_top_k(),
            rerank: false,
            hybrid: None,
            doc_id: None,
            source: None,
            section: None,
        }
    }

    /// Set the number of results to return.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Enable cross-encoder reranking.
    pub fn with_rerank(mut self) -> Self {
        self.rerank = true;
        self
    }

    /// Override the hybrid retrieval default.
    pub fn with_hybrid(mut self, hybrid: bool) -> Self {
        self.hybrid = Some(hybrid);
        self
    }
}

/// Index-level metadata filter over the supported filter dimensions.
///
/// Built and validated at the request boundary; collaborating vector indexes
/// receive it instead of a loosely-typed map.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    /// Match chunks belonging to one document
    ByDocument(Uuid),
    /// Match chunks with a given source tag
    BySource(String),
    /// Match chunks with a given section label
    BySection(String),
    /// All inner filters must match
    All(Vec<MetadataFilter>),
}

impl MetadataFilter {
    /// Build a filter from the optional request dimensions.
    ///
    /// Returns `None` when no dimension is set. A malformed document id is an
    /// input validation failure, rejected before any candidate fetch.
    pub fn from_request(request: &QueryRequest) -> Result<Option<Self>> {
        let mut dimensions = Vec::new();

        if let Some(doc_id) = &request.doc_id {
            let id = Uuid::parse_str(doc_id)
                .map_err(|_| Error::invalid_request(format!("Malformed doc_id: {}", doc_id)))?;
            dimensions.push(Self::ByDocument(id));
        }
        if let Some(source) = &request.source {
            dimensions.push(Self::BySource(source.clone()));
        }
        if let Some(section) = &request.section {
            dimensions.push(Self::BySection(section.clone()));
        }

        Ok(match dimensions.len() {
            0 => None,
            1 => dimensions.pop(),
            _ => Some(Self::All(dimensions)),
        })
    }

    /// Whether a chunk's metadata satisfies this filter.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            Self::ByDocument(id) => metadata.doc_id == Some(*id),
            Self::BySource(source) => metadata.source.as_deref() == Some(source.as_str()),
            Self::BySection(section) => metadata.section.as_deref() == Some(section.as_str()),
            Self::All(filters) => filters.iter().all(|f| f.matches(metadata)),
        }
    }
}
