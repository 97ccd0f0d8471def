//! Document, page, and chunk types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Txt,
}

impl FileType {
    /// Detect file type from the uploaded filename and declared content type.
    ///
    /// Extension wins; a missing extension falls back to the content type.
    /// Extensionless uploads with a `text/*` content type (or none at all)
    /// are treated as plain text, matching permissive text ingestion.
    pub fn from_upload(filename: &str, content_type: Option<&str>) -> Option<Self> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => return Some(Self::Pdf),
            "docx" => return Some(Self::Docx),
            "txt" | "text" | "md" => return Some(Self::Txt),
            _ => {}
        }

        match content_type {
            Some("application/pdf") => Some(Self::Pdf),
            Some(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ) => Some(Self::Docx),
            Some(ct) if ct.starts_with("text/") => Some(Self::Txt),
            None if extension.is_empty() => Some(Self::Txt),
            _ => None,
        }
    }

    /// Source tag recorded in chunk metadata
    pub fn source_tag(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

/// A unit of extracted text produced by parsing; input to chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Extracted text content
    pub content: String,
    /// Page number (1-indexed) when the source format has pages
    pub page_number: Option<u32>,
    /// Source metadata carried onto every derived chunk
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Page {
    /// Create a page with a source tag in its metadata.
    pub fn new(content: impl Into<String>, page_number: Option<u32>, source: &str) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(
            "source".to_string(),
            serde_json::Value::String(source.to_string()),
        );
        Self {
            content: content.into(),
            page_number,
            metadata,
        }
    }
}

/// A retrievable unit derived from exactly one page.
///
/// Adjacent chunks may share overlapping text by design (the chunker's
/// overlap parameter); no overlap deduplication happens anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content
    pub content: String,
    /// Page number inherited unmodified from the source page
    pub page_number: Option<u32>,
    /// Shallow copy of the source page's metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A stored document; owns its chunks (cascade delete).
///
/// At most one document exists per content fingerprint; the fingerprint is
/// computed over the raw uploaded bytes before parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// SHA-256 content fingerprint (hex)
    pub fingerprint: String,
    /// File size in bytes
    pub size: u64,
    /// Ingestion timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document record.
    pub fn new(filename: impl Into<String>, fingerprint: impl Into<String>, size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            fingerprint: fingerprint.into(),
            size,
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_prefers_extension() {
        assert_eq!(
            FileType::from_upload("report.pdf", Some("text/plain")),
            Some(FileType::Pdf)
        );
        assert_eq!(FileType::from_upload("notes.txt", None), Some(FileType::Txt));
        assert_eq!(FileType::from_upload("a.docx", None), Some(FileType::Docx));
    }

    #[test]
    fn file_type_falls_back_to_content_type() {
        assert_eq!(
            FileType::from_upload("upload", Some("application/pdf")),
            Some(FileType::Pdf)
        );
        assert_eq!(
            FileType::from_upload("upload", Some("text/markdown")),
            Some(FileType::Txt)
        );
        assert_eq!(FileType::from_upload("upload", None), Some(FileType::Txt));
        assert_eq!(FileType::from_upload("movie.mp4", Some("video/mp4")), None);
    }
}
