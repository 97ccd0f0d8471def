//! Document ingestion endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{IngestResponse, IngestStats};

/// POST /api/ingest - upload one file as a multipart `file` field.
pub async fn ingest_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_request(format!("Failed to read multipart field: {}", e)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_default();
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::invalid_request(format!("Failed to read upload: {}", e)))?;

        let outcome = state
            .pipeline()
            .ingest(&filename, content_type.as_deref(), &data)
            .await?;

        return Ok(Json(IngestResponse {
            doc_id: outcome.document.id,
            stats: IngestStats {
                chunks: outcome.chunks,
                tokens: outcome.tokens,
            },
        }));
    }

    Err(Error::invalid_request("No file field in upload"))
}
