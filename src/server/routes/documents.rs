//! Document management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::storage::DocumentListQuery;

/// Query parameters for the document listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Case-sensitive filename substring filter
    pub filename: Option<String>,
}

/// GET /api/documents - list documents, newest first.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>> {
    let items = state.db().list_documents(&DocumentListQuery {
        limit: params.limit,
        offset: params.offset,
        filename_contains: params.filename,
    })?;
    let count = items.len();
    Ok(Json(json!({
        "documents": items,
        "count": count,
    })))
}

/// GET /api/documents/:id - document details with chunk count.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let document = state
        .db()
        .get_document(&id)?
        .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
    let chunks = state.db().count_chunks(&id)?;

    Ok(Json(json!({
        "id": document.id,
        "filename": document.filename,
        "fingerprint": document.fingerprint,
        "size": document.size,
        "created_at": document.created_at.to_rfc3339(),
        "chunks": chunks,
    })))
}

/// DELETE /api/documents/:id - remove a document, its chunks, and its
/// index entries.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db().delete_document(&id)? {
        return Err(Error::DocumentNotFound(id.to_string()));
    }

    // Index cleanup is best-effort; a stale entry only wastes space.
    match state.index().delete_by_document(&id).await {
        Ok(removed) => {
            tracing::info!(doc_id = %id, removed, "Document deleted");
        }
        Err(e) => {
            tracing::warn!(doc_id = %id, error = %e, "Vector index cleanup failed");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
