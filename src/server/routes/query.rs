//! Retrieval query endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /api/query - retrieve ranked passages for a query.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    tracing::debug!(
        query = %request.query,
        top_k = request.top_k,
        rerank = request.rerank,
        hybrid = ?request.hybrid,
        "Retrieval request"
    );
    let results = state.retriever().retrieve(&request).await?;
    Ok(Json(QueryResponse { results }))
}
