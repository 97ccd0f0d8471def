//! API routes

pub mod documents;
pub mod ingest;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes.
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/ingest",
            post(ingest::ingest_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/query", post(query::query))
        .route("/documents", get(documents::list_documents))
        .route("/documents/:id", get(documents::get_document))
        .route("/documents/:id", delete(documents::delete_document))
}
