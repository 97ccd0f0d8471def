//! HTTP server for the retrieval service

pub mod routes;
pub mod state;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use state::AppState;

/// The retrieval HTTP server.
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a new server, wiring up state from config.
    pub async fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The configured listen address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }

    fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health))
            .route("/ready", get(ready))
            .nest(
                "/api",
                routes::api_routes(self.config.server.max_upload_bytes()),
            )
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }
        router
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        self.state.spawn_warmup();
        let router = self.build_router();

        tracing::info!("Starting retrieval server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// GET /health - component health and failure counters.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let embedder_ok = state.embedder().health_check().await.unwrap_or(false);
    let index_ok = state.index().health_check().await.unwrap_or(false);
    let storage_ok = state.db().ping().unwrap_or(false);

    Json(json!({
        "status": if embedder_ok && storage_ok { "ok" } else { "degraded" },
        "components": {
            "embedder": embedder_ok,
            "vector_index": index_ok,
            "storage": storage_ok,
        },
        "readiness": state.readiness().as_str(),
        "counters": crate::metrics::global().snapshot(),
    }))
}

/// GET /ready - 200 once the embedding model warm-up finished.
async fn ready(State(state): State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
