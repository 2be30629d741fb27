//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use docchat_core::config::GatewayConfig;
use docchat_core::traits::TextExtractor;
use docchat_knowledge::RetrievalService;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    /// Retrieval engine behind every route: holds the chunk store, the
    /// in-memory vector index, and the provider clients.
    pub service: Arc<RetrievalService>,
    /// Converts uploaded bytes to plain text before ingestion.
    pub extractor: Arc<dyn TextExtractor>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    build_router_from_arc(Arc::new(state), config)
}

pub fn build_router_from_arc(shared: Arc<AppState>, config: &GatewayConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));
    // Only the configured frontend origin may call the API; an unparsable
    // origin falls back to same-origin only.
    let cors = match config.allowed_origin.parse::<axum::http::HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                origin = %config.allowed_origin,
                "Invalid allowed_origin in config; cross-origin requests will be rejected"
            );
            cors
        }
    };

    Router::new()
        .route("/upload", post(super::routes::upload))
        .route("/chat", post(super::routes::chat))
        .route("/pdf-status", get(super::routes::pdf_status))
        .route("/delete-pdf", post(super::routes::delete_pdf))
        .route("/health", get(super::routes::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server and serve until shutdown.
pub async fn start(state: AppState, config: &GatewayConfig) -> anyhow::Result<()> {
    let app = build_router(state, config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
