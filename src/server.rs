//! HTTP server for the answering service.

mod routes;

pub use routes::{ApiError, ChatRequest, HealthResponse, IngestResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::answerer::GuardedAnswerer;
use crate::bedrock::IngestionClientTrait;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub answerer: GuardedAnswerer,
    pub ingestion: Arc<dyn IngestionClientTrait>,
}

impl AppState {
    pub fn new(answerer: GuardedAnswerer, ingestion: Arc<dyn IngestionClientTrait>) -> Self {
        Self {
            answerer,
            ingestion,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::chat_routes())
        .merge(routes::ingest_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Serves the application on `addr` until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server terminated")?;
    Ok(())
}
