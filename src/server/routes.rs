//! HTTP routes.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::AppState;
use crate::answerer::AnswerError;
use crate::models::AnswerResult;

type AppStateArc = Arc<AppState>;

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Body of a successful `POST /api/ingest`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestResponse {
    pub success: bool,
    #[serde(rename = "jobId", default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error body shared by every route.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Failures that cross the HTTP boundary.
///
/// Safety refusals never appear here; they are ordinary 200 answers.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, blank or unreadable question
    QuestionRequired,
    /// Unexpected collaborator failure while answering
    Internal(String),
    /// The ingestion job could not be started
    IngestionFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::QuestionRequired => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Question is required",
                    details: None,
                },
            ),
            Self::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Internal server error",
                    details: Some(details),
                },
            ),
            Self::IngestionFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Failed to start ingestion job",
                    details: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AnswerError> for ApiError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::EmptyQuestion => Self::QuestionRequired,
            AnswerError::Retrieval(e) => Self::Internal(e.to_string()),
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/api/chat", post(chat))
}

async fn chat(
    State(state): State<AppStateArc>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<AnswerResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected chat body");
        ApiError::QuestionRequired
    })?;
    let question = request.question.ok_or(ApiError::QuestionRequired)?;

    let result = state.answerer.answer(&question).await.map_err(|e| {
        if matches!(e, AnswerError::Retrieval(_)) {
            error!(error = %e, "chat request failed");
        }
        ApiError::from(e)
    })?;

    Ok(Json(result))
}

// ============================================================================
// Ingestion
// ============================================================================

pub fn ingest_routes() -> Router<AppStateArc> {
    Router::new().route("/api/ingest", post(ingest))
}

async fn ingest(State(state): State<AppStateArc>) -> Result<Json<IngestResponse>, ApiError> {
    let job = state.ingestion.start_ingestion_job().await.map_err(|e| {
        error!(error = %e, "ingestion error");
        ApiError::IngestionFailed
    })?;

    Ok(Json(IngestResponse {
        success: true,
        job_id: job.job_id,
    }))
}

// ============================================================================
// Health
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
