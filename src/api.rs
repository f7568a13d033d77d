use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::config::DigestConfig;
use crate::error::DigestResult;
use crate::pipeline::{DigestService, PipelineError, SourceMode};
use crate::rate::RateGate;

#[derive(Clone)]
pub struct AppState {
    pub digest: Arc<DigestService>,
}

impl AppState {
    /// Build the shared state once per process: one rate gate, one service.
    pub fn from_config(config: &DigestConfig) -> DigestResult<Self> {
        let gate = RateGate::shared(config.tuning.rate.news_calls_per_second)?;
        let digest = DigestService::from_config(config, gate)?;
        Ok(Self {
            digest: Arc::new(digest),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/generate-news-summary", post(generate_news_summary))
        .merge(crate::metrics::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub topics: Vec<String>,
    #[serde(default)]
    pub source_type: SourceMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Request-level failure rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Invalid(String),
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::InvalidRequest(msg) => Self::Invalid(msg),
            PipelineError::Failed(inner) => Self::Internal(inner.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Invalid(d) => (StatusCode::UNPROCESSABLE_ENTITY, d),
            Self::Internal(d) => (StatusCode::INTERNAL_SERVER_ERROR, d),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

async fn generate_news_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    counter!("digest_requests_total").increment(1);

    let Json(req) = payload.map_err(|rej| {
        counter!("digest_request_errors_total").increment(1);
        ApiError::Invalid(rej.body_text())
    })?;

    match state.digest.generate_summary(&req.topics, req.source_type).await {
        Ok(summary) => Ok(Json(SummaryResponse { summary })),
        Err(e) => {
            counter!("digest_request_errors_total").increment(1);
            error!(error = %e, "digest request failed");
            Err(e.into())
        }
    }
}
