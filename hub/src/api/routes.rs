// hub/src/api/routes.rs
//
// Request/response DTOs and handlers (§6). Shapes mirror the wire table
// in SPEC_FULL.md exactly — field names like `entity_count`/`entity_id`
// are the external contract, not a Rust-ism.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{Severity, SeverityTier, SubmissionRequest};
use crate::pipeline::SubmitError;

use super::middleware::{request_logging, require_api_key};
use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    message: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        message: "collate-hub is running",
    })
}

async fn stats_handler(State(state): State<AppState>) -> Json<crate::models::GraphStats> {
    Json(state.pipeline.graph.stats())
}

#[derive(Serialize)]
struct IngestResponse {
    status: &'static str,
    fingerprint: String,
    entity_id: String,
    correlation_detected: bool,
    message: &'static str,
}

async fn ingest_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entity_header = headers
        .get("x-entity-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Validation("missing X-Entity-ID header".into()))?;

    if entity_header != req.entity_id {
        return Err(ApiError::Validation(
            "X-Entity-ID header does not match entity_id in payload".into(),
        ));
    }

    let severity = Severity::parse(&req.severity)
        .ok_or_else(|| ApiError::Validation(format!("unknown severity: {}", req.severity)))?;

    let ack = state
        .pipeline
        .submit(req.entity_id, req.fingerprint, severity, req.timestamp)
        .map_err(|e| match e {
            SubmitError::EmptyFingerprint | SubmitError::EmptyEntityId | SubmitError::TimestampTooFarAhead => {
                ApiError::Validation(e.to_string())
            }
        })?;

    let truncated = if ack.fingerprint.chars().count() > 16 {
        format!("{}...", ack.fingerprint.chars().take(16).collect::<String>())
    } else {
        ack.fingerprint.clone()
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            status: "accepted",
            fingerprint: truncated,
            entity_id: ack.participant_id,
            correlation_detected: ack.correlation_detected,
            message: "submission accepted",
        }),
    ))
}

#[derive(Deserialize)]
struct AdvisoriesQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    severity: Option<String>,
}

fn default_limit() -> usize {
    50
}

async fn advisories_handler(
    State(state): State<AppState>,
    Query(q): Query<AdvisoriesQuery>,
) -> Result<Json<Vec<crate::models::Advisory>>, ApiError> {
    let severity = match q.severity.as_deref() {
        None => None,
        Some("CRITICAL") => Some(SeverityTier::Critical),
        Some("HIGH") => Some(SeverityTier::High),
        Some("MEDIUM") => Some(SeverityTier::Medium),
        Some(other) => return Err(ApiError::Validation(format!("unknown severity: {other}"))),
    };
    Ok(Json(state.pipeline.advisories.list(q.limit, severity)))
}

async fn patterns_handler(
    State(state): State<AppState>,
    Path(fingerprint): Path<String>,
) -> Result<Json<crate::models::PatternInfo>, ApiError> {
    let window = Duration::seconds(state.pipeline.config().time_window_seconds);
    state
        .pipeline
        .graph
        .fingerprint_info(&fingerprint, window)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(fingerprint))
}

#[derive(Serialize)]
struct EntityActivityResponse {
    participant_id: String,
    recent_fingerprints: Vec<String>,
    last_submission: Option<DateTime<Utc>>,
}

async fn entity_activity_handler(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> Result<Json<EntityActivityResponse>, ApiError> {
    let window = Duration::seconds(state.pipeline.config().time_window_seconds);
    let (fingerprints, last) = state
        .pipeline
        .graph
        .participant_fingerprints(&participant_id, window)
        .ok_or_else(|| ApiError::NotFound(participant_id.clone()))?;

    Ok(Json(EntityActivityResponse {
        participant_id,
        recent_fingerprints: fingerprints,
        last_submission: last,
    }))
}

pub fn create_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/stats", get(stats_handler))
        .route("/ingest", post(ingest_handler))
        .route("/advisories", get(advisories_handler))
        .route("/patterns/:fingerprint", get(patterns_handler))
        .route("/entities/:participant_id/activity", get(entity_activity_handler))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health_handler))
        .merge(authenticated)
        .layer(axum::middleware::from_fn(request_logging))
        .with_state(state)
}
