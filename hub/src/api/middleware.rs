// hub/src/api/middleware.rs
//
// Authentication gate plus request logging. Auth mirrors this corpus's
// metrics_middleware shape (read headers, act before `next.run`); health
// is wired outside this layer so it stays reachable without a key.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ApiError;

use super::state::AppState;

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == state.api_key.as_ref() => Ok(next.run(request).await),
        _ => Err(ApiError::Auth),
    }
}

pub async fn request_logging(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let trace_id = request
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!("request", trace_id = %trace_id, method = %method, path = %path);
    let response = next.run(request).instrument(span).await;

    info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn cfg(key: &str) -> Config {
        Config {
            host: "0.0.0.0".into(),
            port: 8000,
            api_key: key.into(),
            entity_threshold: 2,
            time_window_seconds: 300,
            critical_threshold: 4,
            high_threshold: 3,
            medium_threshold: 2,
            confidence_high_participants: 3,
            confidence_high_span_seconds: 180,
            confidence_medium_participants: 2,
            confidence_medium_span_seconds: 300,
            max_graph_age_seconds: 3600,
            prune_interval_seconds: 300,
            max_advisories: 1000,
            max_clock_skew_seconds: 60,
        }
    }

    #[test]
    fn state_carries_configured_key() {
        let state = AppState::new(cfg("secret"));
        assert_eq!(state.api_key.as_ref(), "secret");
    }
}
