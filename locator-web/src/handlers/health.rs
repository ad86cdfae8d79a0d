//! Health check handlers

use super::types::{HealthResponse, NowResponse};
use crate::AppState;
use axum::{extract::State, response::Json};
use chrono::Utc;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Check the server health status and whether the account session is established",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now,
        version: env!("CARGO_PKG_VERSION").to_string(),
        session_ready: state.sessions.is_initialized(),
        uptime_seconds: (now - state.started_at).num_seconds(),
    })
}

/// Greeting used as a liveness probe
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Greeting", body = String, content_type = "text/plain")
    )
)]
pub async fn hello() -> &'static str {
    "Hello World!"
}

/// Server clock and deployment version
#[utoipa::path(
    get,
    path = "/now",
    tag = "Health",
    responses(
        (status = 200, description = "Current server time", body = NowResponse)
    )
)]
pub async fn now(State(state): State<AppState>) -> Json<NowResponse> {
    let now = Utc::now();
    Json(NowResponse {
        now: now.timestamp_micros() as f64 / 1_000_000.0,
        version: state.config.version.clone(),
    })
}
