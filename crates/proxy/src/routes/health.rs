//! Health checks.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend's health check fails.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.backend().health().await {
        StatusCode::OK
    } else {
        tracing::warn!(backend = %state.config().backend_url, "Backend not ready");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
