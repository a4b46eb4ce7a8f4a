//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as JSON
//! `{"error": "..."}` bodies; backend failures are captured to
//! Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ristretto_client::ClientError;
use serde_json::json;
use thiserror::Error;

/// Application-level error type for the proxy.
#[derive(Debug, Error)]
pub enum AppError {
    /// No usable bearer token on the incoming request.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] ClientError),
}

impl AppError {
    /// Status code and client-facing message.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Backend(err) => match err {
                ClientError::AuthRequired(_) => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
                }
                ClientError::Remote { status, message } => (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    message.clone(),
                ),
                ClientError::Parse(_) => (
                    StatusCode::BAD_GATEWAY,
                    "Invalid response from backend".to_string(),
                ),
                ClientError::Network(_) => {
                    (StatusCode::BAD_GATEWAY, "Backend unavailable".to_string())
                }
                ClientError::InvalidCoordinates(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
        }
    }

    /// Whether the failure lies with the backend rather than the caller.
    fn is_server_side(&self, status: StatusCode) -> bool {
        matches!(self, Self::Backend(_)) && status.is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();

        // Capture server errors to Sentry
        if self.is_server_side(status) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_auth_required_is_401() {
        let (status, body) = render(ClientError::AuthRequired("expired".to_string()).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_remote_keeps_backend_status() {
        let (status, body) = render(
            ClientError::Remote {
                status: 404,
                message: "Favorite not found".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Favorite not found");
    }

    #[tokio::test]
    async fn test_parse_is_bad_gateway() {
        let (status, body) = render(ClientError::Parse("eof".to_string()).into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Invalid response from backend");
    }

    #[tokio::test]
    async fn test_bad_request_message() {
        let (status, body) = render(AppError::BadRequest("Place ID is required".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Place ID is required");
    }

    #[tokio::test]
    async fn test_unexpected_client_error_hides_details() {
        let (status, body) = render(ClientError::Config("bad url".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
