//! Error-body handling for backend responses.

use reqwest::StatusCode;
use serde::Deserialize;

/// JSON error bodies seen from the backend and the proxy.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Longest body excerpt carried in an error message.
const MAX_MESSAGE_CHARS: usize = 200;

/// Extract a human-readable message from an error response.
///
/// Prefers a JSON `error` or `message` field, then the trimmed body text, then
/// the status reason phrase.
#[must_use]
pub fn remote_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.trim().is_empty()
    {
        return message.trim().to_string();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }

    trimmed.chars().take(MAX_MESSAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_field() {
        assert_eq!(
            remote_message(StatusCode::BAD_REQUEST, r#"{"error":"Place ID is required"}"#),
            "Place ID is required"
        );
    }

    #[test]
    fn test_json_message_field() {
        assert_eq!(
            remote_message(StatusCode::NOT_FOUND, r#"{"message":"Favorite not found"}"#),
            "Favorite not found"
        );
    }

    #[test]
    fn test_plain_text_body() {
        assert_eq!(
            remote_message(StatusCode::INTERNAL_SERVER_ERROR, "Database error\n"),
            "Database error"
        );
    }

    #[test]
    fn test_empty_body_uses_reason() {
        assert_eq!(
            remote_message(StatusCode::UNAUTHORIZED, ""),
            "Unauthorized"
        );
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(1000);
        assert_eq!(
            remote_message(StatusCode::BAD_GATEWAY, &body).len(),
            MAX_MESSAGE_CHARS
        );
    }
}
