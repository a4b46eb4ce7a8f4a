//! Caller extraction.
//!
//! Every proxy route forwards the caller's identity-provider token to the
//! backend unchanged; the proxy never validates it itself.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::SecretString;

use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Extractor that requires an `Authorization: Bearer <token>` header.
///
/// Missing, malformed or empty tokens are rejected with a 401.
pub struct BearerToken(pub SecretString);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .ok_or(AppError::Unauthorized)?;

        Ok(Self(SecretString::from(token)))
    }
}

/// Everything a route forwards to the backend: the caller's token and the
/// request ID assigned by the middleware.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, caller: Caller) -> Result<...> {
///     let backend = state.backend_for(caller);
///     ...
/// }
/// ```
pub struct Caller {
    pub token: SecretString,
    pub request_id: Option<RequestId>,
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        Ok(Self {
            token,
            request_id: parts.extensions.get::<RequestId>().cloned(),
        })
    }
}

/// The token from a `Bearer` authorization value.
fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
