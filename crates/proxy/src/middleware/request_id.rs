//! Request IDs shared by the proxy's logs and its backend calls.
//!
//! An incoming `x-request-id` is kept, otherwise a UUID v4 is minted. The ID
//! is stored in the request extensions as [`RequestId`], so the forwarded
//! backend call carries the same header, and it is echoed on the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
pub use ristretto_client::REQUEST_ID_HEADER;
use tracing::Span;
use uuid::Uuid;

/// Longest caller-supplied ID that is passed through unchanged.
const MAX_INCOMING_LEN: usize = 128;

/// The ID of the request being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuse a usable incoming header value or mint a new ID.
    fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_INCOMING_LEN)
            .map_or_else(|| Self(Uuid::new_v4().to_string()), |id| Self(id.to_string()))
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER));

    Span::current().record("request_id", request_id.0.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id.0));

    let header = HeaderValue::from_str(&request_id.0).ok();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
