//! HTTP middleware stack for the proxy.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (recorded into the request span)
//!
//! Authentication is an extractor ([`Caller`]) rather than a layer so health
//! checks stay open.

pub mod auth;
pub mod request_id;

pub use auth::{BearerToken, Caller};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
