//! Client error taxonomy.

use ristretto_core::{CoordinatesError, PlaceId};
use thiserror::Error;

use crate::location::LocationError;

/// Errors surfaced by the client library.
///
/// None of these are fatal; callers show a message and let the user retry.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credential is available, or the backend answered 401.
    #[error("Unauthorized: {0}")]
    AuthRequired(String),

    /// Location access was refused.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// A success response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The request could not complete.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Search coordinates failed validation.
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(#[from] CoordinatesError),

    /// A favorite toggle for this shop has not resolved yet.
    #[error("Favorite change already in progress for {0}")]
    ToggleInFlight(PlaceId),

    /// The shop is not held by the view the action was issued on.
    #[error("Coffee shop not in list: {0}")]
    UnknownShop(PlaceId),

    /// The location provider failed for a reason other than permission.
    #[error("Location unavailable: {0}")]
    Location(String),

    /// Client configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the caller must (re)authenticate before retrying.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired(_))
    }

    /// HTTP status reported by the backend, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthRequired(_) => Some(401),
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<LocationError> for ClientError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => Self::PermissionDenied,
            LocationError::Unavailable(msg) => Self::Location(msg),
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
