//! Opaque place identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PlaceId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceIdError {
    /// The input string is empty or only whitespace.
    #[error("place ID cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("place ID must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// An opaque place identifier issued by the backend's places provider.
///
/// The client never interprets the value; it is only compared, used as a map
/// key and sent back to the backend.
///
/// ## Examples
///
/// ```
/// use ristretto_core::PlaceId;
///
/// assert!(PlaceId::parse("ChIJd8BlQ2BZwokRAFUEcm_qrcA").is_ok());
/// assert!(PlaceId::parse("").is_err());
/// assert!(PlaceId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    /// Maximum accepted length of a place ID.
    pub const MAX_LENGTH: usize = 512;

    /// Parse a `PlaceId` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, PlaceIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PlaceIdError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(PlaceIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the place ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PlaceId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PlaceId {
    type Err = PlaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlaceId {
    type Error = PlaceIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PlaceId> for String {
    fn from(id: PlaceId) -> Self {
        id.0
    }
}

impl AsRef<str> for PlaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
