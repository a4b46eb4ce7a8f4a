//! Search coordinates.
//!
//! A [`Coordinates`] value is created per nearby search and never persisted.
//! It carries the search centre plus the radius and result-count constraints
//! that the backend's nearby query accepts.

use serde::{Deserialize, Serialize};

/// Errors that can occur when building [`Coordinates`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinatesError {
    /// Latitude is not finite or outside [-90, 90].
    #[error("latitude must be between -90 and 90 (got {0})")]
    Latitude(f64),
    /// Longitude is not finite or outside [-180, 180].
    #[error("longitude must be between -180 and 180 (got {0})")]
    Longitude(f64),
    /// Maximum result count must be at least one.
    #[error("max results must be at least 1")]
    MaxResults,
}

/// A bare geographic position, as reported by a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Downtown San Francisco, used when no location is available.
    pub const DEFAULT: Self = Self {
        latitude: 37.7937,
        longitude: -122.3965,
    };

    /// Create a point, validating both axes.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Search centre and constraints for a nearby query.
///
/// ## Examples
///
/// ```
/// use ristretto_core::{Coordinates, GeoPoint};
///
/// let coords = Coordinates::new(GeoPoint::new(37.7937, -122.3965).unwrap(), 500, 10).unwrap();
/// assert_eq!(coords.query_string(), "lat=37.7937&lng=-122.3965&radius=500&max=10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    center: GeoPoint,
    radius_meters: u32,
    max_results: u32,
}

impl Coordinates {
    /// Radius used when the caller does not supply one.
    pub const DEFAULT_RADIUS_METERS: u32 = 500;
    /// Result count used when the caller does not supply one.
    pub const DEFAULT_MAX_RESULTS: u32 = 10;

    /// Build search coordinates around `center`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatesError::MaxResults`] if `max_results` is zero.
    pub const fn new(
        center: GeoPoint,
        radius_meters: u32,
        max_results: u32,
    ) -> Result<Self, CoordinatesError> {
        if max_results == 0 {
            return Err(CoordinatesError::MaxResults);
        }
        Ok(Self {
            center,
            radius_meters,
            max_results,
        })
    }

    /// Build search coordinates with the default radius and result count.
    #[must_use]
    pub const fn around(center: GeoPoint) -> Self {
        Self {
            center,
            radius_meters: Self::DEFAULT_RADIUS_METERS,
            max_results: Self::DEFAULT_MAX_RESULTS,
        }
    }

    #[must_use]
    pub const fn center(&self) -> GeoPoint {
        self.center
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.center.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.center.longitude
    }

    #[must_use]
    pub const fn radius_meters(&self) -> u32 {
        self.radius_meters
    }

    #[must_use]
    pub const fn max_results(&self) -> u32 {
        self.max_results
    }

    /// The four query parameters in wire order, values as decimal strings.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("lat", self.center.latitude.to_string()),
            ("lng", self.center.longitude.to_string()),
            ("radius", self.radius_meters.to_string()),
            ("max", self.max_results.to_string()),
        ]
    }

    /// The query string (without a leading `?`) for the nearby endpoint.
    ///
    /// Decimal strings never need percent-encoding, so the pairs are joined
    /// verbatim.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::around(GeoPoint::DEFAULT)
    }
}
