//! Location resolution.
//!
//! Turns a device fix, a manually entered point or the default location into
//! search [`Coordinates`].

use std::future::Future;

use ristretto_core::{Coordinates, GeoPoint};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Errors reported by a [`LocationProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user refused location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// No position could be obtained.
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// The device location service.
pub trait LocationProvider: Send + Sync {
    /// Request permission if needed and return the current position.
    fn current_position(&self) -> impl Future<Output = Result<GeoPoint, LocationError>> + Send;
}

/// A provider that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoPoint);

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.0)
    }
}

/// A provider whose permission prompt is always refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocation;

impl LocationProvider for DeniedLocation {
    async fn current_position(&self) -> Result<GeoPoint, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Where the search centre comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationSource {
    /// Ask the location provider.
    Device,
    /// A point the user typed in.
    Manual(GeoPoint),
    /// [`GeoPoint::DEFAULT`].
    Default,
}

/// Builds search coordinates from a location source.
#[derive(Debug, Clone)]
pub struct LocationResolver<P> {
    provider: P,
    radius_meters: u32,
    max_results: u32,
}

impl<P: LocationProvider> LocationResolver<P> {
    /// A resolver using the default radius and result count.
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            radius_meters: Coordinates::DEFAULT_RADIUS_METERS,
            max_results: Coordinates::DEFAULT_MAX_RESULTS,
        }
    }

    /// Override the search constraints.
    #[must_use]
    pub const fn with_constraints(mut self, radius_meters: u32, max_results: u32) -> Self {
        self.radius_meters = radius_meters;
        self.max_results = max_results;
        self
    }

    /// Resolve `source` into search coordinates.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::PermissionDenied` if the device refuses access,
    /// `ClientError::Location` if no fix is available, and
    /// `ClientError::InvalidCoordinates` if the point or constraints are out of
    /// range.
    pub async fn resolve(&self, source: LocationSource) -> Result<Coordinates, ClientError> {
        let point = match source {
            LocationSource::Device => match self.provider.current_position().await {
                Ok(point) => point,
                Err(e) => {
                    warn!(error = %e, "Device location failed");
                    return Err(e.into());
                }
            },
            LocationSource::Manual(point) => point,
            LocationSource::Default => GeoPoint::DEFAULT,
        };

        // Re-validate: providers and manual input are both untrusted.
        let point = GeoPoint::new(point.latitude, point.longitude)?;
        let coordinates = Coordinates::new(point, self.radius_meters, self.max_results)?;

        debug!(
            lat = coordinates.latitude(),
            lng = coordinates.longitude(),
            radius = coordinates.radius_meters(),
            max = coordinates.max_results(),
            "Resolved search coordinates"
        );

        Ok(coordinates)
    }
}
