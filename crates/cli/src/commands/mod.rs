//! Command implementations.
//!
//! Each command returns the text to print; `main` owns stdout.

pub mod favorites;
pub mod profile;
pub mod shops;
pub mod visits;

use ristretto_client::{ApiClient, ClientError, ConfigError};
use ristretto_core::{CoffeeShop, PlaceId, PlaceIdError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A backend or client-side failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The place ID argument is unusable.
    #[error("Invalid place ID: {0}")]
    InvalidPlaceId(#[from] PlaceIdError),

    /// The backend health check failed.
    #[error("Backend at {0} is not healthy")]
    Unhealthy(String),
}

/// Parse a place ID argument.
pub(crate) fn place_id(raw: &str) -> Result<PlaceId, CliError> {
    Ok(PlaceId::parse(raw)?)
}

/// Fetch a shop's summary record by ID.
pub(crate) async fn fetch_shop(client: &ApiClient, id: &PlaceId) -> Result<CoffeeShop, CliError> {
    Ok(client.shop_details(id).await?.summary())
}

/// Marker appended to favorite shops in listings.
pub(crate) const fn favorite_marker(shop: &CoffeeShop) -> &'static str {
    if shop.is_favorite { " ★" } else { "" }
}

/// Check the backend's health endpoint.
///
/// # Errors
///
/// Returns `CliError::Unhealthy` if the health check fails.
pub async fn health(client: &ApiClient) -> Result<String, CliError> {
    if client.health().await {
        Ok(format!("Backend at {} is healthy", client.base_url()))
    } else {
        Err(CliError::Unhealthy(client.base_url().to_string()))
    }
}
