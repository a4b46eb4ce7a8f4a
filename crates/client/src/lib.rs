//! Ristretto Client - Backend access and favorite reconciliation.
//!
//! # Architecture
//!
//! ```text
//! LocationResolver ──► ApiClient::search_nearby ──► Reconciler::merge ──► NearbyShops
//!                                                        ▲
//!                         FavoritesView / toggles ───────┘
//! ```
//!
//! - [`ApiClient`] issues one HTTP request per operation, attaching the bearer
//!   token from its [`CredentialProvider`].
//! - [`LocationResolver`] turns a device fix, a manual point or the default
//!   location into search [`Coordinates`](ristretto_core::Coordinates).
//! - [`Reconciler`] keeps optimistic favorite flags consistent with the
//!   backend.
//! - [`NearbyShops`] and [`FavoritesView`] hold list state for a front end.
//!
//! # Example
//!
//! ```rust,ignore
//! use ristretto_client::{ApiClient, ClientConfig, LocationResolver, LocationSource, DeniedLocation};
//!
//! let config = ClientConfig::from_env()?;
//! let client = ApiClient::from_config(&config)?;
//! let coordinates = LocationResolver::new(DeniedLocation)
//!     .resolve(LocationSource::Default)
//!     .await?;
//! let shops = client.search_nearby(&coordinates).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod backend;
pub mod config;
pub mod credential;
pub mod error;
pub mod location;
pub mod reconcile;
pub mod views;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;

pub use api::{ApiClient, REQUEST_ID_HEADER};
pub use backend::Backend;
pub use config::{ClientConfig, ConfigError, DEFAULT_API_URL, parse_api_url};
pub use credential::{CredentialProvider, SessionCredential, StaticCredential};
pub use error::{ClientError, Result};
pub use location::{
    DeniedLocation, FixedLocation, LocationError, LocationProvider, LocationResolver,
    LocationSource,
};
pub use reconcile::{FavoriteLedger, FavoriteState, Reconciler};
pub use views::{FavoritesView, Generation, NearbyShops, SearchOutcome, SearchTicket};
