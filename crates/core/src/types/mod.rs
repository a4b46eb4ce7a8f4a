//! Core types for Ristretto.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the client, the proxy and the CLI.

pub mod coordinates;
pub mod place_id;
pub mod shop;
pub mod user;
pub mod visit;
pub mod wire;

pub use coordinates::{Coordinates, CoordinatesError, GeoPoint};
pub use place_id::{PlaceId, PlaceIdError};
pub use shop::{CoffeeShop, CoffeeShopDetails};
pub use user::{User, UserId};
pub use visit::Visit;
pub use wire::{CoffeeShopDetailsResponse, CoffeeShopsResponse, FavoritesResponse, VisitsResponse};
