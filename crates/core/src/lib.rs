//! Ristretto Core - Shared domain types.
//!
//! This crate provides the types used across all Ristretto components:
//! - `client` - Typed backend client, location resolution and favorite reconciliation
//! - `proxy` - Authenticated proxy routes in front of the backend
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Place IDs, coordinates, shop records, visits and users
//! - [`geo`] - Great-circle distance and distance ranking

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod geo;
pub mod types;

pub use geo::{EARTH_RADIUS_KM, distance_km, rank_by_distance};
pub use types::*;
