//! HTTP route handlers for the proxy.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Backend readiness
//!
//! # Proxy (requires Authorization: Bearer)
//! GET    /api/proxy/coffee_shops          - Nearby search (lat, lng, radius, max)
//! GET    /api/proxy/coffee_shops/{id}     - Shop details
//! GET    /api/proxy/favorites             - Favorites list
//! POST   /api/proxy/favorites             - Add favorite (CoffeeShop body)
//! DELETE /api/proxy/favorites?placeId=    - Remove favorite
//! GET    /api/proxy/visits                - Visit history
//! POST   /api/proxy/visits                - Record visit (CoffeeShop body)
//! GET    /api/proxy/user                  - Profile
//! ```

pub mod coffee_shops;
pub mod favorites;
pub mod health;
pub mod user;
pub mod visits;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the proxied backend routes.
pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/coffee_shops", get(coffee_shops::search))
        .route("/coffee_shops/{id}", get(coffee_shops::show))
        .route(
            "/favorites",
            get(favorites::index)
                .post(favorites::create)
                .delete(favorites::destroy),
        )
        .route("/visits", get(visits::index).post(visits::create))
        .route("/user", get(user::show))
}

/// Create all routes for the proxy.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/proxy", proxy_routes())
}
