//! The backend operations the reconciler and views depend on.

use std::future::Future;

use ristretto_core::{CoffeeShop, Coordinates, PlaceId};

use crate::api::ApiClient;
use crate::credential::CredentialProvider;
use crate::error::ClientError;

/// Remote operations behind the favorite reconciler and list views.
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory fake.
pub trait Backend: Send + Sync {
    /// Search coffee shops near `coordinates`.
    fn search_nearby(
        &self,
        coordinates: &Coordinates,
    ) -> impl Future<Output = Result<Vec<CoffeeShop>, ClientError>> + Send;

    /// List the user's favorite shops.
    fn favorites(&self) -> impl Future<Output = Result<Vec<CoffeeShop>, ClientError>> + Send;

    /// Add a shop to the user's favorites.
    fn add_favorite(&self, shop: &CoffeeShop)
    -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Remove a shop from the user's favorites.
    fn remove_favorite(
        &self,
        place_id: &PlaceId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Record a visit to a shop.
    fn record_visit(&self, shop: &CoffeeShop)
    -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl<C: CredentialProvider> Backend for ApiClient<C> {
    async fn search_nearby(&self, coordinates: &Coordinates) -> Result<Vec<CoffeeShop>, ClientError> {
        Self::search_nearby(self, coordinates).await
    }

    async fn favorites(&self) -> Result<Vec<CoffeeShop>, ClientError> {
        Self::favorites(self).await
    }

    async fn add_favorite(&self, shop: &CoffeeShop) -> Result<(), ClientError> {
        Self::add_favorite(self, shop).await
    }

    async fn remove_favorite(&self, place_id: &PlaceId) -> Result<(), ClientError> {
        Self::remove_favorite(self, place_id).await
    }

    async fn record_visit(&self, shop: &CoffeeShop) -> Result<(), ClientError> {
        Self::record_visit(self, shop).await
    }
}
