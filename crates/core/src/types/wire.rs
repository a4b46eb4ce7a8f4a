//! JSON envelopes used by the backend and the proxy routes.
//!
//! The backend serializes empty Go slices as `null`, so list envelopes accept
//! a missing or null list and treat it as empty.

use serde::{Deserialize, Deserializer, Serialize};

use super::shop::{CoffeeShop, CoffeeShopDetails};
use super::visit::Visit;

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /coffee_shops` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShopsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub coffee_shops: Vec<CoffeeShop>,
}

/// `GET /coffee_shops/{id}` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShopDetailsResponse {
    pub coffee_shop: CoffeeShopDetails,
}

/// `GET /favorites` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoritesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub favorites: Vec<CoffeeShop>,
}

/// `GET /visits` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub visits: Vec<Visit>,
}
