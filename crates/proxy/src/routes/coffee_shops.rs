//! Coffee shop search and detail routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use ristretto_core::{
    CoffeeShopDetailsResponse, CoffeeShopsResponse, Coordinates, GeoPoint, PlaceId,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::Caller;
use crate::state::AppState;

/// Nearby search query parameters.
///
/// Kept as raw strings so bad values produce JSON errors rather than the
/// extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub max: Option<String>,
}

impl SearchParams {
    /// Validate into search coordinates.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` naming the offending parameter.
    pub fn coordinates(&self) -> Result<Coordinates> {
        let (Some(lat), Some(lng)) = (non_blank(self.lat.as_deref()), non_blank(self.lng.as_deref()))
        else {
            return Err(AppError::BadRequest(
                "Latitude and longitude are required".to_string(),
            ));
        };

        let latitude = parse_param::<f64>("lat", lat)?;
        let longitude = parse_param::<f64>("lng", lng)?;
        let radius = non_blank(self.radius.as_deref())
            .map(|v| parse_param::<u32>("radius", v))
            .transpose()?
            .unwrap_or(Coordinates::DEFAULT_RADIUS_METERS);
        let max = non_blank(self.max.as_deref())
            .map(|v| parse_param::<u32>("max", v))
            .transpose()?
            .unwrap_or(Coordinates::DEFAULT_MAX_RESULTS);

        let center = GeoPoint::new(latitude, longitude)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Coordinates::new(center, radius, max).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_param<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {name}: {value}")))
}

/// `GET /api/proxy/coffee_shops`
#[tracing::instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SearchParams>,
) -> Result<Json<CoffeeShopsResponse>> {
    let coordinates = params.coordinates()?;
    let coffee_shops = state.backend_for(caller).search_nearby(&coordinates).await?;
    Ok(Json(CoffeeShopsResponse { coffee_shops }))
}

/// `GET /api/proxy/coffee_shops/{id}`
#[tracing::instrument(skip_all, fields(place_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<CoffeeShopDetailsResponse>> {
    let place_id = PlaceId::parse(&id)
        .map_err(|_| AppError::BadRequest("Coffee shop ID is required".to_string()))?;
    let coffee_shop = state.backend_for(caller).shop_details(&place_id).await?;
    Ok(Json(CoffeeShopDetailsResponse { coffee_shop }))
}
