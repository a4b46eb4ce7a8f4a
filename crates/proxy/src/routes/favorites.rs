//! Favorite routes.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use ristretto_core::{CoffeeShop, FavoritesResponse, PlaceId};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::middleware::Caller;
use crate::state::AppState;

/// `DELETE` query parameters.
#[derive(Debug, Deserialize)]
pub struct RemoveParams {
    #[serde(rename = "placeId")]
    pub place_id: Option<String>,
}

/// `GET /api/proxy/favorites`
#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<FavoritesResponse>> {
    let favorites = state.backend_for(caller).favorites().await?;
    Ok(Json(FavoritesResponse { favorites }))
}

/// `POST /api/proxy/favorites`
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: std::result::Result<Json<CoffeeShop>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(shop) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    state.backend_for(caller).add_favorite(&shop).await?;
    tracing::info!(place_id = %shop.id, "Favorite added");
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/proxy/favorites?placeId=...`
#[tracing::instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<RemoveParams>,
) -> Result<Json<Value>> {
    let place_id = params
        .place_id
        .as_deref()
        .and_then(|id| PlaceId::parse(id).ok())
        .ok_or_else(|| AppError::BadRequest("Place ID is required".to_string()))?;

    state.backend_for(caller).remove_favorite(&place_id).await?;
    tracing::info!(place_id = %place_id, "Favorite removed");
    Ok(Json(json!({ "success": true })))
}
