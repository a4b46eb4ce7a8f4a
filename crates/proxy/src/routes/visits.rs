//! Visit history routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use ristretto_core::{CoffeeShop, VisitsResponse};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::middleware::Caller;
use crate::state::AppState;

/// `GET /api/proxy/visits`
#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<VisitsResponse>> {
    let visits = state.backend_for(caller).visits().await?;
    Ok(Json(VisitsResponse { visits }))
}

/// `POST /api/proxy/visits`
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: std::result::Result<Json<CoffeeShop>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(shop) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    state.backend_for(caller).record_visit(&shop).await?;
    tracing::info!(place_id = %shop.id, "Visit recorded");
    Ok(Json(json!({ "success": true })))
}
