//! Profile route.

use axum::{Json, extract::State};
use ristretto_core::User;

use crate::error::Result;
use crate::middleware::Caller;
use crate::state::AppState;

/// `GET /api/proxy/user`
#[tracing::instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<User>> {
    let user = state.backend_for(caller).user().await?;
    Ok(Json(user))
}
