//! Favorite management.

use std::fmt::Write as _;
use std::sync::Arc;

use ristretto_client::{ApiClient, FavoritesView, Reconciler};
use ristretto_core::CoffeeShop;

use super::{CliError, fetch_shop, place_id};

/// List the user's favorites.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn list(client: &ApiClient) -> Result<String, CliError> {
    let view = FavoritesView::new(Arc::new(Reconciler::new(client.clone())));
    let favorites = view.load().await?;
    Ok(render_favorites(&favorites))
}

/// Flip a shop's favorite status.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the shop cannot be fetched or the
/// change is rejected.
pub async fn toggle(client: &ApiClient, id: &str) -> Result<String, CliError> {
    let shop = fetch_shop(client, &place_id(id)?).await?;
    let reconciler = Reconciler::new(client.clone());

    let now = reconciler.toggle_favorite(&shop).await?;
    Ok(if now {
        format!("Added {} to favorites", shop.name)
    } else {
        format!("Removed {} from favorites", shop.name)
    })
}

/// Remove a shop from favorites.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the shop cannot be fetched or the
/// removal fails.
pub async fn remove(client: &ApiClient, id: &str) -> Result<String, CliError> {
    let place_id = place_id(id)?;
    let shop = fetch_shop(client, &place_id).await?;
    if !shop.is_favorite {
        return Ok(format!("{} is not a favorite", shop.name));
    }

    client.remove_favorite(&place_id).await?;
    Ok(format!("Removed {} from favorites", shop.name))
}

/// Format the favorites list.
#[must_use]
pub fn render_favorites(favorites: &[CoffeeShop]) -> String {
    if favorites.is_empty() {
        return "No favorites yet.".to_string();
    }

    let mut out = String::new();
    for shop in favorites {
        let _ = writeln!(out, "★ {}  ({})", shop.name, shop.id);
    }
    out.trim_end().to_string()
}
