//! Visit history.

use std::fmt::Write as _;

use ristretto_client::{ApiClient, Reconciler};
use ristretto_core::Visit;

use super::{CliError, fetch_shop, place_id};

/// Record a visit to a shop.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the shop cannot be fetched or the
/// visit is rejected.
pub async fn record(client: &ApiClient, id: &str) -> Result<String, CliError> {
    let shop = fetch_shop(client, &place_id(id)?).await?;
    Reconciler::new(client.clone()).record_visit(&shop).await?;
    Ok(format!("Recorded visit to {}", shop.name))
}

/// List visit history.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn list(client: &ApiClient) -> Result<String, CliError> {
    let visits = client.visits().await?;
    Ok(render_visits(&visits))
}

/// Format visits, one per line.
#[must_use]
pub fn render_visits(visits: &[Visit]) -> String {
    if visits.is_empty() {
        return "No visits recorded.".to_string();
    }

    let mut out = String::new();
    for visit in visits {
        let _ = writeln!(
            out,
            "{}  {}",
            visit.visited_at.format("%Y-%m-%d %H:%M UTC"),
            visit.name
        );
    }
    out.trim_end().to_string()
}
