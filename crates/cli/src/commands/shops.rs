//! Nearby search and shop details.
//!
//! # Usage
//!
//! ```bash
//! # Search around the default location (San Francisco)
//! ristretto nearby
//!
//! # Search around a point with a wider radius
//! ristretto nearby --lat 45.5152 --lng -122.6784 --radius 1500 --max 20
//!
//! # Show one shop
//! ristretto shop ChIJ...
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use ristretto_client::{
    ApiClient, DeniedLocation, LocationResolver, LocationSource, NearbyShops, Reconciler,
    SearchOutcome,
};
use ristretto_core::{CoffeeShop, CoffeeShopDetails, GeoPoint, distance_km};

use super::{CliError, favorite_marker, place_id};

/// Search for coffee shops and list them nearest first.
///
/// Without `--lat`/`--lng` the search is centred on the default location.
///
/// # Errors
///
/// Returns an error if the coordinates are invalid or the search fails.
pub async fn nearby(
    client: &ApiClient,
    center: Option<(f64, f64)>,
    radius_meters: u32,
    max_results: u32,
) -> Result<String, CliError> {
    let source = match center {
        Some((latitude, longitude)) => LocationSource::Manual(GeoPoint {
            latitude,
            longitude,
        }),
        None => LocationSource::Default,
    };

    let coordinates = LocationResolver::new(DeniedLocation)
        .with_constraints(radius_meters, max_results)
        .resolve(source)
        .await?;

    let view = NearbyShops::new(Arc::new(Reconciler::new(client.clone())));
    let shops = match view.search(&coordinates).await? {
        SearchOutcome::Applied(shops) => shops,
        SearchOutcome::Stale => Vec::new(),
    };

    tracing::debug!(count = shops.len(), "Nearby search complete");
    Ok(render_nearby(coordinates.center(), &shops))
}

/// Show the details of one shop.
///
/// # Errors
///
/// Returns an error if the ID is invalid or the lookup fails.
pub async fn show(client: &ApiClient, id: &str) -> Result<String, CliError> {
    let details = client.shop_details(&place_id(id)?).await?;
    Ok(render_details(&details))
}

/// Format search results, one shop per entry with its distance.
#[must_use]
pub fn render_nearby(origin: GeoPoint, shops: &[CoffeeShop]) -> String {
    if shops.is_empty() {
        return "No coffee shops found nearby.".to_string();
    }

    let mut out = String::new();
    for (rank, shop) in shops.iter().enumerate() {
        let km = distance_km(origin, shop.position());
        let _ = writeln!(
            out,
            "{:>2}. {} ({km:.2} km){}\n    {}",
            rank + 1,
            shop.name,
            favorite_marker(shop),
            shop.id
        );
    }
    out.trim_end().to_string()
}

/// Format a shop's detail record.
#[must_use]
pub fn render_details(details: &CoffeeShopDetails) -> String {
    let mut out = format!("{}{}", details.name, favorite_marker(&details.summary()));
    let mut line = |label: &str, value: &str| {
        let _ = write!(out, "\n  {label:<9}{value}");
    };

    if let Some(address) = &details.address {
        line("Address", address);
    }
    if let Some(phone) = &details.phone_number {
        line("Phone", phone);
    }
    if let Some(website) = &details.website {
        line("Website", website);
    }
    if let Some(rating) = details.rating {
        line("Rating", &format!("{rating:.1}"));
    }
    if let Some(level) = details.price_level {
        line("Price", &"$".repeat(usize::from(level.max(1))));
    }
    line("ID", details.id.as_str());

    if !details.opening_hours.is_empty() {
        out.push_str("\n  Hours");
        for hours in &details.opening_hours {
            let _ = write!(out, "\n    {hours}");
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ristretto_core::PlaceId;

    use super::*;

    fn shop(id: &str, name: &str, latitude: f64, longitude: f64, is_favorite: bool) -> CoffeeShop {
        CoffeeShop {
            id: PlaceId::parse(id).unwrap(),
            name: name.to_string(),
            latitude,
            longitude,
            is_favorite,
            photos: None,
        }
    }

    #[test]
    fn test_render_nearby_empty() {
        assert_eq!(
            render_nearby(GeoPoint::DEFAULT, &[]),
            "No coffee shops found nearby."
        );
    }

    #[test]
    fn test_render_nearby_lists_distance_and_marker() {
        let out = render_nearby(
            GeoPoint::DEFAULT,
            &[
                shop("p1", "Blue Bottle", 37.7937, -122.3965, true),
                shop("p2", "Sightglass", 37.7771, -122.4080, false),
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " 1. Blue Bottle (0.00 km) ★");
        assert_eq!(lines[1], "    p1");
        assert!(lines[2].starts_with(" 2. Sightglass ("));
        assert!(!lines[2].contains('★'));
    }

    #[test]
    fn test_render_details() {
        let details: CoffeeShopDetails = sample_details();
        let out = render_details(&details);
        assert!(out.starts_with("Saint Frank"));
        assert!(out.contains("Address  2340 Polk St"));
        assert!(out.contains("Price    $$"));
        assert!(out.contains("Rating   4.6"));
        assert!(out.contains("Monday: 7:00 AM"));
    }

    fn sample_details() -> CoffeeShopDetails {
        CoffeeShopDetails {
            id: PlaceId::parse("p1").unwrap(),
            name: "Saint Frank".to_string(),
            latitude: 37.7989,
            longitude: -122.4262,
            is_favorite: false,
            address: Some("2340 Polk St".to_string()),
            phone_number: None,
            website: None,
            rating: Some(4.6),
            price_level: Some(2),
            opening_hours: vec!["Monday: 7:00 AM - 5:00 PM".to_string()],
            photos: Vec::new(),
        }
    }
}
