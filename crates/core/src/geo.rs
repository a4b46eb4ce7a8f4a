//! Great-circle distance helpers.

use crate::types::{CoffeeShop, GeoPoint};

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometres.
#[must_use]
pub fn distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Order shops nearest-first from `origin`.
///
/// The sort is stable, so shops at equal distance keep the backend's order.
pub fn rank_by_distance(origin: GeoPoint, shops: &mut [CoffeeShop]) {
    shops.sort_by(|a, b| {
        distance_km(origin, a.position()).total_cmp(&distance_km(origin, b.position()))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::PlaceId;

    fn shop(id: &str, latitude: f64, longitude: f64) -> CoffeeShop {
        CoffeeShop {
            id: PlaceId::parse(id).unwrap(),
            name: id.to_string(),
            latitude,
            longitude,
            is_favorite: false,
            photos: None,
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert!(distance_km(GeoPoint::DEFAULT, GeoPoint::DEFAULT).abs() < 1e-9);
    }

    #[test]
    fn test_distance_sf_to_la() {
        let sf = GeoPoint::new(37.7749, -122.4194).unwrap();
        let la = GeoPoint::new(34.0522, -118.2437).unwrap();
        let d = distance_km(sf, la);
        assert!((d - 559.1).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(51.5074, -0.1278).unwrap();
        let b = GeoPoint::new(48.8566, 2.3522).unwrap();
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_rank_by_distance_nearest_first_and_stable() {
        let origin = GeoPoint::DEFAULT;
        let mut shops = vec![
            shop("far", 37.80, -122.40),
            shop("tie-a", 37.7940, -122.3965),
            shop("near", 37.7938, -122.3965),
            shop("tie-b", 37.7940, -122.3965),
        ];
        rank_by_distance(origin, &mut shops);
        let order: Vec<_> = shops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, ["near", "tie-a", "tie-b", "far"]);
    }
}
