//! Coffee shop records as served by the backend.

use serde::{Deserialize, Serialize};

use super::coordinates::GeoPoint;
use super::place_id::PlaceId;

/// A coffee shop returned by a nearby search or the favorites list.
///
/// The backend omits `isFavorite` when it is false, so it defaults on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShop {
    pub id: PlaceId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_favorite: bool,
    /// Photo reference string attached to search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<String>,
}

impl CoffeeShop {
    /// The shop's position.
    #[must_use]
    pub const fn position(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Extended shop record from the details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShopDetails {
    pub id: PlaceId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
}

impl CoffeeShopDetails {
    /// The summary record used by list views and favorite/visit calls.
    #[must_use]
    pub fn summary(&self) -> CoffeeShop {
        CoffeeShop {
            id: self.id.clone(),
            name: self.name.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            is_favorite: self.is_favorite,
            photos: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_favorite_defaults_false() {
        let shop: CoffeeShop = serde_json::from_str(
            r#"{"id":"p1","name":"Blue Bottle","latitude":37.79,"longitude":-122.39,"photos":""}"#,
        )
        .unwrap();
        assert!(!shop.is_favorite);
        assert_eq!(shop.id.as_str(), "p1");
    }

    #[test]
    fn test_serializes_camel_case() {
        let shop = CoffeeShop {
            id: PlaceId::parse("p2").unwrap(),
            name: "Sightglass".to_string(),
            latitude: 37.77,
            longitude: -122.41,
            is_favorite: true,
            photos: None,
        };
        let json = serde_json::to_value(&shop).unwrap();
        assert_eq!(json["isFavorite"], serde_json::Value::Bool(true));
        assert!(json.get("photos").is_none());
    }

    #[test]
    fn test_details_optional_fields() {
        let details: CoffeeShopDetails = serde_json::from_str(
            r#"{
                "id": "p3",
                "name": "Ritual",
                "latitude": 37.75,
                "longitude": -122.42,
                "isFavorite": false,
                "address": "1026 Valencia St",
                "rating": 4.5,
                "openingHours": ["Monday: 7:00 AM - 7:00 PM"]
            }"#,
        )
        .unwrap();
        assert_eq!(details.address.as_deref(), Some("1026 Valencia St"));
        assert_eq!(details.opening_hours.len(), 1);
        assert!(details.photos.is_empty());
        assert!(details.website.is_none());

        let summary = details.summary();
        assert_eq!(summary.name, "Ritual");
        assert!(!summary.is_favorite);
    }
}
