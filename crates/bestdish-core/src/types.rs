//! Domain types shared by the fetcher, the search filter, and the label store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::haversine_meters;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    #[must_use]
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        haversine_meters(self, other)
    }

    /// Cache key built from the raw coordinate values.
    ///
    /// Not rounded: two coordinates share a key only when both components
    /// are bit-for-bit equal as printed by `f64`'s shortest round-trip form.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Returns `true` when both components are finite and inside the valid
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// A business returned by the remote search endpoint. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: String,
}

impl Business {
    /// Street address when known, otherwise the city.
    #[must_use]
    pub fn display_location(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.city)
    }
}

/// A photographed dish labeled with a name and a restaurant.
///
/// Serialized with camel-case keys; `imageData` is base64 in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledImage {
    pub id: Uuid,
    #[serde(with = "base64_bytes")]
    pub image_data: Vec<u8>,
    pub food_dish: String,
    pub location: String,
}

impl LabeledImage {
    /// Creates a record with a fresh random id.
    #[must_use]
    pub fn new(image_data: Vec<u8>, food_dish: String, location: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_data,
            food_dish,
            location,
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
