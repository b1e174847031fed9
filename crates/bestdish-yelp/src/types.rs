//! Wire types for `GET /businesses/search`.
//!
//! Only the fields the app uses are modelled; everything else in the
//! response is ignored by serde.
//!
//! ### `location.address1`
//! Observed as a string, `null`, missing, or `""` for food trucks and
//! pop-ups. Empty strings are folded into `None`.

use bestdish_core::Business;
use serde::Deserialize;

/// Top-level response body.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub businesses: Vec<YelpBusiness>,
    /// Total matches server-side; not bounded by `limit`.
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct YelpBusiness {
    pub id: String,
    pub name: String,
    pub location: YelpLocation,
}

#[derive(Debug, Deserialize)]
pub struct YelpLocation {
    #[serde(default)]
    pub address1: Option<String>,
    pub city: String,
}

impl From<YelpBusiness> for Business {
    fn from(raw: YelpBusiness) -> Self {
        let address = raw
            .location
            .address1
            .map(|a| a.trim().to_owned())
            .filter(|a| !a.is_empty());
        Business {
            id: raw.id,
            name: raw.name,
            address,
            city: raw.location.city,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_business_and_ignores_extra_fields() {
        let body = serde_json::json!({
            "businesses": [{
                "id": "abc",
                "name": "Golden Noodle",
                "rating": 4.5,
                "location": { "address1": "12 Grant Ave", "city": "San Francisco", "zip_code": "94108" }
            }],
            "total": 812,
            "region": { "center": { "latitude": 37.0, "longitude": -122.0 } }
        });
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.total, Some(812));
        let business: Business = parsed.businesses.into_iter().next().unwrap().into();
        assert_eq!(business.id, "abc");
        assert_eq!(business.address.as_deref(), Some("12 Grant Ave"));
        assert_eq!(business.city, "San Francisco");
    }

    #[test]
    fn null_missing_and_empty_address_become_none() {
        for location in [
            serde_json::json!({ "address1": null, "city": "Oakland" }),
            serde_json::json!({ "city": "Oakland" }),
            serde_json::json!({ "address1": "  ", "city": "Oakland" }),
        ] {
            let raw: YelpBusiness = serde_json::from_value(serde_json::json!({
                "id": "x", "name": "Truck", "location": location
            }))
            .unwrap();
            let business = Business::from(raw);
            assert!(business.address.is_none());
        }
    }

    #[test]
    fn missing_city_is_a_decode_error() {
        let result = serde_json::from_value::<YelpBusiness>(serde_json::json!({
            "id": "x", "name": "No City", "location": { "address1": "1 A St" }
        }));
        assert!(result.is_err());
    }
}
