#![allow(dead_code)]

use std::time::Duration;

use bestdish_yelp::{ClientOptions, YelpClient};
use serde_json::json;

pub const API_KEY: &str = "test-key";

/// Page size 2, cap 8 → four pages at offsets 0, 2, 4, 6. No retries.
pub fn small_pages() -> ClientOptions {
    ClientOptions {
        request_timeout: Duration::from_secs(5),
        page_timeout: Duration::from_secs(5),
        page_size: 2,
        max_results: 8,
        max_retries: 0,
        backoff_base_ms: 0,
        user_agent: "bestdish-test/0.1".to_owned(),
    }
}

pub fn test_client(base_url: &str, options: ClientOptions) -> YelpClient {
    YelpClient::with_base_url(API_KEY, base_url, options).expect("failed to build test YelpClient")
}

/// A search response body holding one business per id.
pub fn businesses_json(ids: &[&str]) -> serde_json::Value {
    let businesses: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Restaurant {id}"),
                "location": { "address1": format!("{id} Main St"), "city": "San Francisco" }
            })
        })
        .collect();
    json!({ "businesses": businesses, "total": ids.len() })
}
