pub mod cache;
pub mod client;
pub mod error;
pub mod nearby;
mod retry;
pub mod types;

pub use cache::{CacheEntry, CachePolicy, GeoCache};
pub use client::{page_plan, ClientOptions, NearbyBatch, YelpClient, DEFAULT_BASE_URL};
pub use error::YelpError;
pub use nearby::{NearbyResult, NearbyService, NearbySource, NearbyUpdate};
