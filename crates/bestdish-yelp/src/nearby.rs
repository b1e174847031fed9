//! Location-driven nearby lookup: cache first, fetch on miss.

use bestdish_core::{Business, Coordinate, LocationStatus};
use tokio::sync::{mpsc, watch, Mutex};

use crate::cache::GeoCache;
use crate::client::YelpClient;
use crate::error::YelpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearbySource {
    Cache,
    Network,
}

#[derive(Debug, Clone)]
pub struct NearbyResult {
    pub origin: Coordinate,
    pub businesses: Vec<Business>,
    pub source: NearbySource,
    /// Pages dropped from the fetch; always zero for cache hits.
    pub pages_failed: usize,
}

/// Published by [`NearbyService::run`]. `generation` identifies the location
/// update the message answers; it increases with every new fix.
#[derive(Debug)]
pub enum NearbyUpdate {
    Businesses {
        generation: u64,
        result: NearbyResult,
    },
    FetchFailed {
        generation: u64,
        origin: Coordinate,
        error: YelpError,
    },
    PermissionDenied,
}

pub struct NearbyService {
    client: YelpClient,
    cache: Mutex<GeoCache>,
    /// Fixes closer than this to an in-flight fetch's origin do not cancel
    /// it; the result would be served from the cache anyway.
    same_place_meters: f64,
}

impl NearbyService {
    #[must_use]
    pub fn new(client: YelpClient, cache: GeoCache) -> Self {
        let same_place_meters = cache.policy().max_radius_meters;
        Self {
            client,
            cache: Mutex::new(cache),
            same_place_meters,
        }
    }

    #[must_use]
    pub fn client(&self) -> &YelpClient {
        &self.client
    }

    /// Shared handle to the cache, for seeding and inspection.
    #[must_use]
    pub fn cache(&self) -> &Mutex<GeoCache> {
        &self.cache
    }

    /// Businesses near `coord`, from the cache when a valid entry exists,
    /// otherwise from a fresh paginated fetch that is then cached.
    ///
    /// The lock is not held across the fetch. A fetch in which every page
    /// failed is not cached.
    ///
    /// # Errors
    ///
    /// Propagates [`YelpClient::fetch_nearby`] errors.
    pub async fn businesses_near(&self, coord: Coordinate) -> Result<NearbyResult, YelpError> {
        if let Some(entry) = self.cache.lock().await.lookup(coord) {
            tracing::debug!(
                %coord,
                origin = %entry.origin,
                count = entry.businesses.len(),
                "nearby cache hit"
            );
            return Ok(NearbyResult {
                origin: entry.origin,
                businesses: entry.businesses.clone(),
                source: NearbySource::Cache,
                pages_failed: 0,
            });
        }

        tracing::debug!(%coord, "nearby cache miss");
        let batch = self.client.fetch_nearby(coord).await?;
        self.cache
            .lock()
            .await
            .store(coord, batch.businesses.clone());

        Ok(NearbyResult {
            origin: coord,
            businesses: batch.businesses,
            source: NearbySource::Network,
            pages_failed: batch.pages_failed,
        })
    }

    /// Follows `locations` until the feed closes or `updates` is dropped.
    ///
    /// Each new fix bumps the generation and starts a lookup. A fix that
    /// moves beyond the cache radius while a fetch is running cancels it, as
    /// does a denial; repeats of the same position let it finish. Only the
    /// newest generation ever publishes.
    pub async fn run(
        &self,
        mut locations: watch::Receiver<LocationStatus>,
        updates: mpsc::Sender<NearbyUpdate>,
    ) {
        let mut generation = 0u64;
        // Handle a fix that was already present at subscription time.
        let mut pending = true;

        'locations: loop {
            if !pending && locations.changed().await.is_err() {
                tracing::debug!("location feed closed, stopping nearby service");
                return;
            }
            pending = false;

            let status = *locations.borrow_and_update();
            let update = match status {
                LocationStatus::Pending => continue,
                LocationStatus::Denied => NearbyUpdate::PermissionDenied,
                LocationStatus::Available(coord) => {
                    generation += 1;
                    let lookup = self.businesses_near(coord);
                    tokio::pin!(lookup);
                    loop {
                        tokio::select! {
                            result = &mut lookup => break match result {
                                Ok(result) => NearbyUpdate::Businesses { generation, result },
                                Err(error) => NearbyUpdate::FetchFailed { generation, origin: coord, error },
                            },
                            changed = locations.changed() => {
                                if changed.is_err() {
                                    return;
                                }
                                let next = *locations.borrow();
                                if self.is_same_place(coord, next) {
                                    continue;
                                }
                                tracing::debug!(generation, %coord, "location moved mid-fetch, abandoning");
                                pending = true;
                                continue 'locations;
                            }
                        }
                    }
                }
            };

            if updates.send(update).await.is_err() {
                tracing::debug!("nearby update receiver dropped, stopping nearby service");
                return;
            }
        }
    }

    fn is_same_place(&self, in_flight: Coordinate, next: LocationStatus) -> bool {
        match next {
            LocationStatus::Available(coord) => {
                in_flight.distance_meters(&coord) <= self.same_place_meters
            }
            LocationStatus::Pending | LocationStatus::Denied => false,
        }
    }
}
