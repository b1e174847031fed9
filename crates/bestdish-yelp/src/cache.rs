//! Short-lived, location-keyed cache of nearby business lists.
//!
//! Each entry remembers the exact coordinate of the fetch that produced it.
//! A lookup scans every entry and accepts one only if it is younger than the
//! TTL *and* its origin lies within `max_radius_meters` of the lookup point;
//! exact key matches are irrelevant because a moving device almost never
//! reports the same coordinate twice.
//!
//! Capacity is bounded: every store sweeps expired entries, then evicts the
//! oldest entries until the map fits `max_entries`.

use std::collections::HashMap;
use std::time::Duration;

use bestdish_core::{AppConfig, Business, Coordinate};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub max_radius_meters: f64,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(2 * 60 * 60),
            max_radius_meters: 500.0,
            max_entries: 64,
        }
    }
}

impl CachePolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            ttl: Duration::from_secs(config.cache_ttl_secs),
            max_radius_meters: config.cache_radius_meters,
            max_entries: config.cache_max_entries.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub businesses: Vec<Business>,
    pub fetched_at: Instant,
    pub origin: Coordinate,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

#[derive(Debug, Default)]
pub struct GeoCache {
    policy: CachePolicy,
    entries: HashMap<String, CacheEntry>,
}

impl GeoCache {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, coord: Coordinate) -> Option<&CacheEntry> {
        self.lookup_at(coord, Instant::now())
    }

    /// Best valid entry for `coord` as of `now`: the nearest origin, newest
    /// on a tie.
    #[must_use]
    pub fn lookup_at(&self, coord: Coordinate, now: Instant) -> Option<&CacheEntry> {
        self.entries
            .values()
            .filter(|entry| entry.is_fresh(now, self.policy.ttl))
            .map(|entry| (entry.origin.distance_meters(&coord), entry))
            .filter(|(distance, _)| *distance <= self.policy.max_radius_meters)
            .min_by(|(da, a), (db, b)| {
                da.total_cmp(db)
                    .then_with(|| b.fetched_at.cmp(&a.fetched_at))
            })
            .map(|(_, entry)| entry)
    }

    pub fn store(&mut self, coord: Coordinate, businesses: Vec<Business>) {
        self.store_at(coord, businesses, Instant::now());
    }

    /// Inserts or overwrites the entry keyed by `coord`, stamped `now`.
    pub fn store_at(&mut self, coord: Coordinate, businesses: Vec<Business>, now: Instant) {
        self.sweep_expired(now);
        self.entries.insert(
            coord.cache_key(),
            CacheEntry {
                businesses,
                fetched_at: now,
                origin: coord,
            },
        );
        self.evict_oldest_over_capacity();
    }

    /// Drops every entry older than the TTL; returns how many were removed.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let ttl = self.policy.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now, ttl));
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "swept expired cache entries");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_oldest_over_capacity(&mut self) {
        let capacity = self.policy.max_entries.max(1);
        while self.entries.len() > capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(key = %oldest, "evicted oldest cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(60 * 60);
    const MINUTE: Duration = Duration::from_secs(60);

    fn business(id: &str) -> Business {
        Business {
            id: id.to_owned(),
            name: format!("Place {id}"),
            address: None,
            city: "San Francisco".to_owned(),
        }
    }

    fn cache() -> GeoCache {
        GeoCache::new(CachePolicy {
            ttl: 2 * HOUR,
            max_radius_meters: 500.0,
            max_entries: 8,
        })
    }

    #[test]
    fn lookup_within_radius_and_ttl_hits() {
        let start = Instant::now();
        let mut cache = cache();
        let origin = Coordinate::new(37.0, -122.0);
        cache.store_at(origin, vec![business("a"), business("b")], start);

        let nearby = Coordinate::new(37.001, -122.001);
        let hit = cache
            .lookup_at(nearby, start + HOUR + 10 * MINUTE)
            .expect("entry ~140 m away and 70 min old should be valid");
        assert_eq!(hit.origin, origin);
        assert_eq!(hit.businesses, vec![business("a"), business("b")]);
    }

    #[test]
    fn lookup_outside_radius_misses() {
        let start = Instant::now();
        let mut cache = cache();
        cache.store_at(Coordinate::new(37.0, -122.0), vec![business("a")], start);
        // ~1.1 km north.
        assert!(cache
            .lookup_at(Coordinate::new(37.01, -122.0), start)
            .is_none());
    }

    #[test]
    fn lookup_at_exact_radius_hits() {
        let start = Instant::now();
        let origin = Coordinate::new(37.0, -122.0);
        let probe = Coordinate::new(37.001, -122.0);
        let distance = origin.distance_meters(&probe);
        let mut cache = GeoCache::new(CachePolicy {
            max_radius_meters: distance,
            ..CachePolicy::default()
        });
        cache.store_at(origin, vec![business("a")], start);
        assert!(cache.lookup_at(probe, start).is_some());
    }

    #[test]
    fn lookup_past_ttl_misses() {
        let start = Instant::now();
        let mut cache = cache();
        let origin = Coordinate::new(37.0, -122.0);
        cache.store_at(origin, vec![business("a")], start);
        assert!(cache.lookup_at(origin, start + 2 * HOUR - MINUTE).is_some());
        assert!(
            cache.lookup_at(origin, start + 2 * HOUR).is_none(),
            "an entry exactly ttl old is stale"
        );
    }

    #[test]
    fn lookup_prefers_nearest_origin() {
        let start = Instant::now();
        let mut cache = cache();
        let far = Coordinate::new(37.003, -122.0);
        let near = Coordinate::new(37.0005, -122.0);
        cache.store_at(far, vec![business("far")], start + MINUTE);
        cache.store_at(near, vec![business("near")], start);

        let hit = cache.lookup_at(Coordinate::new(37.0, -122.0), start + MINUTE).unwrap();
        assert_eq!(hit.origin, near);
    }

    #[test]
    fn storing_twice_keeps_one_entry_with_latest_timestamp() {
        let start = Instant::now();
        let mut cache = cache();
        let origin = Coordinate::new(37.0, -122.0);
        let list = vec![business("a"), business("b")];

        cache.store_at(origin, list.clone(), start);
        cache.store_at(origin, list.clone(), start + MINUTE);

        assert_eq!(cache.len(), 1);
        let entry = cache.lookup_at(origin, start + MINUTE).unwrap();
        assert_eq!(entry.businesses, list);
        assert_eq!(entry.fetched_at, start + MINUTE);
    }

    #[test]
    fn store_overwrites_instead_of_merging() {
        let start = Instant::now();
        let mut cache = cache();
        let origin = Coordinate::new(37.0, -122.0);
        cache.store_at(origin, vec![business("a"), business("b")], start);
        cache.store_at(origin, vec![business("c")], start + MINUTE);
        let entry = cache.lookup_at(origin, start + MINUTE).unwrap();
        assert_eq!(entry.businesses, vec![business("c")]);
    }

    #[test]
    fn store_sweeps_expired_entries() {
        let start = Instant::now();
        let mut cache = cache();
        cache.store_at(Coordinate::new(10.0, 10.0), vec![], start);
        cache.store_at(Coordinate::new(20.0, 20.0), vec![], start + 3 * HOUR);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn store_evicts_oldest_beyond_capacity() {
        let start = Instant::now();
        let mut cache = GeoCache::new(CachePolicy {
            max_entries: 2,
            ..CachePolicy::default()
        });
        let first = Coordinate::new(1.0, 1.0);
        let second = Coordinate::new(2.0, 2.0);
        let third = Coordinate::new(3.0, 3.0);
        cache.store_at(first, vec![business("1")], start);
        cache.store_at(second, vec![business("2")], start + MINUTE);
        cache.store_at(third, vec![business("3")], start + 2 * MINUTE);

        assert_eq!(cache.len(), 2);
        let now = start + 2 * MINUTE;
        assert!(cache.lookup_at(first, now).is_none());
        assert!(cache.lookup_at(second, now).is_some());
        assert!(cache.lookup_at(third, now).is_some());
    }

    #[test]
    fn sweep_expired_reports_removed_count() {
        let start = Instant::now();
        let mut cache = cache();
        cache.store_at(Coordinate::new(1.0, 1.0), vec![], start);
        cache.store_at(Coordinate::new(2.0, 2.0), vec![], start + HOUR);
        assert_eq!(cache.sweep_expired(start + 2 * HOUR + MINUTE), 1);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
