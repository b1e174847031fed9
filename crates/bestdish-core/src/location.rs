//! Location updates as a subscribable channel.
//!
//! A [`LocationFeed`] is the single publisher; every subscriber sees the
//! latest [`LocationStatus`] and is woken on each change. Intermediate values
//! published faster than a subscriber reads them are skipped.

use tokio::sync::watch;

use crate::types::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationStatus {
    /// No fix yet.
    Pending,
    Available(Coordinate),
    /// The user refused location access.
    Denied,
}

impl LocationStatus {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            LocationStatus::Available(coord) => Some(*coord),
            LocationStatus::Pending | LocationStatus::Denied => None,
        }
    }
}

#[derive(Debug)]
pub struct LocationFeed {
    tx: watch::Sender<LocationStatus>,
}

impl LocationFeed {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LocationStatus::Pending);
        Self { tx }
    }

    /// Publishes a new fix. Subscribers are notified even when the
    /// coordinate equals the previous one.
    pub fn publish(&self, coord: Coordinate) {
        self.tx.send_replace(LocationStatus::Available(coord));
    }

    pub fn deny(&self) {
        self.tx.send_replace(LocationStatus::Denied);
    }

    #[must_use]
    pub fn current(&self) -> LocationStatus {
        *self.tx.borrow()
    }

    /// Returns a receiver whose current value is marked unseen, so the first
    /// `changed().await` resolves immediately when a fix already exists.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LocationStatus> {
        let mut rx = self.tx.subscribe();
        if !matches!(*rx.borrow(), LocationStatus::Pending) {
            rx.mark_changed();
        }
        rx
    }
}

impl Default for LocationFeed {
    fn default() -> Self {
        Self::new()
    }
}
