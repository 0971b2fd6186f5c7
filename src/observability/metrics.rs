//! Metrics registry
//!
//! Monotonic counters plus the current store size. Reset only on process
//! start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by the HTTP layer.
///
/// All counters use Relaxed ordering; values are exact but not
/// synchronized with each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    requests: AtomicU64,
    cars_created: AtomicU64,
    cars_updated: AtomicU64,
    cars_deleted: AtomicU64,
    not_found: AtomicU64,
    rejected: AtomicU64,
    cars: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_cars_created(&self, count: u64) {
        self.cars_created.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_cars_updated(&self) {
        self.cars_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cars_deleted(&self) {
        self.cars_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests refused with a 4xx other than 404
    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Set current number of stored cars
    pub fn set_cars(&self, count: u64) {
        self.cars.store(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cars_created: self.cars_created.load(Ordering::Relaxed),
            cars_updated: self.cars_updated.load(Ordering::Relaxed),
            cars_deleted: self.cars_deleted.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            cars: self.cars.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub cars_created: u64,
    pub cars_updated: u64,
    pub cars_deleted: u64,
    pub not_found: u64,
    pub rejected: u64,
    pub cars: u64,
}
