//! Lock-free session metrics
//!
//! Counters are plain atomics so a tracker can record through a shared
//! `Arc<Metrics>` without `&mut` access.
//!
//! All atomics use Relaxed ordering; they are statistical counters only and
//! must not drive any logic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Update an atomic max value using compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(
            current_max,
            new_value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

/// Occupancy and persistence counters for one session
pub struct Metrics {
    /// Completed occupancy updates (monotonic)
    updates_total: AtomicU64,
    /// Updates that fell inside a peak-hour window (monotonic)
    peak_updates_total: AtomicU64,
    /// Individual sensor readings taken (monotonic)
    readings_total: AtomicU64,
    /// Sum of computed occupancies, for the session average
    occupancy_sum: AtomicU64,
    /// Highest computed occupancy this session
    occupancy_max: AtomicU64,
    /// Most recent computed occupancy
    last_occupancy: AtomicU64,
    /// History files written (monotonic)
    exports_total: AtomicU64,
    /// Failed store operations (monotonic)
    storage_errors_total: AtomicU64,
    started_at: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            updates_total: AtomicU64::new(0),
            peak_updates_total: AtomicU64::new(0),
            readings_total: AtomicU64::new(0),
            occupancy_sum: AtomicU64::new(0),
            occupancy_max: AtomicU64::new(0),
            last_occupancy: AtomicU64::new(0),
            exports_total: AtomicU64::new(0),
            storage_errors_total: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Record a batch of sensor readings taken for one update
    #[inline]
    pub fn record_readings(&self, count: usize) {
        self.readings_total.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a persisted occupancy update
    #[inline]
    pub fn record_update(&self, occupancy: u32, is_peak_hour: bool) {
        let occupancy = u64::from(occupancy);
        self.updates_total.fetch_add(1, Ordering::Relaxed);
        if is_peak_hour {
            self.peak_updates_total.fetch_add(1, Ordering::Relaxed);
        }
        self.occupancy_sum.fetch_add(occupancy, Ordering::Relaxed);
        self.last_occupancy.store(occupancy, Ordering::Relaxed);
        update_atomic_max(&self.occupancy_max, occupancy);
    }

    #[inline]
    pub fn record_export(&self) {
        self.exports_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_storage_error(&self) {
        self.storage_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn updates_total(&self) -> u64 {
        self.updates_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn storage_errors_total(&self) -> u64 {
        self.storage_errors_total.load(Ordering::Relaxed)
    }

    /// Snapshot all counters
    pub fn report(&self) -> MetricsSummary {
        let updates_total = self.updates_total.load(Ordering::Relaxed);
        let occupancy_sum = self.occupancy_sum.load(Ordering::Relaxed);
        let avg_occupancy =
            if updates_total > 0 { occupancy_sum as f64 / updates_total as f64 } else { 0.0 };

        MetricsSummary {
            updates_total,
            peak_updates_total: self.peak_updates_total.load(Ordering::Relaxed),
            readings_total: self.readings_total.load(Ordering::Relaxed),
            avg_occupancy,
            max_occupancy: self.occupancy_max.load(Ordering::Relaxed),
            last_occupancy: self.last_occupancy.load(Ordering::Relaxed),
            exports_total: self.exports_total.load(Ordering::Relaxed),
            storage_errors_total: self.storage_errors_total.load(Ordering::Relaxed),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}

/// Point-in-time view of the session counters
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub updates_total: u64,
    pub peak_updates_total: u64,
    pub readings_total: u64,
    pub avg_occupancy: f64,
    pub max_occupancy: u64,
    pub last_occupancy: u64,
    pub exports_total: u64,
    pub storage_errors_total: u64,
    pub uptime_secs: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            updates = %self.updates_total,
            peak_updates = %self.peak_updates_total,
            readings = %self.readings_total,
            avg_occupancy = format!("{:.1}", self.avg_occupancy),
            max_occupancy = %self.max_occupancy,
            last_occupancy = %self.last_occupancy,
            exports = %self.exports_total,
            storage_errors = %self.storage_errors_total,
            uptime_secs = %self.uptime_secs,
            "metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.updates_total(), 0);
        let summary = metrics.report();
        assert_eq!(summary.avg_occupancy, 0.0);
        assert_eq!(summary.max_occupancy, 0);
    }

    #[test]
    fn test_record_update_tracks_avg_max_last() {
        let metrics = Metrics::new();
        metrics.record_update(12, false);
        metrics.record_update(0, true);
        metrics.record_update(49, true);

        let summary = metrics.report();
        assert_eq!(summary.updates_total, 3);
        assert_eq!(summary.peak_updates_total, 2);
        assert_eq!(summary.max_occupancy, 49);
        assert_eq!(summary.last_occupancy, 49);
        assert!((summary.avg_occupancy - 61.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_readings_and_errors() {
        let metrics = Metrics::new();
        metrics.record_readings(3);
        metrics.record_readings(3);
        metrics.record_storage_error();
        metrics.record_export();

        let summary = metrics.report();
        assert_eq!(summary.readings_total, 6);
        assert_eq!(summary.storage_errors_total, 1);
        assert_eq!(summary.exports_total, 1);
    }

    #[test]
    fn test_update_atomic_max_keeps_highest() {
        let max = AtomicU64::new(10);
        update_atomic_max(&max, 5);
        assert_eq!(max.load(Ordering::Relaxed), 10);
        update_atomic_max(&max, 42);
        assert_eq!(max.load(Ordering::Relaxed), 42);
    }
}
