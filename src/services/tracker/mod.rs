//! Occupancy tracking for a single location
//!
//! The tracker owns the location's sensors and history store:
//! - `update` polls every sensor, averages the readings (truncating) and
//!   appends one history record
//! - `live_count` / `is_good_time_to_visit` read the last estimate only
//! - `history` / `export_history` go through the store
//!
//! The store connection lives exactly as long as the tracker.


use crate::domain::OccupancyRecord;
use crate::error::Result;
use crate::infra::config::Config;
use crate::infra::metrics::Metrics;
use crate::io::export::HistoryExporter;
use crate::io::store::OccupancyStore;
use crate::services::sensor::{default_sensors, SensorSource};
use chrono::{Local, NaiveDateTime, Timelike};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Occupancy strictly below this is a good time to visit
pub const GOOD_VISIT_THRESHOLD: u32 = 20;

/// Peak-hour windows as half-open `[start, end)` local hours
pub const PEAK_WINDOWS: [(u32, u32); 2] = [(12, 14), (17, 19)];

/// Truncating integer mean; 0 for no readings
fn truncating_average(readings: &[u32]) -> u32 {
    if readings.is_empty() {
        return 0;
    }
    let sum: u64 = readings.iter().map(|&r| u64::from(r)).sum();
    // Mean never exceeds the largest reading, so it fits back in u32
    (sum / readings.len() as u64) as u32
}

/// Occupancy estimator for one location
pub struct OccupancyTracker {
    location: String,
    /// Last computed estimate (snapshot, not authoritative history)
    current_occupancy: u32,
    sensors: Vec<Box<dyn SensorSource>>,
    store: OccupancyStore,
    good_visit_below: u32,
    metrics: Arc<Metrics>,
}

impl OccupancyTracker {
    /// Create a tracker from explicit parts
    pub fn new(
        location: &str,
        sensors: Vec<Box<dyn SensorSource>>,
        store: OccupancyStore,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            location: location.to_string(),
            current_occupancy: 0,
            sensors,
            store,
            good_visit_below: GOOD_VISIT_THRESHOLD,
            metrics,
        }
    }

    /// Open the location's on-disk store and install one simulated sensor per kind
    pub fn open(config: &Config, location: &str, metrics: Arc<Metrics>) -> Result<Self> {
        let path = OccupancyStore::db_path_for(config.data_dir(), location);
        let store = OccupancyStore::open(&path, location)?;
        let sensors = default_sensors(config.sensor_max_count(), config.sensor_noise());
        info!(
            location = %location,
            sensors = %sensors.len(),
            max_count = %config.sensor_max_count(),
            good_visit_below = %config.good_visit_below(),
            "tracker_opened"
        );
        Ok(Self::new(location, sensors, store, metrics)
            .with_good_visit_below(config.good_visit_below()))
    }

    /// Builder method to override the visit threshold
    pub fn with_good_visit_below(mut self, below: u32) -> Self {
        self.good_visit_below = below;
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Take new readings now and persist the estimate
    pub fn update(&mut self) -> Result<OccupancyRecord> {
        self.update_at(Local::now().naive_local())
    }

    /// Take new readings and persist the estimate stamped with `now`
    ///
    /// The in-memory estimate is replaced even when the append fails.
    pub fn update_at(&mut self, now: NaiveDateTime) -> Result<OccupancyRecord> {
        let readings: Vec<u32> = self.sensors.iter_mut().map(|s| s.reading()).collect();
        self.metrics.record_readings(readings.len());
        self.current_occupancy = truncating_average(&readings);

        let is_peak_hour = Self::is_peak_hour(now);
        let record =
            OccupancyRecord::new(now, self.current_occupancy, &self.location, is_peak_hour);

        if let Err(e) = self.store.append(&record) {
            self.metrics.record_storage_error();
            warn!(location = %self.location, error = %e, "occupancy_append_failed");
            return Err(e);
        }

        self.metrics.record_update(record.occupancy, is_peak_hour);
        info!(
            location = %self.location,
            readings = ?readings,
            occupancy = %record.occupancy,
            peak_hour = %is_peak_hour,
            "occupancy_updated"
        );
        Ok(record)
    }

    /// Last estimate, without taking a reading (0 before the first update)
    #[inline]
    pub fn live_count(&self) -> u32 {
        self.current_occupancy
    }

    #[inline]
    pub fn is_good_time_to_visit(&self) -> bool {
        self.current_occupancy < self.good_visit_below
    }

    /// Whether `at_time` falls in a peak-hour window (local clock hour)
    pub fn is_peak_hour<T: Timelike>(at_time: T) -> bool {
        let hour = at_time.hour();
        PEAK_WINDOWS.iter().any(|&(start, end)| (start..end).contains(&hour))
    }

    /// This location's records in insertion order
    pub fn history(&self) -> Result<Vec<OccupancyRecord>> {
        self.store.query(&self.location).map_err(|e| {
            self.metrics.record_storage_error();
            warn!(location = %self.location, error = %e, "history_query_failed");
            e
        })
    }

    /// Write this location's history through `exporter`; returns the file written
    pub fn export_history(&self, exporter: &HistoryExporter) -> Result<PathBuf> {
        let history = self.history()?;
        let path = exporter.export_location(&self.location, &history)?;
        self.metrics.record_export();
        Ok(path)
    }

    /// Release the store connection, reporting a failed close
    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}
