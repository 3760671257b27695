//! Occupancy history record

use chrono::{NaiveDateTime, Timelike};

/// Timestamp layout used in the store and in exported files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One immutable occupancy snapshot for a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyRecord {
    /// Local wall-clock time of the update, whole seconds
    pub timestamp: NaiveDateTime,
    /// Estimated number of people present
    pub occupancy: u32,
    /// Location identifier (exact-match key for history queries)
    pub location: String,
    /// Whether the update fell inside a peak-hour window
    pub is_peak_hour: bool,
}

impl OccupancyRecord {
    /// Build a record, dropping sub-second precision from the timestamp
    pub fn new(timestamp: NaiveDateTime, occupancy: u32, location: &str, is_peak_hour: bool) -> Self {
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);
        Self { timestamp, occupancy, location: location.to_string(), is_peak_hour }
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
    }
}
