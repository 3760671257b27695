//! Domain models - core business types
//!
//! This module contains the canonical data types used throughout the system:
//! - `SensorType` - kind of people-counting sensor
//! - `OccupancyRecord` - one immutable occupancy snapshot for a location

pub mod record;
pub mod types;

// Re-export commonly used types at module level
pub use record::{OccupancyRecord, TIMESTAMP_FORMAT};
pub use types::SensorType;
