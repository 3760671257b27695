//! Services - business logic and state management
//!
//! - `sensor` - Simulated and scripted occupancy sensors
//! - `tracker` - Per-location occupancy estimate, peak-hour classification and history

pub mod sensor;
pub mod tracker;

// Re-export commonly used types
pub use sensor::{default_sensors, ScriptedSensor, SensorSource, SimulatedSensor};
pub use tracker::{OccupancyTracker, GOOD_VISIT_THRESHOLD};
