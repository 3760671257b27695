//! IO modules - persistence and file output
//!
//! - `store` - SQLite occupancy history, one database per location
//! - `export` - comma-separated history export

pub mod export;
pub mod store;

// Re-export commonly used types
pub use export::HistoryExporter;
pub use store::OccupancyStore;
