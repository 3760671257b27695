//! History export - writes a location's history as comma-separated text
//!
//! Layout: header `timestamp,occupancy,peak_hour`, then one line per record
//! in insertion order. Values are not quoted; timestamps and locations never
//! contain commas (location names are validated at config load).

use crate::domain::OccupancyRecord;
use crate::error::{Result, ShopSenseError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const HEADER: &str = "timestamp,occupancy,peak_hour";

/// Writes history files into one directory
pub struct HistoryExporter {
    dir: PathBuf,
}

impl HistoryExporter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Export file name for a location: `<location>_history.csv`
    pub fn history_file_name(location: &str) -> String {
        format!("{}_history.csv", location)
    }

    /// Destination this exporter uses for `location`
    pub fn destination_for(&self, location: &str) -> PathBuf {
        self.dir.join(Self::history_file_name(location))
    }

    /// Export a location's history into this exporter's directory
    pub fn export_location(&self, location: &str, history: &[OccupancyRecord]) -> Result<PathBuf> {
        Self::export(history, self.destination_for(location))
    }

    /// Write `history` to `destination`, replacing any existing file
    ///
    /// Returns the path written.
    pub fn export<P: AsRef<Path>>(history: &[OccupancyRecord], destination: P) -> Result<PathBuf> {
        let path = destination.as_ref().to_path_buf();
        Self::write_file(history, &path)
            .map_err(|source| ShopSenseError::Export { path: path.clone(), source })?;
        info!(path = %path.display(), records = %history.len(), "history_exported");
        Ok(path)
    }

    fn write_file(history: &[OccupancyRecord], path: &Path) -> std::io::Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{}", HEADER)?;
        for record in history {
            writeln!(writer, "{}", Self::format_row(record))?;
        }
        writer.flush()?;
        debug!(file = %path.display(), "export_flushed");
        Ok(())
    }

    /// One data row: `timestamp,occupancy,peak_hour`
    pub fn format_row(record: &OccupancyRecord) -> String {
        format!("{},{},{}", record.timestamp_str(), record.occupancy, record.is_peak_hour)
    }
}
