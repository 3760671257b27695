//! Occupancy history store - one SQLite file per location
//!
//! The store owns its connection; dropping the store closes it, on error
//! paths included. `close()` is available when the caller wants to see a
//! failed close instead of having it ignored by `Drop`.

use crate::domain::OccupancyRecord;
use crate::error::Result;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS occupancy_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        occupancy INTEGER NOT NULL,
        location TEXT NOT NULL,
        peak_hour BOOLEAN
    )";

const INSERT_SQL: &str = "
    INSERT INTO occupancy_history (timestamp, occupancy, location, peak_hour)
    VALUES (?1, ?2, ?3, ?4)";

const SELECT_BY_LOCATION_SQL: &str = "
    SELECT timestamp, occupancy, location, peak_hour
    FROM occupancy_history
    WHERE location = ?1
    ORDER BY id";

const COUNT_BY_LOCATION_SQL: &str =
    "SELECT COUNT(*) FROM occupancy_history WHERE location = ?1";

/// Append-only occupancy history for one location
pub struct OccupancyStore {
    conn: Connection,
    location: String,
}

impl OccupancyStore {
    /// Database file for a location: `<data_dir>/<location>_occupancy.db`
    pub fn db_path_for(data_dir: &Path, location: &str) -> PathBuf {
        data_dir.join(format!("{}_occupancy.db", location))
    }

    /// Open (or create) the database file and ensure the table exists
    pub fn open<P: AsRef<Path>>(path: P, location: &str) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self { conn, location: location.to_string() };
        store.initialize()?;
        info!(location = %location, path = %path.display(), "store_opened");
        Ok(store)
    }

    /// Open a private in-memory database (nothing survives the store)
    pub fn open_in_memory(location: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, location: location.to_string() };
        store.initialize()?;
        debug!(location = %location, "store_opened_in_memory");
        Ok(store)
    }

    /// Create the history table if it does not exist yet. Safe to repeat.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(())
    }

    /// Location this store was opened for
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Persist one record (single statement, atomic)
    pub fn append(&self, record: &OccupancyRecord) -> Result<()> {
        self.conn.execute(
            INSERT_SQL,
            params![
                record.timestamp_str(),
                record.occupancy,
                record.location,
                record.is_peak_hour
            ],
        )?;
        debug!(
            location = %record.location,
            occupancy = %record.occupancy,
            peak_hour = %record.is_peak_hour,
            "record_appended"
        );
        Ok(())
    }

    /// All records for `location` in insertion order; empty when none exist
    pub fn query(&self, location: &str) -> Result<Vec<OccupancyRecord>> {
        let mut stmt = self.conn.prepare_cached(SELECT_BY_LOCATION_SQL)?;
        let rows = stmt.query_map(params![location], |row| {
            let raw_ts: String = row.get(0)?;
            let timestamp = OccupancyRecord::parse_timestamp(&raw_ts)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
            let peak_hour: Option<bool> = row.get(3)?;
            Ok(OccupancyRecord {
                timestamp,
                occupancy: row.get(1)?,
                location: row.get(2)?,
                is_peak_hour: peak_hour.unwrap_or(false),
            })
        })?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Number of records stored for `location`
    pub fn count(&self, location: &str) -> Result<u64> {
        let count: i64 =
            self.conn.query_row(COUNT_BY_LOCATION_SQL, params![location], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Close the connection, reporting any failure
    pub fn close(self) -> Result<()> {
        let location = self.location;
        self.conn.close().map_err(|(_, e)| e)?;
        info!(location = %location, "store_closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopSenseError;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::tempdir;

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap().and_hms_opt(hour, min, sec).unwrap()
    }

    fn record(location: &str, occupancy: u32, hour: u32) -> OccupancyRecord {
        OccupancyRecord::new(at(hour, 0, 0), occupancy, location, hour == 12)
    }

    #[test]
    fn test_db_path_for() {
        let path = OccupancyStore::db_path_for(Path::new("/var/lib/shopsense"), "Mall");
        assert_eq!(path, PathBuf::from("/var/lib/shopsense/Mall_occupancy.db"));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let store = OccupancyStore::open_in_memory("Mall").unwrap();
        store.initialize().unwrap();
        store.initialize().unwrap();
        assert_eq!(store.count("Mall").unwrap(), 0);
    }

    #[test]
    fn test_query_empty_location() {
        let store = OccupancyStore::open_in_memory("Mall").unwrap();
        assert!(store.query("Mall").unwrap().is_empty());
    }

    #[test]
    fn test_append_and_query_preserves_order() {
        let store = OccupancyStore::open_in_memory("Mall").unwrap();
        let records = vec![record("Mall", 30, 9), record("Mall", 5, 12), record("Mall", 18, 8)];
        for r in &records {
            store.append(r).unwrap();
        }

        // Insertion order, not timestamp order
        assert_eq!(store.query("Mall").unwrap(), records);
        assert_eq!(store.count("Mall").unwrap(), 3);
    }

    #[test]
    fn test_query_filters_by_exact_location() {
        let store = OccupancyStore::open_in_memory("Mall").unwrap();
        store.append(&record("Mall", 10, 9)).unwrap();
        store.append(&record("DMV", 20, 9)).unwrap();
        store.append(&record("mall", 30, 9)).unwrap();

        let mall = store.query("Mall").unwrap();
        assert_eq!(mall.len(), 1);
        assert_eq!(mall[0].occupancy, 10);
        assert_eq!(store.query("DMV").unwrap()[0].occupancy, 20);
        assert!(store.query("Airport").unwrap().is_empty());
    }

    #[test]
    fn test_history_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = OccupancyStore::db_path_for(dir.path(), "Airport");

        let store = OccupancyStore::open(&path, "Airport").unwrap();
        store.append(&record("Airport", 42, 17)).unwrap();
        store.close().unwrap();

        let reopened = OccupancyStore::open(&path, "Airport").unwrap();
        let history = reopened.query("Airport").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].occupancy, 42);
        assert_eq!(history[0].timestamp, at(17, 0, 0));
    }

    #[test]
    fn test_open_unreachable_medium_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("Mall_occupancy.db");
        let err = OccupancyStore::open(&path, "Mall").err().unwrap();
        assert!(err.is_storage());
    }

    #[test]
    fn test_constraint_violation_is_storage_error() {
        let store = OccupancyStore::open_in_memory("Mall").unwrap();
        store
            .conn
            .execute_batch(
                "DROP TABLE occupancy_history;
                 CREATE TABLE occupancy_history (
                     id INTEGER PRIMARY KEY AUTOINCREMENT,
                     timestamp TEXT NOT NULL,
                     occupancy INTEGER NOT NULL CHECK (occupancy > 100),
                     location TEXT NOT NULL,
                     peak_hour BOOLEAN
                 );",
            )
            .unwrap();

        let err = store.append(&record("Mall", 10, 9)).unwrap_err();
        assert!(matches!(err, ShopSenseError::Storage(_)));
    }

    #[test]
    fn test_malformed_timestamp_is_storage_error() {
        let store = OccupancyStore::open_in_memory("Mall").unwrap();
        store
            .conn
            .execute(
                "INSERT INTO occupancy_history (timestamp, occupancy, location, peak_hour)
                 VALUES ('yesterday', 3, 'Mall', 0)",
                [],
            )
            .unwrap();

        assert!(store.query("Mall").unwrap_err().is_storage());
    }

    #[test]
    fn test_null_peak_hour_reads_as_false() {
        let store = OccupancyStore::open_in_memory("Mall").unwrap();
        store
            .conn
            .execute(
                "INSERT INTO occupancy_history (timestamp, occupancy, location, peak_hour)
                 VALUES ('2024-05-17 12:00:00', 3, 'Mall', NULL)",
                [],
            )
            .unwrap();

        let history = store.query("Mall").unwrap();
        assert!(!history[0].is_peak_hour);
    }
}
