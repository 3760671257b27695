//! Menu sessions driven from in-memory input

use shopsense::cli::Session;
use shopsense::domain::SensorType;
use shopsense::infra::{Config, Metrics};
use shopsense::io::{HistoryExporter, OccupancyStore};
use shopsense::services::{OccupancyTracker, ScriptedSensor, SensorSource};
use std::sync::Arc;
use tempfile::tempdir;

fn tracker_with_reading(location: &str, reading: u32) -> OccupancyTracker {
    let sensors: Vec<Box<dyn SensorSource>> =
        vec![Box::new(ScriptedSensor::new(SensorType::Thermal, vec![reading]))];
    let store = OccupancyStore::open_in_memory(location).unwrap();
    OccupancyTracker::new(location, sensors, store, Arc::new(Metrics::new()))
}

fn run_session(input: &str, tracker: &mut OccupancyTracker, exporter: &HistoryExporter) -> String {
    let mut session = Session::new(input.as_bytes(), Vec::new());
    session.run(tracker, exporter).unwrap();
    String::from_utf8(session.into_output()).unwrap()
}

#[test]
fn test_full_session() {
    let dir = tempdir().unwrap();
    let exporter = HistoryExporter::new(dir.path());
    let mut tracker = tracker_with_reading("Mall", 35);

    let output = run_session("4\n1\n3\n1\n2\n4\n5\n6\n", &mut tracker, &exporter);

    assert!(output.contains("BON/ShopSense - Real-time Occupancy Information for Mall"));
    assert!(output.contains("No history data available."));
    assert!(output.contains("Live count at Mall: 0 people"));
    assert!(output.contains("Manual update completed."));
    assert!(output.contains("Live count at Mall: 35 people"));
    assert!(output.contains("It might be crowded. Consider waiting for a better time."));
    assert!(output.contains(" - Occupancy: 35 (Peak Hour: "));
    assert!(output.contains("Occupancy history saved to file: "));
    assert!(output.trim_end().ends_with("Exiting BON/ShopSense. Thank you!"));

    let csv = std::fs::read_to_string(dir.path().join("Mall_history.csv")).unwrap();
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn test_good_time_message() {
    let dir = tempdir().unwrap();
    let mut tracker = tracker_with_reading("DMV", 19);

    let output = run_session("3\n2\n6\n", &mut tracker, &HistoryExporter::new(dir.path()));
    assert!(output.contains("It's a good time to visit!"));
}

#[test]
fn test_invalid_input_is_reported_and_session_continues() {
    let dir = tempdir().unwrap();
    let mut tracker = tracker_with_reading("Airport", 12);

    let output = run_session("9\nhello\n\n1\n6\n", &mut tracker, &HistoryExporter::new(dir.path()));

    assert!(output.contains("Invalid choice. Please enter a number between 1 and 6."));
    assert!(output.contains("Invalid input \"hello\""));
    assert!(output.contains("Live count at Airport: 0 people"));
    assert!(output.contains("Exiting BON/ShopSense. Thank you!"));
    // Invalid input never touched the tracker
    assert_eq!(tracker.live_count(), 0);
    assert!(tracker.history().unwrap().is_empty());
}

#[test]
fn test_end_of_input_ends_session() {
    let dir = tempdir().unwrap();
    let mut tracker = tracker_with_reading("Mall", 5);

    let output = run_session("3\n", &mut tracker, &HistoryExporter::new(dir.path()));

    assert!(output.contains("Manual update completed."));
    assert!(!output.contains("Exiting"));
    assert_eq!(tracker.history().unwrap().len(), 1);
}

#[test]
fn test_export_failure_is_printed_and_session_continues() {
    let dir = tempdir().unwrap();
    // A directory where the history file should go makes the export fail
    std::fs::create_dir(dir.path().join("Mall_history.csv")).unwrap();
    let mut tracker = tracker_with_reading("Mall", 5);

    let output = run_session("5\n1\n6\n", &mut tracker, &HistoryExporter::new(dir.path()));

    assert!(output.contains("An error occurred: Failed to write export file"));
    assert!(output.contains("Live count at Mall: 0 people"));
    assert!(output.contains("Exiting BON/ShopSense. Thank you!"));
}

#[test]
fn test_non_utf8_input_is_reported_and_session_continues() {
    let dir = tempdir().unwrap();
    let mut tracker = tracker_with_reading("Mall", 8);
    let mut session = Session::new(&b"\xff\xfe\n1\n6\n"[..], Vec::new());

    session.run(&mut tracker, &HistoryExporter::new(dir.path())).unwrap();

    let output = String::from_utf8(session.into_output()).unwrap();
    assert!(output.contains("Invalid input"));
    assert!(output.contains("Live count at Mall: 0 people"));
    assert!(output.trim_end().ends_with("Exiting BON/ShopSense. Thank you!"));
}

#[test]
fn test_unusable_store_reprompts_for_location() {
    let dir = tempdir().unwrap();
    // A directory where the Mall database should be makes the store fail to open
    std::fs::create_dir(dir.path().join("Mall_occupancy.db")).unwrap();
    let config = Config::default().with_dirs(dir.path()).with_pause_secs(0);
    let metrics = Arc::new(Metrics::new());
    let mut session = Session::new("2\n3\n3\n6\n".as_bytes(), Vec::new());

    let mut tracker = session.open_tracker(&config, &metrics).unwrap().unwrap();
    assert_eq!(tracker.location(), "Airport");
    session.run(&mut tracker, &HistoryExporter::new(dir.path())).unwrap();

    let output = String::from_utf8(session.into_output()).unwrap();
    assert!(output.contains("An error occurred: Storage error"));
    assert_eq!(output.matches("Welcome to BON/ShopSense!").count(), 2);
    assert!(output.contains("Manual update completed."));
    assert!(output.contains("Exiting BON/ShopSense. Thank you!"));
    assert_eq!(tracker.history().unwrap().len(), 1);
    tracker.close().unwrap();
}
