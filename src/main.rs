//! ShopSense - simulated occupancy monitoring for retail locations
//!
//! Module structure:
//! - `domain/` - Core business types (SensorType, OccupancyRecord)
//! - `io/` - Persistence and file output (SQLite store, history export)
//! - `services/` - Business logic (sensors, OccupancyTracker)
//! - `infra/` - Infrastructure (Config, Metrics)
//! - `cli/` - Interactive menu

use anyhow::Context;
use clap::Parser;
use shopsense::cli::Session;
use shopsense::infra::{Config, Metrics};
use shopsense::io::HistoryExporter;
use shopsense::services::OccupancyTracker;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// ShopSense - real-time occupancy information
#[derive(Parser, Debug)]
#[command(name = "shopsense", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    /// Seconds to pause after each menu action (overrides config)
    #[arg(long)]
    pause_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the menu on stdout.
    // Default: WARN, use RUST_LOG=info for update/export events
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!(version = env!("CARGO_PKG_VERSION"), git_hash = env!("GIT_HASH"), "shopsense_starting");

    let mut config = Config::load_from_path(&args.config)?;
    if let Some(secs) = args.pause_secs {
        config = config.with_pause_secs(secs);
    }

    info!(
        config_file = %config.config_file(),
        locations = ?config.locations(),
        data_dir = %config.data_dir().display(),
        export_dir = %config.export_dir().display(),
        max_count = %config.sensor_max_count(),
        good_visit_below = %config.good_visit_below(),
        pause_secs = %config.pause_secs(),
        "config_loaded"
    );

    std::fs::create_dir_all(config.data_dir()).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir().display())
    })?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock())
        .with_pause(Duration::from_secs(config.pause_secs()));

    let metrics = Arc::new(Metrics::new());
    let Some(mut tracker) = session.open_tracker(&config, &metrics)? else {
        info!("no_location_selected");
        return Ok(());
    };
    let exporter = HistoryExporter::new(config.export_dir());

    session.run(&mut tracker, &exporter)?;

    if let Err(e) = tracker.close() {
        warn!(error = %e, "tracker_close_failed");
    }
    metrics.report().log();
    info!("shopsense shutdown complete");
    Ok(())
}
