//! Interactive occupancy menu
//!
//! Reads choices line by line from any `BufRead` and writes to any `Write`,
//! so a session can be driven from stdin/stdout or from a test buffer.
//! Invalid input is reported and re-prompted; core failures are printed and
//! the session continues. End of input ends the session.

use crate::infra::config::Config;
use crate::infra::metrics::Metrics;
use crate::io::export::HistoryExporter;
use crate::services::tracker::OccupancyTracker;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Invalid menu or location selection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid choice. Please enter a number between 1 and {max}.")]
    OutOfRange { max: usize },

    #[error("Invalid input {input:?}. Please enter a number between 1 and {max}.")]
    NotANumber { input: String, max: usize },
}

/// Parse a 1-based selection in `1..=max`, returning the 0-based index
pub fn parse_selection(input: &str, max: usize) -> Result<usize, InputError> {
    let trimmed = input.trim();
    let n: usize = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber { input: trimmed.to_string(), max })?;
    if n == 0 || n > max {
        return Err(InputError::OutOfRange { max });
    }
    Ok(n - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    LiveCount,
    GoodTimeToVisit,
    ManualUpdate,
    ViewHistory,
    ExportHistory,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::LiveCount,
        MenuChoice::GoodTimeToVisit,
        MenuChoice::ManualUpdate,
        MenuChoice::ViewHistory,
        MenuChoice::ExportHistory,
        MenuChoice::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::LiveCount => "Get Live Count",
            MenuChoice::GoodTimeToVisit => "Check if it's a Good Time to Visit",
            MenuChoice::ManualUpdate => "Manual Update",
            MenuChoice::ViewHistory => "View Occupancy History",
            MenuChoice::ExportHistory => "Save Occupancy History to File",
            MenuChoice::Exit => "Exit",
        }
    }
}

impl FromStr for MenuChoice {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selection(s, Self::ALL.len()).map(|idx| Self::ALL[idx])
    }
}

/// One interactive session over an input/output pair
pub struct Session<R, W> {
    input: R,
    output: W,
    pause: Duration,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, pause: Duration::ZERO }
    }

    /// Pause after each menu action
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `prompt` and read one line; `None` at end of input
    ///
    /// Bytes that are not UTF-8 are replaced, so they fail selection parsing
    /// like any other bad input.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Ask for a location until a valid one is chosen; `None` at end of input
    pub fn select_location(&mut self, locations: &[String]) -> io::Result<Option<String>> {
        writeln!(self.output, "Welcome to BON/ShopSense!")?;
        writeln!(self.output, "Available Locations:")?;
        for (i, loc) in locations.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, loc)?;
        }

        let prompt = format!("Select a location (1-{}): ", locations.len());
        loop {
            let Some(line) = self.prompt(&prompt)? else {
                return Ok(None);
            };
            match parse_selection(&line, locations.len()) {
                Ok(idx) => return Ok(Some(locations[idx].clone())),
                Err(e) => {
                    debug!(input = %line.trim(), "invalid_location_selection");
                    writeln!(self.output, "{}", e)?;
                }
            }
        }
    }

    /// Select a location and open its tracker, re-prompting while the store
    /// cannot be opened; `None` at end of input
    pub fn open_tracker(
        &mut self,
        config: &Config,
        metrics: &Arc<Metrics>,
    ) -> io::Result<Option<OccupancyTracker>> {
        loop {
            let Some(location) = self.select_location(config.locations())? else {
                return Ok(None);
            };
            match OccupancyTracker::open(config, &location, metrics.clone()) {
                Ok(tracker) => return Ok(Some(tracker)),
                Err(e) => {
                    metrics.record_storage_error();
                    self.report_error(&e)?;
                }
            }
        }
    }

    fn display_menu(&mut self, location: &str) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "BON/ShopSense - Real-time Occupancy Information for {}", location)?;
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, choice.label())?;
        }
        Ok(())
    }

    /// Run the menu loop until Exit or end of input
    pub fn run(
        &mut self,
        tracker: &mut OccupancyTracker,
        exporter: &HistoryExporter,
    ) -> io::Result<()> {
        let prompt = format!("Select an option (1-{}): ", MenuChoice::ALL.len());
        loop {
            self.display_menu(tracker.location())?;
            let Some(line) = self.prompt(&prompt)? else {
                debug!("menu_input_closed");
                return Ok(());
            };

            match line.parse::<MenuChoice>() {
                Ok(MenuChoice::Exit) => {
                    writeln!(self.output, "Exiting BON/ShopSense. Thank you!")?;
                    return Ok(());
                }
                Ok(choice) => self.handle(choice, tracker, exporter)?,
                Err(e) => writeln!(self.output, "{}", e)?,
            }

            if !self.pause.is_zero() {
                std::thread::sleep(self.pause);
            }
        }
    }

    fn handle(
        &mut self,
        choice: MenuChoice,
        tracker: &mut OccupancyTracker,
        exporter: &HistoryExporter,
    ) -> io::Result<()> {
        let location = tracker.location().to_string();
        match choice {
            MenuChoice::LiveCount => {
                writeln!(self.output, "Live count at {}: {} people", location, tracker.live_count())?;
            }
            MenuChoice::GoodTimeToVisit => {
                if tracker.is_good_time_to_visit() {
                    writeln!(self.output, "It's a good time to visit!")?;
                } else {
                    writeln!(
                        self.output,
                        "It might be crowded. Consider waiting for a better time."
                    )?;
                }
            }
            MenuChoice::ManualUpdate => match tracker.update() {
                Ok(_) => writeln!(self.output, "Manual update completed.")?,
                Err(e) => self.report_error(&e)?,
            },
            MenuChoice::ViewHistory => match tracker.history() {
                Ok(history) if history.is_empty() => {
                    writeln!(self.output, "No history data available.")?;
                }
                Ok(history) => {
                    for record in &history {
                        let peak = if record.is_peak_hour { "Yes" } else { "No" };
                        writeln!(
                            self.output,
                            "{} - Occupancy: {} (Peak Hour: {})",
                            record.timestamp_str(),
                            record.occupancy,
                            peak
                        )?;
                    }
                }
                Err(e) => self.report_error(&e)?,
            },
            MenuChoice::ExportHistory => match tracker.export_history(exporter) {
                Ok(path) => writeln!(
                    self.output,
                    "Occupancy history saved to file: {}",
                    path.display()
                )?,
                Err(e) => self.report_error(&e)?,
            },
            MenuChoice::Exit => {}
        }
        Ok(())
    }

    fn report_error(&mut self, e: &crate::ShopSenseError) -> io::Result<()> {
        warn!(error = %e, "menu_action_failed");
        writeln!(self.output, "An error occurred: {}", e)
    }
}
