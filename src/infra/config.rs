//! Configuration loading from TOML files
//!
//! Config file is selected via the `--config <path>` argument of the binary
//! (default: config/dev.toml). A missing file falls back to the compiled-in
//! defaults; a file that is unreadable, malformed or invalid is an error.

use crate::error::ShopSenseError;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsConfig {
    #[serde(default = "default_location_names")]
    pub names: Vec<String>,
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self { names: default_location_names() }
    }
}

fn default_location_names() -> Vec<String> {
    vec!["DMV".to_string(), "Mall".to_string(), "Airport".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorsConfig {
    /// Upper bound of a raw reading (people)
    #[serde(default = "default_max_count")]
    pub max_count: u32,
    /// Symmetric noise amplitude added to each raw reading
    #[serde(default = "default_noise")]
    pub noise: u32,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self { max_count: default_max_count(), noise: default_noise() }
    }
}

fn default_max_count() -> u32 {
    50
}

fn default_noise() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdsConfig {
    /// Occupancy strictly below this is a good time to visit
    #[serde(default = "default_good_visit_below")]
    pub good_visit_below: u32,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self { good_visit_below: default_good_visit_below() }
    }
}

fn default_good_visit_below() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<location>_occupancy.db` per location
    #[serde(default = "default_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving `<location>_history.csv`
    #[serde(default = "default_dir")]
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_dir() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuConfig {
    /// Pause after each menu action (seconds, 0 to disable)
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self { pause_secs: default_pause_secs() }
    }
}

fn default_pause_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub locations: LocationsConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub menu: MenuConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    locations: Vec<String>,
    sensor_max_count: u32,
    sensor_noise: u32,
    good_visit_below: u32,
    data_dir: PathBuf,
    export_dir: PathBuf,
    pause_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locations: default_location_names(),
            sensor_max_count: default_max_count(),
            sensor_noise: default_noise(),
            good_visit_below: default_good_visit_below(),
            data_dir: PathBuf::from(default_dir()),
            export_dir: PathBuf::from(default_dir()),
            pause_secs: default_pause_secs(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let config = Self::from_toml(toml_config, path.display().to_string());
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            locations: toml_config.locations.names,
            sensor_max_count: toml_config.sensors.max_count,
            sensor_noise: toml_config.sensors.noise,
            good_visit_below: toml_config.thresholds.good_visit_below,
            data_dir: PathBuf::from(toml_config.storage.data_dir),
            export_dir: PathBuf::from(toml_config.export.dir),
            pause_secs: toml_config.menu.pause_secs,
            config_file,
        }
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    ///
    /// Only a missing file falls back; a file that exists but is malformed or
    /// invalid is returned as an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "config_file_missing_using_defaults");
            return Ok(Self::default());
        }
        Self::from_file(path).map_err(|e| ShopSenseError::Config(format!("{:#}", e)))
    }

    /// Check values that would otherwise break the store or export layout
    pub fn validate(&self) -> crate::Result<()> {
        if self.locations.is_empty() {
            return Err(ShopSenseError::Config("no locations configured".to_string()));
        }
        for name in &self.locations {
            if name.trim().is_empty() {
                return Err(ShopSenseError::Config("empty location name".to_string()));
            }
            if name.contains([',', '/', '\\']) {
                return Err(ShopSenseError::Config(format!(
                    "location name {:?} must not contain ',', '/' or '\\'",
                    name
                )));
            }
        }
        if self.sensor_max_count == 0 {
            return Err(ShopSenseError::Config("sensors.max_count must be positive".to_string()));
        }
        Ok(())
    }

    // Getters for all config fields
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn sensor_max_count(&self) -> u32 {
        self.sensor_max_count
    }

    pub fn sensor_noise(&self) -> u32 {
        self.sensor_noise
    }

    pub fn good_visit_below(&self) -> u32 {
        self.good_visit_below
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn pause_secs(&self) -> u64 {
        self.pause_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method to place the store and exports under one directory
    pub fn with_dirs<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self.export_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Builder method to override the menu pause
    pub fn with_pause_secs(mut self, secs: u64) -> Self {
        self.pause_secs = secs;
        self
    }

    /// Builder method for tests to set the visit threshold
    #[cfg(test)]
    pub fn with_good_visit_below(mut self, below: u32) -> Self {
        self.good_visit_below = below;
        self
    }
}
