//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the ukc-config.toml file.
//! It provides a centralized way to configure the NOAA endpoints and the defaults
//! used when requesting tide predictions.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "ukc-config.toml";

/// Application configuration loaded from ukc-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// NOAA service endpoints
    pub api: ApiConfig,
    /// Defaults for tide prediction queries
    pub predictions: PredictionConfig,
}

/// NOAA CO-OPS service endpoints
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Metadata API base, serving `stations.json` and `stations/{id}.json`
    pub metadata_url: String,
    /// Data API `datagetter` endpoint
    pub datagetter_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Query parameters sent with every prediction request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionConfig {
    /// Hours of predictions starting at the requested date
    pub range_hours: u32,
    /// `hilo` for high/low events only, `h` for hourly, or minutes (`6`, `60`)
    pub interval: String,
    /// Datum used when the station's own list is not consulted
    pub datum: String,
    /// `lst_ldt`, `lst` or `gmt`
    pub time_zone: String,
    /// `metric` or `english`
    pub units: String,
    /// Application name reported to NOAA
    pub application: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                metadata_url: "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi"
                    .to_string(),
                datagetter_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter"
                    .to_string(),
                timeout_secs: 30,
            },
            predictions: PredictionConfig {
                range_hours: 24,
                interval: "hilo".to_string(),
                datum: "MLLW".to_string(),
                time_zone: "lst_ldt".to_string(),
                units: "metric".to_string(),
                application: "ukc_calculator".to_string(),
            },
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PredictionConfig {
    /// True when NOAA will answer in meters
    pub fn is_metric(&self) -> bool {
        self.units.eq_ignore_ascii_case("metric")
    }
}

impl Config {
    /// Load configuration from ukc-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
