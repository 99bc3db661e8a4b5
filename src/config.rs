//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.coffee-dash.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use coffee_dash::Granularity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".coffee-dash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Default dashboard selections.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the transactions are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the transactions CSV.
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/coffee_shop_sales.csv")
}

/// Initial values of the dashboard filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Store location charted by default.
    #[serde(default = "default_location")]
    pub location: String,

    /// Bucket size of the sales chart.
    #[serde(default)]
    pub granularity: Granularity,

    /// Categories shown before "Other".
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Overlay the fitted trend.
    #[serde(default)]
    pub show_trend: bool,

    /// First day shown; the dataset's first day when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Last day shown; the dataset's last day when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            granularity: Granularity::Daily,
            top_n: default_top_n(),
            show_trend: false,
            start_date: None,
            end_date: None,
        }
    }
}

fn default_location() -> String {
    "Lower Manhattan".to_string()
}

fn default_top_n() -> usize {
    5
}

/// Report output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Output file; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.dataset.path = data.clone();
        }

        if let Some(ref location) = args.location {
            self.dashboard.location = location.clone();
        }
        if let Some(granularity) = args.granularity {
            self.dashboard.granularity = granularity.into();
        }
        if let Some(top_n) = args.top_n {
            self.dashboard.top_n = top_n;
        }
        if args.start.is_some() {
            self.dashboard.start_date = args.start;
        }
        if args.end.is_some() {
            self.dashboard.end_date = args.end;
        }
        if args.trend {
            self.dashboard.show_trend = true;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref output) = args.output {
            self.report.output = Some(output.clone());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
