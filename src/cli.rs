//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use coffee_dash::Granularity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// coffee-dash - Coffee shop sales dashboard
///
/// Load point-of-sale transactions and render a sales dashboard for one
/// store location: daily or weekly sales with an optional trend overlay,
/// plus top-N product categories by quantity and by revenue.
///
/// Examples:
///   coffee-dash --data data/coffee_shop_sales.csv
///   coffee-dash --location Astoria --granularity weekly --trend
///   coffee-dash --start 2023-03-01 --end 2023-03-31 --top-n 3 --format json
///   coffee-dash --list
///   coffee-dash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the transactions CSV
    ///
    /// Can also be set via COFFEE_DASH_DATA env var or .coffee-dash.toml config.
    #[arg(short, long, value_name = "FILE", env = "COFFEE_DASH_DATA")]
    pub data: Option<PathBuf>,

    /// Store location to chart
    #[arg(short, long, value_name = "NAME")]
    pub location: Option<String>,

    /// Bucket size of the sales chart
    #[arg(short, long, value_name = "GRANULARITY")]
    pub granularity: Option<GranularityArg>,

    /// First day to include (YYYY-MM-DD, defaults to the earliest transaction)
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, defaults to the latest transaction)
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Number of categories shown before collapsing the rest into "Other"
    #[arg(short = 'n', long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Overlay a fitted trend on the sales chart
    #[arg(short, long)]
    pub trend: bool,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path for the report (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .coffee-dash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List locations, category count and date range, then exit
    #[arg(long)]
    pub list: bool,

    /// Generate a default .coffee-dash.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Granularity as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GranularityArg {
    Daily,
    Weekly,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Daily => Granularity::Daily,
            GranularityArg::Weekly => Granularity::Weekly,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    ///
    /// Filter values (location, top-N, date order) are checked by the
    /// dashboard itself so they can be reported next to the affected chart.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: None,
            location: None,
            granularity: None,
            start: None,
            end: None,
            top_n: None,
            trend: false,
            format: None,
            output: None,
            config: None,
            list: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_parse_filter_flags() {
        let args = Args::try_parse_from([
            "coffee-dash",
            "--location",
            "Astoria",
            "--granularity",
            "weekly",
            "--start",
            "2023-01-01",
            "--end",
            "2023-01-31",
            "-n",
            "3",
            "--trend",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.location.as_deref(), Some("Astoria"));
        assert_eq!(args.granularity, Some(GranularityArg::Weekly));
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2023, 1, 31));
        assert_eq!(args.top_n, Some(3));
        assert!(args.trend);
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_rejects_malformed_date() {
        assert!(Args::try_parse_from(["coffee-dash", "--start", "01/02/2023"]).is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_config() {
        let mut args = make_args();
        args.config = Some(PathBuf::from("/nonexistent/.coffee-dash.toml"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_granularity_conversion() {
        assert_eq!(Granularity::from(GranularityArg::Daily), Granularity::Daily);
        assert_eq!(Granularity::from(GranularityArg::Weekly), Granularity::Weekly);
    }
}
