//! coffee-dash - Coffee shop sales dashboard
//!
//! A CLI front-end that loads the transaction dataset once and renders
//! the sales dashboard for the selected filters as a Markdown or JSON
//! report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (dataset, config, or output failure)

mod cli;
mod config;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use coffee_dash::report::{self, Report, ReportMetadata};
use coffee_dash::{FilterSpec, Transactions};
use config::{Config, CONFIG_FILE};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("coffee-dash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .coffee-dash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the dataset path and default filters.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report written to stdout stays clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset and render the dashboard.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Nothing is served unless the whole dataset loads.
    let dataset = &config.dataset.path;
    let transactions = Transactions::load(dataset)
        .with_context(|| format!("Cannot start without dataset {}", dataset.display()))?;

    if args.list {
        print_dataset_summary(&transactions);
        return Ok(());
    }

    let filter = resolve_filter(&config, &transactions);
    info!(
        "Rendering {} dashboard for {} ({} to {}, top {})",
        filter.granularity, filter.location, filter.start_date, filter.end_date, filter.top_n
    );

    let dashboard = report::build_dashboard(&transactions, &filter, config.dashboard.show_trend);
    let report = Report {
        metadata: ReportMetadata::describe(dataset.display().to_string(), &transactions),
        dashboard,
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match config.report.output {
        Some(ref path) => {
            report::write_report(&output, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Build the filter from merged settings, defaulting the date range to the
/// full span of the dataset.
fn resolve_filter(config: &Config, transactions: &Transactions) -> FilterSpec {
    let (first, last) = transactions.date_bounds();
    let dashboard = &config.dashboard;

    FilterSpec {
        location: dashboard.location.clone(),
        granularity: dashboard.granularity,
        start_date: dashboard.start_date.unwrap_or(first),
        end_date: dashboard.end_date.unwrap_or(last),
        top_n: dashboard.top_n,
    }
}

/// Handle --list: print what the dashboard selectors would offer.
fn print_dataset_summary(transactions: &Transactions) {
    let (first, last) = transactions.date_bounds();

    println!("📍 Locations:");
    for location in transactions.locations() {
        println!("   - {}", location);
    }
    println!("🏷️  Categories: {}", transactions.category_count());
    println!("📅 Date range: {} to {}", first, last);
    println!("🧾 Transactions: {}", transactions.len());
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use coffee_dash::{Granularity, Transaction};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn test_resolve_filter_defaults_to_dataset_bounds() {
        let transactions = Transactions::new(vec![
            Transaction::new("Astoria", "Coffee", date(4), 3.0, 1),
            Transaction::new("Astoria", "Tea", date(20), 2.0, 1),
        ])
        .unwrap();

        let mut config = Config::default();
        let filter = resolve_filter(&config, &transactions);
        assert_eq!(filter.location, "Lower Manhattan");
        assert_eq!(filter.granularity, Granularity::Daily);
        assert_eq!((filter.start_date, filter.end_date), (date(4), date(20)));
        assert_eq!(filter.top_n, 5);

        config.dashboard.start_date = Some(date(10));
        let filter = resolve_filter(&config, &transactions);
        assert_eq!((filter.start_date, filter.end_date), (date(10), date(20)));
    }
}
