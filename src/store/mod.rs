//! Record store for the transaction dataset.
//!
//! The dataset is read once at startup, normalized (the line total is
//! derived for every row) and then shared read-only with every query.

use crate::errors::LoadError;
use crate::models::Transaction;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "store_location",
    "product_category",
    "transaction_date",
    "unit_price",
    "transaction_qty",
];

/// Date layouts accepted for `transaction_date`.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// The immutable, fully normalized transaction dataset.
#[derive(Debug, Clone)]
pub struct Transactions {
    records: Vec<Transaction>,
    date_bounds: (NaiveDate, NaiveDate),
}

impl Transactions {
    /// Wraps already-normalized records. Fails if there are none.
    pub fn new(records: Vec<Transaction>) -> Result<Self, LoadError> {
        let mut dates = records.iter().map(Transaction::transaction_date);
        let first = dates.next().ok_or(LoadError::Empty)?;
        let date_bounds = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

        Ok(Self {
            records,
            date_bounds,
        })
    }

    /// Loads the dataset from a CSV file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        info!("Loading transactions from {}", path.display());

        let file = File::open(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let transactions = Self::from_reader(file)?;

        let (min, max) = transactions.date_bounds();
        info!(
            "Loaded {} transactions across {} locations ({} to {})",
            transactions.len(),
            transactions.locations().len(),
            min,
            max
        );

        Ok(transactions)
    }

    /// Loads the dataset from any CSV source. Either every row loads or none do.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| -> Result<usize, LoadError> {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{FEFF}').eq_ignore_ascii_case(name))
                .ok_or(LoadError::MissingColumn(name))
        };

        let [location_idx, category_idx, date_idx, price_idx, qty_idx] = [
            column(REQUIRED_COLUMNS[0])?,
            column(REQUIRED_COLUMNS[1])?,
            column(REQUIRED_COLUMNS[2])?,
            column(REQUIRED_COLUMNS[3])?,
            column(REQUIRED_COLUMNS[4])?,
        ];

        let mut records = Vec::new();

        for (i, row) in reader.records().enumerate() {
            let row = row?;
            // File line of the row, header included.
            let line = row.position().map_or(i + 2, |p| p.line() as usize);

            let location = required(&row, location_idx, "store_location", line)?;
            let category = required(&row, category_idx, "product_category", line)?;
            let date = parse_date(required(&row, date_idx, "transaction_date", line)?)
                .ok_or_else(|| invalid_row(line, "unrecognized transaction_date"))?;
            let unit_price = parse_unit_price(required(&row, price_idx, "unit_price", line)?)
                .map_err(|reason| invalid_row(line, reason))?;
            let qty = parse_quantity(required(&row, qty_idx, "transaction_qty", line)?)
                .map_err(|reason| invalid_row(line, reason))?;

            records.push(Transaction::new(location, category, date, unit_price, qty));
        }

        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in source order.
    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    /// Distinct store locations, sorted.
    pub fn locations(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .map(|t| t.store_location().to_string())
            .collect()
    }

    pub fn has_location(&self, location: &str) -> bool {
        self.records.iter().any(|t| t.store_location() == location)
    }

    /// Number of distinct product categories (upper bound for top-N).
    pub fn category_count(&self) -> usize {
        self.records
            .iter()
            .map(Transaction::product_category)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Earliest and latest transaction dates.
    pub fn date_bounds(&self) -> (NaiveDate, NaiveDate) {
        self.date_bounds
    }
}

/// Returns a non-empty cell or rejects the row.
fn required<'a>(
    row: &'a csv::StringRecord,
    idx: usize,
    name: &str,
    line: usize,
) -> Result<&'a str, LoadError> {
    match row.get(idx) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(invalid_row(line, format!("empty {}", name))),
    }
}

fn invalid_row(line: usize, reason: impl Into<String>) -> LoadError {
    let reason = reason.into();
    debug!("Rejecting row at line {}: {}", line, reason);
    LoadError::InvalidRow { line, reason }
}

/// Parses a calendar date, discarding any time-of-day suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.split([' ', 'T']).next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

fn parse_unit_price(raw: &str) -> Result<f64, String> {
    let price = raw
        .parse::<f64>()
        .map_err(|e| format!("invalid unit_price '{}': {}", raw, e))?;
    if !price.is_finite() || price < 0.0 {
        return Err(format!("unit_price must be a non-negative number, got {}", raw));
    }
    Ok(price)
}

/// Parses a whole-unit quantity. Spreadsheet exports may write `2.0`.
fn parse_quantity(raw: &str) -> Result<u32, String> {
    if let Ok(qty) = raw.parse::<u32>() {
        return Ok(qty);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => {
            Ok(v as u32)
        }
        _ => Err(format!(
            "transaction_qty must be a non-negative whole number, got {}",
            raw
        )),
    }
}
