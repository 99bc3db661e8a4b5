//! Data models for the sales dashboard.
//!
//! This module contains the core data structures shared by the record
//! store, the analysis pipeline and the report layer.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the synthetic bucket that collects every category outside the top N.
pub const OTHER_LABEL: &str = "Other";

/// One point-of-sale transaction.
///
/// The line total is derived once in [`Transaction::new`] and exposed
/// read-only, so every consumer sees the same value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    store_location: String,
    product_category: String,
    transaction_date: NaiveDate,
    unit_price: f64,
    transaction_qty: u32,
    transaction_total: f64,
}

impl Transaction {
    /// Creates a transaction and computes its total (`unit_price * transaction_qty`).
    pub fn new(
        store_location: impl Into<String>,
        product_category: impl Into<String>,
        transaction_date: NaiveDate,
        unit_price: f64,
        transaction_qty: u32,
    ) -> Self {
        Self {
            store_location: store_location.into(),
            product_category: product_category.into(),
            transaction_date,
            unit_price,
            transaction_qty,
            transaction_total: unit_price * f64::from(transaction_qty),
        }
    }

    pub fn store_location(&self) -> &str {
        &self.store_location
    }

    pub fn product_category(&self) -> &str {
        &self.product_category
    }

    pub fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn transaction_qty(&self) -> u32 {
        self.transaction_qty
    }

    pub fn transaction_total(&self) -> f64 {
        self.transaction_total
    }
}

/// Time resolution of the sales series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar day (default)
    #[default]
    Daily,
    /// One bucket per Monday-start week
    Weekly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "Daily"),
            Granularity::Weekly => write!(f, "Weekly"),
        }
    }
}

impl Granularity {
    /// Maps a transaction date to the key of the bucket that contains it.
    ///
    /// Weekly buckets are keyed by the Monday that starts the week.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
        }
    }

    /// Human readable label for a bucket key.
    pub fn label(&self, bucket: NaiveDate) -> String {
        match self {
            Granularity::Daily => bucket.format("%Y-%m-%d").to_string(),
            Granularity::Weekly => format!("Week of {}", bucket.format("%Y-%m-%d")),
        }
    }
}

/// Quantity ranked by the category breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Units sold (`transaction_qty`)
    Quantity,
    /// Revenue (`transaction_total`)
    Revenue,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Quantity => write!(f, "Quantity"),
            Measure::Revenue => write!(f, "Sales"),
        }
    }
}

impl Measure {
    /// Value of this measure for a single transaction.
    pub fn of(&self, transaction: &Transaction) -> f64 {
        match self {
            Measure::Quantity => f64::from(transaction.transaction_qty()),
            Measure::Revenue => transaction.transaction_total(),
        }
    }
}

/// Parameters selected by the user for one dashboard refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Store location shown in the sales chart.
    pub location: String,
    /// Bucket size of the sales chart.
    pub granularity: Granularity,
    /// First day included (inclusive).
    pub start_date: NaiveDate,
    /// Last day included (inclusive).
    pub end_date: NaiveDate,
    /// Number of categories shown before collapsing the rest into "Other".
    pub top_n: usize,
}

/// A single point of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket key (the day, or the Monday of the week).
    pub date: NaiveDate,
    /// Value for the bucket.
    pub value: f64,
}

/// Sales summed per bucket, ordered by date ascending.
///
/// The series is sparse: days or weeks without transactions have no bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSeries {
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
}

impl SalesSeries {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket keys in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.iter().map(|b| b.date)
    }

    /// Summed sales, aligned with [`SalesSeries::dates`].
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.buckets.iter().map(|b| b.value)
    }

    /// Looks up the value of one bucket.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.buckets
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|i| self.buckets[i].value)
    }

    /// Sum over all buckets.
    pub fn total(&self) -> f64 {
        self.values().sum()
    }
}

/// One slice of a category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub label: String,
    pub value: f64,
}

/// Top-N categories by a measure, optionally followed by an "Other" entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub measure: Measure,
    pub entries: Vec<CategoryShare>,
    /// Number of categories folded into the trailing "Other" entry. Zero
    /// means every entry is a real category, even one labelled "Other".
    #[serde(default)]
    pub collapsed: usize,
}

impl CategoryBreakdown {
    /// Sum of all entries, "Other" included.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    /// The ranked categories without the trailing "Other" entry.
    pub fn ranked(&self) -> &[CategoryShare] {
        match self.other() {
            Some(_) => &self.entries[..self.entries.len() - 1],
            None => &self.entries,
        }
    }

    /// The synthetic "Other" entry, when the ranking collapsed any categories.
    pub fn other(&self) -> Option<&CategoryShare> {
        if self.collapsed == 0 {
            return None;
        }
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transaction_total_is_derived() {
        let t = Transaction::new("Astoria", "Coffee", date(2023, 1, 1), 2.5, 4);
        assert_eq!(t.transaction_total(), 10.0);
        assert_eq!(Measure::Quantity.of(&t), 4.0);
        assert_eq!(Measure::Revenue.of(&t), 10.0);
    }

    #[test]
    fn test_weekly_bucket_starts_on_monday() {
        // 2023-01-02 is a Monday.
        let monday = date(2023, 1, 2);
        for offset in 0..7 {
            let day = monday + Duration::days(offset);
            assert_eq!(Granularity::Weekly.bucket_start(day), monday);
        }
        assert_eq!(Granularity::Weekly.bucket_start(date(2023, 1, 1)), date(2022, 12, 26));
        assert_eq!(Granularity::Daily.bucket_start(date(2023, 1, 4)), date(2023, 1, 4));
    }

    #[test]
    fn test_granularity_labels() {
        assert_eq!(Granularity::Daily.label(date(2023, 3, 9)), "2023-03-09");
        assert_eq!(
            Granularity::Weekly.label(date(2023, 3, 6)),
            "Week of 2023-03-06"
        );
    }

    #[test]
    fn test_series_lookup() {
        let series = SalesSeries {
            granularity: Granularity::Daily,
            buckets: vec![
                Bucket { date: date(2023, 1, 1), value: 10.0 },
                Bucket { date: date(2023, 1, 3), value: 5.0 },
            ],
        };
        assert_eq!(series.get(date(2023, 1, 3)), Some(5.0));
        assert_eq!(series.get(date(2023, 1, 2)), None);
        assert_eq!(series.total(), 15.0);
    }

    #[test]
    fn test_breakdown_other_accessors() {
        let breakdown = CategoryBreakdown {
            measure: Measure::Revenue,
            entries: vec![
                CategoryShare { label: "X".to_string(), value: 100.0 },
                CategoryShare { label: OTHER_LABEL.to_string(), value: 10.0 },
            ],
            collapsed: 2,
        };
        assert_eq!(breakdown.ranked().len(), 1);
        assert_eq!(breakdown.other().map(|o| o.value), Some(10.0));
        assert_eq!(breakdown.total(), 110.0);
    }

    #[test]
    fn test_real_other_category_is_not_collapsed() {
        let breakdown = CategoryBreakdown {
            measure: Measure::Quantity,
            entries: vec![
                CategoryShare { label: "X".to_string(), value: 100.0 },
                CategoryShare { label: OTHER_LABEL.to_string(), value: 5.0 },
            ],
            collapsed: 0,
        };
        assert!(breakdown.other().is_none());
        assert_eq!(breakdown.ranked().len(), 2);
    }
}
