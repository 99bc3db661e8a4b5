//! Sales aggregation over time.
//!
//! Turns the transactions of one store location into a sparse,
//! date-ordered series of summed sales per day or per week.

use crate::errors::QueryError;
use crate::models::{Bucket, Granularity, SalesSeries};
use crate::store::Transactions;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Sum sales per bucket for one location within an inclusive date range.
///
/// An inverted range (`start_date > end_date`) selects nothing and yields an
/// empty series. An unknown location is rejected.
pub fn aggregate(
    transactions: &Transactions,
    location: &str,
    granularity: Granularity,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<SalesSeries, QueryError> {
    if !transactions.has_location(location) {
        return Err(QueryError::InvalidParameter(format!(
            "unknown store location '{}'",
            location
        )));
    }

    let mut grouped: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for t in transactions.records().iter().filter(|t| {
        t.store_location() == location
            && (start_date..=end_date).contains(&t.transaction_date())
    }) {
        *grouped
            .entry(granularity.bucket_start(t.transaction_date()))
            .or_default() += t.transaction_total();
    }

    debug!(
        "Aggregated {} {} buckets for {} ({} to {})",
        grouped.len(),
        granularity,
        location,
        start_date,
        end_date
    );

    Ok(SalesSeries {
        granularity,
        buckets: grouped
            .into_iter()
            .map(|(date, value)| Bucket { date, value })
            .collect(),
    })
}
