//! Top-N category ranking.
//!
//! Ranks product categories over the whole dataset and collapses
//! everything outside the top N into a single "Other" entry.

use crate::errors::QueryError;
use crate::models::{CategoryBreakdown, CategoryShare, Measure, OTHER_LABEL};
use crate::store::Transactions;
use std::collections::HashMap;
use tracing::debug;

/// Rank categories by `measure`, keeping the `top_n` largest.
///
/// Location and date filters never apply here. Ties are broken by category
/// name ascending. "Other" is appended (always last) only when some
/// categories were left out, and holds the sum of the measure over them.
pub fn rank_categories(
    transactions: &Transactions,
    top_n: usize,
    measure: Measure,
) -> Result<CategoryBreakdown, QueryError> {
    if top_n == 0 {
        return Err(QueryError::InvalidParameter(
            "top_n must be at least 1".to_string(),
        ));
    }

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for t in transactions.records() {
        *totals.entry(t.product_category()).or_default() += measure.of(t);
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let category_count = ranked.len();
    let rest = ranked.split_off(top_n.min(category_count));

    let mut entries: Vec<CategoryShare> = ranked
        .into_iter()
        .map(|(label, value)| CategoryShare {
            label: label.to_string(),
            value,
        })
        .collect();

    if top_n < category_count {
        entries.push(CategoryShare {
            label: OTHER_LABEL.to_string(),
            value: rest.iter().map(|(_, v)| v).sum(),
        });
    }

    debug!(
        "Ranked {} categories by {} (top {}, {} collapsed)",
        category_count,
        measure,
        top_n,
        rest.len()
    );

    Ok(CategoryBreakdown {
        measure,
        entries,
        collapsed: rest.len(),
    })
}
