//! Dashboard assembly.
//!
//! Runs every query needed for one refresh of the dashboard and turns
//! recoverable query errors into empty panels with a user-visible notice.

use crate::analysis::{aggregate, fit_trend, rank_categories};
use crate::errors::QueryError;
use crate::models::{
    Bucket, CategoryBreakdown, CategoryShare, FilterSpec, Granularity, Measure, SalesSeries,
};
use crate::store::Transactions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Time-series panel for the selected store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPanel {
    pub title: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub series: SalesSeries,
    /// Fitted trend, aligned with `series`, when requested and available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Vec<Bucket>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notices: Vec<String>,
}

/// One slice of a category pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub label: String,
    pub value: f64,
    /// Percentage of the panel total.
    pub share: f64,
    /// Categories folded into this slice; non-zero only for the synthetic
    /// "Other" slice.
    #[serde(skip_serializing_if = "is_zero", default)]
    pub collapsed: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Category breakdown panel for one measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPanel {
    pub title: String,
    pub measure: Measure,
    pub slices: Vec<CategorySlice>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notices: Vec<String>,
}

/// Everything rendered for one set of user selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub filter: FilterSpec,
    pub show_trend: bool,
    pub sales: SalesPanel,
    pub by_quantity: CategoryPanel,
    pub by_revenue: CategoryPanel,
}

/// Build all dashboard panels for `filter`.
///
/// Never fails: invalid parameters and unfittable trends are reported as
/// notices on the affected panel.
pub fn build_dashboard(
    transactions: &Transactions,
    filter: &FilterSpec,
    show_trend: bool,
) -> Dashboard {
    Dashboard {
        filter: filter.clone(),
        show_trend,
        sales: build_sales_panel(transactions, filter, show_trend),
        by_quantity: build_category_panel(transactions, filter.top_n, Measure::Quantity),
        by_revenue: build_category_panel(transactions, filter.top_n, Measure::Revenue),
    }
}

fn sales_title(granularity: Granularity) -> String {
    format!("{} Sales", granularity)
}

fn build_sales_panel(
    transactions: &Transactions,
    filter: &FilterSpec,
    show_trend: bool,
) -> SalesPanel {
    let mut notices = Vec::new();

    if filter.start_date > filter.end_date {
        notices.push("Start date is after end date; no sales selected.".to_string());
    }

    let series = match aggregate(
        transactions,
        &filter.location,
        filter.granularity,
        filter.start_date,
        filter.end_date,
    ) {
        Ok(series) => series,
        Err(e) => {
            warn!("Sales query failed: {}", e);
            notices.push(notice_for(&e));
            SalesSeries {
                granularity: filter.granularity,
                buckets: Vec::new(),
            }
        }
    };

    if series.is_empty() && notices.is_empty() {
        notices.push("No transactions match the selected filters.".to_string());
    }

    let trend = if show_trend && !series.is_empty() {
        match fit_trend(&series) {
            Ok(trend) => Some(trend),
            Err(e) => {
                warn!("Trend overlay suppressed: {}", e);
                notices.push(format!("Trend hidden: {}", notice_for(&e)));
                None
            }
        }
    } else {
        None
    };

    SalesPanel {
        title: sales_title(filter.granularity),
        location: filter.location.clone(),
        start_date: filter.start_date,
        end_date: filter.end_date,
        series,
        trend,
        notices,
    }
}

fn build_category_panel(
    transactions: &Transactions,
    top_n: usize,
    measure: Measure,
) -> CategoryPanel {
    let title = format!("Top {} Categories by {}", top_n, measure);

    match rank_categories(transactions, top_n, measure) {
        Ok(breakdown) => CategoryPanel {
            title,
            measure,
            slices: slices(&breakdown),
            notices: Vec::new(),
        },
        Err(e) => {
            warn!("Category query failed: {}", e);
            CategoryPanel {
                title,
                measure,
                slices: Vec::new(),
                notices: vec![notice_for(&e)],
            }
        }
    }
}

fn slices(breakdown: &CategoryBreakdown) -> Vec<CategorySlice> {
    let total = breakdown.total();
    let slice = |e: &CategoryShare, collapsed: usize| CategorySlice {
        label: e.label.clone(),
        value: e.value,
        share: if total > 0.0 { e.value / total * 100.0 } else { 0.0 },
        collapsed,
    };

    let mut slices: Vec<CategorySlice> = breakdown.ranked().iter().map(|e| slice(e, 0)).collect();
    if let Some(other) = breakdown.other() {
        slices.push(slice(other, breakdown.collapsed));
    }
    slices
}

fn notice_for(error: &QueryError) -> String {
    match error {
        QueryError::InvalidParameter(msg) => format!("Invalid selection: {}.", msg),
        QueryError::InsufficientData(msg) => format!("Not enough data ({}).", msg),
    }
}
