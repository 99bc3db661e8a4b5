//! Coffee shop sales analytics.
//!
//! Loads point-of-sale transactions once, then answers dashboard queries:
//! a per-location sales series (daily or weekly), top-N category
//! breakdowns by quantity and revenue, and a cubic trend overlay.
//!
//! The loaded [`store::Transactions`] value is immutable and is passed
//! explicitly into every query.

pub mod analysis;
pub mod errors;
pub mod models;
pub mod report;
pub mod store;

pub use analysis::{aggregate, fit_trend, rank_categories};
pub use errors::{LoadError, QueryError};
pub use models::{
    Bucket, CategoryBreakdown, CategoryShare, FilterSpec, Granularity, Measure, SalesSeries,
    Transaction, OTHER_LABEL,
};
pub use store::Transactions;
