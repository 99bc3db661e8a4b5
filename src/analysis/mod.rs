//! Analysis pipeline.
//!
//! Each stage is a pure function of the loaded dataset and the caller's
//! parameters; nothing is cached between calls.

pub mod aggregator;
pub mod ranker;
pub mod trend;

pub use aggregator::aggregate;
pub use ranker::rank_categories;
pub use trend::fit_trend;
