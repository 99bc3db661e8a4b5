//! Presentation boundary.
//!
//! `dashboard` assembles the panels for one set of user selections;
//! `generator` renders them as Markdown or JSON.

pub mod dashboard;
pub mod generator;

pub use dashboard::{build_dashboard, CategoryPanel, CategorySlice, Dashboard, SalesPanel};
pub use generator::{
    generate_json_report, generate_markdown_report, write_report, Report, ReportMetadata,
};
