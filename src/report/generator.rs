//! Markdown and JSON report generation.
//!
//! This module renders a computed [`Dashboard`] into a shareable report.

use super::dashboard::{CategoryPanel, Dashboard, SalesPanel};
use crate::store::Transactions;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Metadata about the dataset and the run that produced the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the dataset was loaded from.
    pub dataset: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of transactions in the dataset.
    pub transactions: usize,
    /// Known store locations.
    pub locations: Vec<String>,
    /// Number of distinct product categories.
    pub categories: usize,
    /// Earliest transaction date.
    pub first_date: NaiveDate,
    /// Latest transaction date.
    pub last_date: NaiveDate,
}

impl ReportMetadata {
    /// Describe a loaded dataset.
    pub fn describe(dataset: impl Into<String>, transactions: &Transactions) -> Self {
        let (first_date, last_date) = transactions.date_bounds();
        Self {
            dataset: dataset.into(),
            generated_at: Utc::now(),
            transactions: transactions.len(),
            locations: transactions.locations().into_iter().collect(),
            categories: transactions.category_count(),
            first_date,
            last_date,
        }
    }
}

/// The complete dashboard report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Coffee Shop Sales Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents());
    output.push_str(&generate_sales_section(&report.dashboard.sales));

    output.push_str("## Item Analysis\n\n");
    output.push_str(&generate_category_section(&report.dashboard.by_quantity));
    output.push_str(&generate_category_section(&report.dashboard.by_revenue));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Transactions:** {}\n", metadata.transactions));
    section.push_str(&format!(
        "- **Locations:** {}\n",
        metadata.locations.join(", ")
    ));
    section.push_str(&format!("- **Categories:** {}\n", metadata.categories));
    section.push_str(&format!(
        "- **Date Range:** {} to {}\n",
        metadata.first_date, metadata.last_date
    ));
    section.push('\n');

    section
}

fn generate_table_of_contents() -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Store Analysis](#store-analysis)\n");
    toc.push_str("- [Item Analysis](#item-analysis)\n");
    toc.push('\n');

    toc
}

fn push_notices(section: &mut String, notices: &[String]) {
    for notice in notices {
        section.push_str(&format!("> ⚠️ {}\n", notice));
    }
    if !notices.is_empty() {
        section.push('\n');
    }
}

/// Generate the store analysis section with the sales table.
fn generate_sales_section(panel: &SalesPanel) -> String {
    let mut section = String::new();

    section.push_str("## Store Analysis\n\n");
    section.push_str(&format!("### {}\n\n", panel.title));
    section.push_str(&format!(
        "*Location: {} | {} to {} | Buckets: {}*\n\n",
        escape_cell(&panel.location),
        panel.start_date,
        panel.end_date,
        panel.series.len()
    ));

    push_notices(&mut section, &panel.notices);

    if panel.series.is_empty() {
        return section;
    }

    let granularity = panel.series.granularity;
    match &panel.trend {
        Some(trend) => {
            section.push_str("| Date | Sales | Trend |\n");
            section.push_str("|:---|---:|---:|\n");
            for (bucket, fitted) in panel.series.buckets.iter().zip(trend) {
                section.push_str(&format!(
                    "| {} | {:.2} | {:.2} |\n",
                    granularity.label(bucket.date),
                    bucket.value,
                    fitted.value
                ));
            }
        }
        None => {
            section.push_str("| Date | Sales |\n");
            section.push_str("|:---|---:|\n");
            for bucket in &panel.series.buckets {
                section.push_str(&format!(
                    "| {} | {:.2} |\n",
                    granularity.label(bucket.date),
                    bucket.value
                ));
            }
        }
    }
    section.push_str(&format!("| **Total** | **{:.2}** |", panel.series.total()));
    if panel.trend.is_some() {
        section.push_str(" |");
    }
    section.push_str("\n\n");

    section
}

/// Generate one category breakdown table.
fn generate_category_section(panel: &CategoryPanel) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", panel.title));
    push_notices(&mut section, &panel.notices);

    if panel.slices.is_empty() {
        return section;
    }

    section.push_str(&format!("| Category | {} | Share |\n", panel.measure));
    section.push_str("|:---|---:|---:|\n");
    for slice in &panel.slices {
        let label = match slice.collapsed {
            0 => escape_cell(&slice.label),
            n => format!("{} ({} more)", escape_cell(&slice.label), n),
        };
        section.push_str(&format!(
            "| {} | {:.2} | {:.1}% |\n",
            label, slice.value, slice.share
        ));
    }
    section.push('\n');

    section
}

/// Escape a value for use inside a Markdown table cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

fn generate_footer() -> String {
    "---\n\n*Report generated by coffee-dash*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
