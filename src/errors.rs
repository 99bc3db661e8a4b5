//! Error types for the dashboard core.
//!
//! `LoadError` is fatal: a dataset that fails to load must stop the process
//! before any dashboard is served. `QueryError` is recoverable and is turned
//! into a placeholder panel by the presentation layer.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the transaction dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dataset file could not be opened or read.
    #[error("failed to read dataset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV structure itself is broken (bad quoting, ragged rows, ...).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A data row holds a value that cannot be normalized.
    #[error("invalid row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },

    /// The dataset has a header but no transactions.
    #[error("dataset contains no transactions")]
    Empty,
}

/// Failure of a single dashboard query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A caller-supplied filter parameter violates a precondition.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Not enough distinct points to fit a trend.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LoadError::MissingColumn("unit_price");
        assert_eq!(err.to_string(), "missing required column 'unit_price'");

        let err = LoadError::InvalidRow {
            line: 7,
            reason: "negative unit_price".to_string(),
        };
        assert_eq!(err.to_string(), "invalid row at line 7: negative unit_price");

        let err = QueryError::InvalidParameter("top_n must be at least 1".to_string());
        assert!(err.to_string().starts_with("invalid parameter"));
    }
}
