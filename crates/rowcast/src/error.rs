//! Error types for the rowcast library.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// What went wrong when converting a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The cell was expected to hold a whole number.
    UnparseableInteger,
    /// The cell was expected to hold a real number.
    UnparseableReal,
    /// The cell did not match the configured date pattern.
    UnparseableDate,
    /// A binominal column encountered a third distinct value.
    MoreThanTwoValues,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::UnparseableInteger => "unparseable integer",
            ErrorCode::UnparseableReal => "unparseable real",
            ErrorCode::UnparseableDate => "unparseable date",
            ErrorCode::MoreThanTwoValues => "more than two values",
        };
        f.write_str(s)
    }
}

/// A cell-level conversion failure, addressable by row and column.
///
/// Produced by cursors and the translator; in fault-tolerant mode these
/// are collected as warnings, in strict mode the first one aborts the
/// whole translation.
#[derive(Debug, Error, Serialize)]
#[error("{code} at row {row}, column {column}: '{value}'")]
pub struct CellError {
    /// Zero-based row index within the pass.
    pub row: usize,
    /// Zero-based raw column index.
    pub column: usize,
    pub code: ErrorCode,
    /// The original cell text.
    pub value: String,
    /// Underlying parser error, when one exists.
    #[source]
    #[serde(skip)]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CellError {
    pub fn new(row: usize, column: usize, code: ErrorCode, value: impl Into<String>) -> Self {
        Self {
            row,
            column,
            code,
            value: value.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Main error type for rowcast operations.
#[derive(Debug, Error)]
pub enum RowcastError {
    /// Error reading or accessing a source.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cell failed to convert under strict translation.
    #[error(transparent)]
    Cell(#[from] CellError),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `advance()` was called with no remaining row.
    #[error("cursor for '{0}' is exhausted")]
    Exhausted(String),

    /// Empty source or no data to work with.
    #[error("empty data: {0}")]
    EmptyData(String),

    /// Invalid translation configuration, detected before any row is read.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rowcast operations.
pub type Result<T> = std::result::Result<T, RowcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_error_display_carries_address() {
        let err = CellError::new(4, 2, ErrorCode::UnparseableReal, "abc");
        let msg = err.to_string();
        assert!(msg.contains("row 4"));
        assert!(msg.contains("column 2"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_cell_error_keeps_cause() {
        let cause = "x1".parse::<f64>().unwrap_err();
        let err = CellError::new(0, 0, ErrorCode::UnparseableReal, "x1").with_source(cause);
        assert!(std::error::Error::source(&err).is_some());
    }
}
