//! The uniform row-cursor abstraction over physical sources.

mod csv;
mod memory;

use std::num::ParseFloatError;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ValueType;
use crate::error::Result;
use crate::parse;

pub use csv::{CsvCursor, CsvOptions};
pub use memory::MemoryCursor;

/// A resettable, forward-only cursor over the rows of one physical source.
///
/// One implementation exists per source format. `advance()` and `reset()`
/// may perform blocking I/O. After `reset()` the cursor must replay exactly
/// the row sequence it yielded the first time, by reopening the file or
/// re-running the query.
///
/// A row that cannot be split into cells at all is skipped, counted in
/// [`skipped_rows`](RowCursor::skipped_rows), and never aborts the scan.
pub trait RowCursor {
    /// Whether a further row is available.
    fn has_next(&mut self) -> bool;

    /// Move to the next row. Fails when no row remains.
    fn advance(&mut self) -> Result<()>;

    /// Index of the current row within this pass; `None` before the first
    /// `advance()` and after `reset()`.
    fn row_index(&self) -> Option<usize>;

    /// Number of columns seen so far. May grow as wider rows are observed,
    /// never shrinks.
    fn column_count(&self) -> usize;

    /// Column names, when the source knows them.
    fn column_names(&self) -> Option<Vec<String>>;

    /// Whether the addressed cell of the current row carries no value.
    fn is_missing(&self, column: usize) -> bool;

    /// Raw text of the addressed cell, `None` when absent.
    fn get_string(&self, column: usize) -> Option<&str>;

    /// Native numeric read. Sources without native numerics parse the
    /// string form.
    fn get_number(&self, column: usize) -> Option<std::result::Result<f64, ParseFloatError>> {
        self.get_string(column).map(|s| s.trim().parse::<f64>())
    }

    /// Native date read. Sources without a native date representation
    /// return `None`; the translator then parses the string form under the
    /// configured pattern.
    fn get_date(&self, _column: usize) -> Option<NaiveDateTime> {
        None
    }

    /// The source's own typing for a column. Weakly-typed sources report
    /// [`ValueType::Text`] universally, forcing all typing to be inferred.
    fn native_value_type(&self, _column: usize) -> ValueType {
        ValueType::Text
    }

    /// Rewind to before the first row, replaying the identical sequence.
    fn reset(&mut self) -> Result<()>;

    /// Release file handles / connections. Must be invoked on every exit
    /// path; adapters back this up in `Drop`.
    fn close(&mut self) -> Result<()>;

    /// Human-readable source name for error messages.
    fn resource_name(&self) -> String;

    /// Structurally malformed rows skipped during the current pass.
    fn skipped_rows(&self) -> usize {
        0
    }
}

/// Metadata about a file-backed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, ...).
    pub format: String,
    /// When the source was opened.
    pub opened_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub(crate) fn new(path: PathBuf, hash: String, size_bytes: u64, format: String) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            opened_at: Utc::now(),
        }
    }
}

/// Shared missing-cell test for weakly-typed adapters.
pub(crate) fn cell_is_missing(cell: Option<&str>) -> bool {
    match cell {
        None => true,
        Some(text) => parse::is_missing_token(text),
    }
}
