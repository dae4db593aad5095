//! In-memory cursor, the trivially replayable source.

use crate::config::ValueType;
use crate::error::{Result, RowcastError};

use super::{cell_is_missing, RowCursor};

/// Cursor over rows held in memory.
///
/// Used by tests and doc examples, and as the adapter for callers that
/// already materialized their rows. Missing cells are explicit (`None`);
/// string cells equal to a missing token also count as missing, matching
/// the file adapters.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    resource: String,
    names: Option<Vec<String>>,
    rows: Vec<Vec<Option<String>>>,
    native: Vec<ValueType>,
    width: usize,
    row: Option<usize>,
    closed: bool,
}

impl MemoryCursor {
    /// Cursor over explicit cells.
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            resource: "memory".to_string(),
            names: None,
            rows,
            native: Vec::new(),
            width,
            row: None,
            closed: false,
        }
    }

    /// Cursor over plain string rows; missing tokens become missing cells.
    pub fn from_strings(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|s| Some((*s).to_string())).collect())
                .collect(),
        )
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.width = self.width.max(names.len());
        self.names = Some(names);
        self
    }

    /// Declare native source types, emulating a strongly-typed source.
    pub fn with_native_types(mut self, native: Vec<ValueType>) -> Self {
        self.native = native;
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    fn current(&self) -> Option<&Vec<Option<String>>> {
        self.row.and_then(|r| self.rows.get(r))
    }
}

impl RowCursor for MemoryCursor {
    fn has_next(&mut self) -> bool {
        !self.closed && self.row.map_or(0, |r| r + 1) < self.rows.len()
    }

    fn advance(&mut self) -> Result<()> {
        let next = self.row.map_or(0, |r| r + 1);
        if self.closed || next >= self.rows.len() {
            return Err(RowcastError::Exhausted(self.resource.clone()));
        }
        self.row = Some(next);
        Ok(())
    }

    fn row_index(&self) -> Option<usize> {
        self.row
    }

    fn column_count(&self) -> usize {
        self.width
    }

    fn column_names(&self) -> Option<Vec<String>> {
        self.names.clone()
    }

    fn is_missing(&self, column: usize) -> bool {
        cell_is_missing(self.get_string(column))
    }

    fn get_string(&self, column: usize) -> Option<&str> {
        self.current()
            .and_then(|row| row.get(column))
            .and_then(|cell| cell.as_deref())
    }

    fn native_value_type(&self, column: usize) -> ValueType {
        self.native.get(column).copied().unwrap_or(ValueType::Text)
    }

    fn reset(&mut self) -> Result<()> {
        if self.closed {
            return Err(RowcastError::EmptyData(format!(
                "cursor for '{}' is closed",
                self.resource
            )));
        }
        self.row = None;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn resource_name(&self) -> String {
        self.resource.clone()
    }
}
