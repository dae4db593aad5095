//! Translation configuration: how raw columns become typed attributes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cursor::RowCursor;
use crate::error::{Result, RowcastError};
use crate::parse::CellParser;

use super::column::{ColumnMetaData, ValueType};

/// Semantic meaning of a non-data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnnotationKind {
    /// The row's cells name the target attributes.
    Name,
    /// The row's cells set the given per-attribute metadata key.
    Role(String),
}

/// Full configuration for one ingestion request.
///
/// Created once per request, mutated only by the type guesser (filling in
/// `Unknown` types) and explicit overrides, then treated as frozen while a
/// translation pass runs. Exclusive ownership during a pass is enforced by
/// the borrow checker: guessing takes `&mut`, translation takes `&`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Per-column settings, indexed by raw column position. Grows as wider
    /// rows are observed, never shrinks.
    columns: Vec<ColumnMetaData>,
    /// Row index to annotation meaning, in row order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<usize, AnnotationKind>,
    /// Explicit chrono date pattern; `None` enables built-in shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Locale tag carried for front-ends; parsing itself is locale-free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Time-zone tag carried for front-ends; temporal cells encode naive UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Whether the source's first row supplies attribute names.
    #[serde(default)]
    pub first_row_as_names: bool,
    /// Downgrade cell conversion failures to missing values.
    #[serde(default)]
    pub fault_tolerant: bool,
}

impl TranslationConfig {
    /// Configuration over an explicit column list (the reconfigure path:
    /// persisted user settings win, the cursor only sizes the arena).
    pub fn new(columns: Vec<ColumnMetaData>) -> Self {
        Self {
            columns,
            annotations: BTreeMap::new(),
            date_format: None,
            locale: None,
            timezone: None,
            first_row_as_names: false,
            fault_tolerant: false,
        }
    }

    /// Bootstrap purely from a cursor: every column selected, names copied
    /// from the source or synthesized, types taken from the source's native
    /// typing where it has any.
    pub fn bootstrap(cursor: &dyn RowCursor) -> Self {
        let names = cursor.column_names();
        let columns = (0..cursor.column_count())
            .map(|i| {
                let col = match names.as_ref().and_then(|n| n.get(i)) {
                    Some(name) if !name.trim().is_empty() => ColumnMetaData::named(i, name.trim()),
                    _ => ColumnMetaData::new(i),
                };
                // Weakly-typed sources report Text for everything; leave those
                // Unknown so the guesser runs.
                match cursor.native_value_type(i) {
                    ValueType::Text => col,
                    native => col.with_type(native),
                }
            })
            .collect();
        let mut config = Self::new(columns);
        config.first_row_as_names = names.is_some();
        config
    }

    pub fn columns(&self) -> &[ColumnMetaData] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnMetaData> {
        self.columns.get(index)
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut ColumnMetaData> {
        self.columns.get_mut(index)
    }

    /// Declared column count.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Selected columns in raw-position order.
    pub fn selected_columns(&self) -> impl Iterator<Item = &ColumnMetaData> {
        self.columns.iter().filter(|c| c.selected)
    }

    /// Widen the column arena to at least `width`, filling new slots with
    /// selected, untyped defaults.
    pub fn ensure_width(&mut self, width: usize) {
        while self.columns.len() < width {
            self.columns.push(ColumnMetaData::new(self.columns.len()));
        }
    }

    /// Mark a row as an annotation row.
    pub fn set_annotation(&mut self, row: usize, kind: AnnotationKind) {
        self.annotations.insert(row, kind);
    }

    pub fn annotation(&self, row: usize) -> Option<&AnnotationKind> {
        self.annotations.get(&row)
    }

    pub fn is_annotation_row(&self, row: usize) -> bool {
        self.annotations.contains_key(&row)
    }

    pub fn annotation_rows(&self) -> impl Iterator<Item = (usize, &AnnotationKind)> {
        self.annotations.iter().map(|(row, kind)| (*row, kind))
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the given row supplies attribute names rather than data.
    ///
    /// Sources that consume their own header (the cursor reports names)
    /// never reach this path; for all others, `first_row_as_names` makes
    /// row 0 a name row.
    pub fn first_row_supplies_names(&self, row: usize, source_has_names: bool) -> bool {
        self.first_row_as_names && !source_has_names && row == 0
    }

    /// Number of data rows among `total_rows` source rows: annotation rows
    /// are not data.
    pub fn data_row_count(&self, total_rows: usize) -> usize {
        let annotations = self.annotations.keys().filter(|&&r| r < total_rows).count();
        total_rows - annotations
    }

    /// Cell parser honoring the configured date pattern.
    pub fn parser(&self) -> CellParser {
        match &self.date_format {
            Some(fmt) => CellParser::with_format(fmt),
            None => CellParser::new(),
        }
    }

    /// Validate the configuration before any row is read.
    ///
    /// Rejects two sources of attribute names (first-row names together with
    /// a `Name` annotation row) and duplicate special roles.
    pub fn validate(&self) -> Result<()> {
        if self.first_row_as_names
            && self.annotations.values().any(|k| *k == AnnotationKind::Name)
        {
            return Err(RowcastError::Config(
                "first row as names conflicts with a name annotation row; \
                 exactly one source of names may be active"
                    .to_string(),
            ));
        }

        let mut seen_roles: Vec<&str> = Vec::new();
        for col in self.selected_columns() {
            if let Some(role) = col.role.as_deref() {
                if seen_roles.contains(&role) {
                    return Err(RowcastError::Config(format!(
                        "role '{role}' is assigned to more than one column"
                    )));
                }
                seen_roles.push(role);
            }
        }
        Ok(())
    }

    /// Serialize to the persisted-configuration artifact.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild from the persisted-configuration artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Persist to a side file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| RowcastError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load from a side file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| RowcastError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }
}
