//! The produced column-oriented table.

use indexmap::{IndexMap, IndexSet};

use crate::config::ValueType;

/// One typed column of the produced table.
///
/// Nominal attributes carry a string dictionary; cell values are the
/// dictionary index encoded as `f64`, with first-seen order defining index
/// assignment. Numeric and temporal attributes store the value itself
/// (temporal as epoch milliseconds). `NaN` encodes a missing value
/// everywhere.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value_type: ValueType,
    /// Special role; `None` means regular.
    pub role: Option<String>,
    /// Metadata collected from annotation rows, keyed by annotation name.
    pub annotations: IndexMap<String, String>,
    /// Raw source column this attribute was translated from.
    pub source_column: usize,
    dictionary: Option<IndexSet<String>>,
}

impl Attribute {
    pub fn new(
        name: impl Into<String>,
        value_type: ValueType,
        role: Option<String>,
        source_column: usize,
    ) -> Self {
        let dictionary = value_type.is_nominal().then(IndexSet::new);
        Self {
            name: name.into(),
            value_type,
            role,
            annotations: IndexMap::new(),
            source_column,
            dictionary,
        }
    }

    /// The nominal dictionary, when this attribute has one.
    pub fn dictionary(&self) -> Option<&IndexSet<String>> {
        self.dictionary.as_ref()
    }

    /// Map a nominal string to its index, assigning the next index on first
    /// sight. Deterministic and order-stable across identical inputs.
    pub(crate) fn map_value(&mut self, value: &str) -> usize {
        let dict = self
            .dictionary
            .get_or_insert_with(IndexSet::new);
        match dict.get_index_of(value) {
            Some(index) => index,
            None => dict.insert_full(value.to_string()).0,
        }
    }

    /// Index of an already-mapped nominal value.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.dictionary.as_ref()?.get_index_of(value)
    }

    /// String form of a nominal index.
    pub fn value_of(&self, index: usize) -> Option<&str> {
        self.dictionary.as_ref()?.get_index(index).map(String::as_str)
    }

    pub fn is_regular(&self) -> bool {
        self.role.is_none()
    }
}

/// Strongly-typed, column-oriented in-memory table.
///
/// Built once by the translator, then read-only. `complete` is false when
/// a cooperative stop cut the pass short; the rows present are whole rows.
#[derive(Debug, Clone)]
pub struct Table {
    attributes: Vec<Attribute>,
    columns: Vec<Vec<f64>>,
    complete: bool,
}

impl Table {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        let columns = attributes.iter().map(|_| Vec::new()).collect();
        Self {
            attributes,
            columns,
            complete: true,
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub(crate) fn attribute_mut(&mut self, index: usize) -> Option<&mut Attribute> {
        self.attributes.get_mut(index)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<(usize, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .find(|(_, a)| a.name == name)
    }

    /// The attribute holding the given special role, if any.
    pub fn special(&self, role: &str) -> Option<(usize, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .find(|(_, a)| a.role.as_deref() == Some(role))
    }

    /// Attributes without a special role, in column order.
    pub fn regular_attributes(&self) -> impl Iterator<Item = (usize, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_regular())
    }

    /// Raw cell value; `NaN` means missing.
    pub fn value(&self, row: usize, attribute: usize) -> f64 {
        self.columns[attribute][row]
    }

    pub fn is_missing(&self, row: usize, attribute: usize) -> bool {
        self.value(row, attribute).is_nan()
    }

    /// Resolve a nominal cell back to its string form.
    pub fn nominal_value(&self, row: usize, attribute: usize) -> Option<&str> {
        let value = self.value(row, attribute);
        if value.is_nan() {
            return None;
        }
        self.attributes[attribute].value_of(value as usize)
    }

    /// One full column of values, parallel to row order.
    pub fn column(&self, attribute: usize) -> &[f64] {
        &self.columns[attribute]
    }

    /// Append one whole row; the row length must match the attribute count.
    pub(crate) fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.columns.len());
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(*value);
        }
    }

    /// Whether the pass that built this table ran to its end.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn mark_incomplete(&mut self) {
        self.complete = false;
    }
}
