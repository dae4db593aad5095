//! Per-column configuration: value type tags and column metadata.

use serde::{Deserialize, Serialize};

/// Declared or inferred value type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Not yet determined; the type guesser fills these in.
    Unknown,
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Real,
    /// Date and time combined.
    DateTime,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Categorical with at most two distinct values.
    Binominal,
    /// Categorical with more than two distinct values.
    Polynominal,
    /// Categorical with no further evidence about cardinality.
    Nominal,
    /// Free text; no typing at all.
    Text,
}

impl ValueType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Real)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ValueType::DateTime | ValueType::Date | ValueType::Time)
    }

    /// Returns true if values of this type map through a string dictionary.
    pub fn is_nominal(&self) -> bool {
        matches!(
            self,
            ValueType::Binominal | ValueType::Polynominal | ValueType::Nominal | ValueType::Text
        )
    }
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::Unknown
    }
}

/// Configuration for one raw source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetaData {
    /// Raw column position in the source.
    pub index: usize,
    /// Name as reported by the source (or synthesized).
    pub original_name: String,
    /// User override for the attribute name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_name: Option<String>,
    /// Whether the column participates in translation.
    pub selected: bool,
    /// Declared or inferred value type.
    #[serde(default)]
    pub value_type: ValueType,
    /// Special role; `None` means a regular attribute. Roles other than
    /// regular still follow the ordinary type-inference rules.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
}

impl ColumnMetaData {
    /// Create a selected, untyped column with a synthesized name.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            original_name: format!("col_{}", index + 1),
            user_name: None,
            selected: true,
            value_type: ValueType::Unknown,
            role: None,
        }
    }

    /// Create a column named by the source.
    pub fn named(index: usize, name: impl Into<String>) -> Self {
        Self {
            original_name: name.into(),
            ..Self::new(index)
        }
    }

    /// Effective attribute name: user override wins over the source name.
    pub fn name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.original_name)
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}
