//! Synthesized schema metadata with explicit completeness information.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::config::ValueType;

/// How a synthesized value set or range relates to the true one.
///
/// `Equal` is only claimed after the entire source was scanned; any capped
/// or partial scan bounds the truth from one side instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetRelation {
    /// The synthesized set is exactly the true set.
    Equal,
    /// The true set is contained in the synthesized one.
    Subset,
    /// The true set contains the synthesized one; more values may exist.
    Superset,
    /// Nothing is known about the relation.
    Unknown,
}

impl SetRelation {
    /// Combine the relations of two partial views of the same attribute.
    pub fn merge(self, other: SetRelation) -> SetRelation {
        use SetRelation::*;
        match (self, other) {
            (Unknown, _) | (_, Unknown) => Unknown,
            (Equal, r) | (r, Equal) => r,
            (Subset, Subset) => Subset,
            (Superset, Superset) => Superset,
            (Subset, Superset) | (Superset, Subset) => Unknown,
        }
    }
}

/// A count that may be a lower bound rather than exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproxCount {
    pub count: usize,
    /// False when the scan was capped: the true count may be larger by an
    /// unknown amount.
    pub exact: bool,
}

impl ApproxCount {
    pub fn exact(count: usize) -> Self {
        Self { count, exact: true }
    }

    pub fn at_least(count: usize) -> Self {
        Self {
            count,
            exact: false,
        }
    }

    /// Combine counts from two disjoint portions of the same source.
    pub fn merge(self, other: ApproxCount) -> ApproxCount {
        ApproxCount {
            count: self.count + other.count,
            exact: self.exact && other.exact,
        }
    }
}

impl fmt::Display for ApproxCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact {
            write!(f, "{}", self.count)
        } else {
            write!(f, ">= {}", self.count)
        }
    }
}

/// Observed value domain of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueDomain {
    /// Distinct nominal values in first-seen order.
    Values { values: IndexSet<String> },
    /// Numeric or temporal range (temporal as epoch milliseconds).
    Range { min: f64, max: f64 },
    /// No non-missing cell was observed.
    Empty,
}

impl ValueDomain {
    /// Union of two observed domains. Mixed shapes have no meaningful
    /// union and collapse to `Empty`; the caller downgrades the relation.
    fn merge(&self, other: &ValueDomain) -> ValueDomain {
        match (self, other) {
            (ValueDomain::Empty, d) | (d, ValueDomain::Empty) => d.clone(),
            (ValueDomain::Values { values: a }, ValueDomain::Values { values: b }) => {
                let mut union = a.clone();
                for v in b {
                    union.insert(v.clone());
                }
                ValueDomain::Values { values: union }
            }
            (
                ValueDomain::Range { min: a_min, max: a_max },
                ValueDomain::Range { min: b_min, max: b_max },
            ) => ValueDomain::Range {
                min: a_min.min(*b_min),
                max: a_max.max(*b_max),
            },
            _ => ValueDomain::Empty,
        }
    }

    fn compatible(&self, other: &ValueDomain) -> bool {
        matches!(
            (self, other),
            (ValueDomain::Empty, _)
                | (_, ValueDomain::Empty)
                | (ValueDomain::Values { .. }, ValueDomain::Values { .. })
                | (ValueDomain::Range { .. }, ValueDomain::Range { .. })
        )
    }
}

/// Synthesized metadata for one attribute. Produced fresh per request,
/// never mutated concurrently with a translation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSummary {
    pub name: String,
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    pub missing: ApproxCount,
    pub domain: ValueDomain,
    pub relation: SetRelation,
}

impl AttributeSummary {
    /// Merge with a summary of another portion of the same attribute.
    pub fn merge(&self, other: &AttributeSummary) -> AttributeSummary {
        let relation = if self.domain.compatible(&other.domain) {
            self.relation.merge(other.relation)
        } else {
            SetRelation::Unknown
        };
        AttributeSummary {
            name: self.name.clone(),
            value_type: self.value_type,
            role: self.role.clone(),
            missing: self.missing.merge(other.missing),
            domain: self.domain.merge(&other.domain),
            relation,
        }
    }
}

/// Synthesized schema for a whole source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub attributes: Vec<AttributeSummary>,
    /// Data rows observed; annotation rows are not data.
    pub example_count: ApproxCount,
    /// Structurally malformed rows the cursor skipped.
    pub skipped_rows: usize,
}

impl SchemaSummary {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSummary> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
