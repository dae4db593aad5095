//! Bounded schema synthesis without materializing a table.

use indexmap::IndexSet;

use crate::config::{AnnotationKind, TranslationConfig, ValueType};
use crate::cursor::RowCursor;
use crate::error::{CellError, ErrorCode, Result};
use crate::parse::CellParser;

use super::summary::{ApproxCount, AttributeSummary, SchemaSummary, SetRelation, ValueDomain};

/// Distinct nominal values retained per attribute before the set stops
/// growing and the relation degrades to [`SetRelation::Superset`].
pub const DEFAULT_MAX_NOMINAL_VALUES: usize = 100;

/// Scans a source and produces a [`SchemaSummary`] by the same per-cell
/// decisions as translation, folded into running aggregates instead of
/// columns: min/max for numeric and temporal attributes, a capped distinct
/// value set for nominal ones, and a missing counter everywhere.
///
/// A row-capped scan cannot claim exactness, so it downgrades every
/// relation to `Superset` and marks all counts inexact.
#[derive(Debug, Clone)]
pub struct SchemaSynthesizer {
    max_nominal_values: usize,
    row_cap: Option<usize>,
}

impl Default for SchemaSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaSynthesizer {
    pub fn new() -> Self {
        Self {
            max_nominal_values: DEFAULT_MAX_NOMINAL_VALUES,
            row_cap: None,
        }
    }

    pub fn with_max_nominal_values(mut self, cap: usize) -> Self {
        self.max_nominal_values = cap;
        self
    }

    /// Limit the scan to the first `cap` data rows.
    pub fn with_row_cap(mut self, cap: usize) -> Self {
        self.row_cap = Some(cap);
        self
    }

    pub fn synthesize(
        &self,
        cursor: &mut dyn RowCursor,
        config: &TranslationConfig,
    ) -> Result<SchemaSummary> {
        config.validate()?;
        cursor.reset()?;
        let parser = config.parser();

        let mut aggregates: Vec<Aggregate> = config
            .selected_columns()
            .map(|meta| Aggregate {
                column: meta.index,
                name: meta.name().to_string(),
                value_type: match meta.value_type {
                    ValueType::Unknown => ValueType::Nominal,
                    t => t,
                },
                role: meta.role.clone(),
                missing: 0,
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
                seen_range: false,
                values: IndexSet::new(),
                capped_values: false,
            })
            .collect();

        let mut data_rows = 0usize;
        while cursor.has_next() {
            if self.row_cap.is_some_and(|cap| data_rows >= cap) {
                break;
            }
            cursor.advance()?;
            let row = cursor.row_index().unwrap_or(0);

            if config.first_row_supplies_names(row, cursor.column_names().is_some()) {
                apply_names(cursor, &mut aggregates);
                continue;
            }
            if let Some(kind) = config.annotation(row) {
                // Only name rows affect the summary; role annotations
                // carry attribute metadata the summary does not report.
                if matches!(kind, AnnotationKind::Name) {
                    apply_names(cursor, &mut aggregates);
                }
                continue;
            }
            data_rows += 1;

            for aggregate in &mut aggregates {
                observe_cell(
                    cursor,
                    row,
                    aggregate,
                    &parser,
                    config.fault_tolerant,
                    self.max_nominal_values,
                )?;
            }
        }

        let capped_scan = self.row_cap.is_some_and(|cap| data_rows >= cap) && cursor.has_next();
        let attributes = aggregates
            .into_iter()
            .map(|a| a.finish(capped_scan))
            .collect();

        Ok(SchemaSummary {
            attributes,
            example_count: if capped_scan {
                ApproxCount::at_least(data_rows)
            } else {
                ApproxCount::exact(data_rows)
            },
            skipped_rows: cursor.skipped_rows(),
        })
    }
}

/// Running aggregate for one selected column.
#[derive(Debug)]
struct Aggregate {
    column: usize,
    name: String,
    value_type: ValueType,
    role: Option<String>,
    missing: usize,
    min: f64,
    max: f64,
    seen_range: bool,
    values: IndexSet<String>,
    capped_values: bool,
}

impl Aggregate {
    fn observe_value(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.seen_range = true;
    }

    fn observe_nominal(&mut self, value: &str, cap: usize) {
        if self.values.contains(value) {
            return;
        }
        if self.values.len() < cap {
            self.values.insert(value.to_string());
        } else {
            self.capped_values = true;
        }
    }

    fn finish(self, capped_scan: bool) -> AttributeSummary {
        let domain = if self.value_type.is_nominal() {
            if self.values.is_empty() && !self.capped_values {
                ValueDomain::Empty
            } else {
                ValueDomain::Values {
                    values: self.values,
                }
            }
        } else if self.seen_range {
            ValueDomain::Range {
                min: self.min,
                max: self.max,
            }
        } else {
            ValueDomain::Empty
        };
        let relation = if capped_scan || self.capped_values {
            SetRelation::Superset
        } else {
            SetRelation::Equal
        };
        AttributeSummary {
            name: self.name,
            value_type: self.value_type,
            role: self.role,
            missing: if capped_scan {
                ApproxCount::at_least(self.missing)
            } else {
                ApproxCount::exact(self.missing)
            },
            domain,
            relation,
        }
    }
}

fn apply_names(cursor: &dyn RowCursor, aggregates: &mut [Aggregate]) {
    for aggregate in aggregates {
        if cursor.is_missing(aggregate.column) {
            continue;
        }
        let Some(raw) = cursor.get_string(aggregate.column) else {
            continue;
        };
        let value = raw.trim();
        if !value.is_empty() {
            aggregate.name = value.to_string();
        }
    }
}

/// Fold one cell into the aggregate with translation's conversion rules:
/// strict mode aborts on the first failure, fault-tolerant mode counts it
/// as a missing value.
fn observe_cell(
    cursor: &dyn RowCursor,
    row: usize,
    aggregate: &mut Aggregate,
    parser: &CellParser,
    fault_tolerant: bool,
    max_nominal_values: usize,
) -> Result<()> {
    let column = aggregate.column;
    if cursor.is_missing(column) {
        aggregate.missing += 1;
        return Ok(());
    }

    let fail = |aggregate: &mut Aggregate, error: CellError| -> Result<()> {
        if fault_tolerant {
            aggregate.missing += 1;
            Ok(())
        } else {
            Err(error.into())
        }
    };

    match aggregate.value_type {
        ValueType::Integer => {
            let raw = cursor.get_string(column).unwrap_or_default();
            if cursor.native_value_type(column).is_numeric() {
                match cursor.get_number(column) {
                    Some(Ok(v)) => aggregate.observe_value(v),
                    Some(Err(e)) => {
                        let raw = raw.to_string();
                        fail(
                            aggregate,
                            CellError::new(row, column, ErrorCode::UnparseableInteger, raw)
                                .with_source(e),
                        )?;
                    }
                    None => aggregate.missing += 1,
                }
            } else {
                match parser.integer(raw) {
                    Some(v) => aggregate.observe_value(v as f64),
                    None => fail(
                        aggregate,
                        CellError::new(row, column, ErrorCode::UnparseableInteger, raw),
                    )?,
                }
            }
        }
        ValueType::Real => {
            let raw = cursor.get_string(column).unwrap_or_default();
            if cursor.native_value_type(column).is_numeric() {
                match cursor.get_number(column) {
                    Some(Ok(v)) => aggregate.observe_value(v),
                    Some(Err(e)) => {
                        let raw = raw.to_string();
                        fail(
                            aggregate,
                            CellError::new(row, column, ErrorCode::UnparseableReal, raw)
                                .with_source(e),
                        )?;
                    }
                    None => aggregate.missing += 1,
                }
            } else {
                match parser.real(raw) {
                    Some(v) => aggregate.observe_value(v),
                    None => fail(
                        aggregate,
                        CellError::new(row, column, ErrorCode::UnparseableReal, raw),
                    )?,
                }
            }
        }
        ValueType::DateTime | ValueType::Date | ValueType::Time => {
            if let Some(native) = cursor.get_date(column) {
                aggregate.observe_value(CellParser::epoch_millis(native));
                return Ok(());
            }
            let raw = cursor.get_string(column).unwrap_or_default();
            match parser.temporal(raw) {
                Some((dt, _)) => aggregate.observe_value(CellParser::epoch_millis(dt)),
                None => fail(
                    aggregate,
                    CellError::new(row, column, ErrorCode::UnparseableDate, raw),
                )?,
            }
        }
        _ => {
            let raw = cursor.get_string(column).unwrap_or_default();
            let value = raw.trim();
            if aggregate.value_type == ValueType::Binominal
                && !aggregate.values.contains(value)
                && aggregate.values.len() >= 2
            {
                fail(
                    aggregate,
                    CellError::new(row, column, ErrorCode::MoreThanTwoValues, value),
                )?;
                return Ok(());
            }
            aggregate.observe_nominal(value, max_nominal_values);
        }
    }
    Ok(())
}
