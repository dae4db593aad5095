//! Second-pass materialization of a cursor into a typed table.

use crate::config::{AnnotationKind, TranslationConfig, ValueType};
use crate::cursor::RowCursor;
use crate::error::{CellError, ErrorCode, Result, RowcastError};
use crate::parse::CellParser;
use crate::table::{Attribute, Table};

use super::cancel::CancelToken;

/// Warnings kept per pass; further ones are counted, not stored.
const MAX_WARNINGS: usize = 100;

/// Outcome of one translation pass.
#[derive(Debug)]
pub struct Translation {
    /// The materialized table. `is_complete()` is false when a stop request
    /// cut the pass short.
    pub table: Table,
    /// Cell failures downgraded to missing values (fault-tolerant mode).
    pub warnings: Vec<CellError>,
    /// Warnings beyond the stored cap.
    pub suppressed_warnings: usize,
}

/// Converts cursor rows into a [`Table`] under a frozen configuration.
///
/// The two-phase contract: the type guesser has already refined the config
/// over its own bounded pass; translation then runs over a fresh or reset
/// cursor. Annotation rows feed attribute metadata and never allocate a
/// data row. Conversion failures follow the configured policy: strict mode
/// aborts with the first row/column-addressed [`CellError`], fault-tolerant
/// mode records it and writes a missing value.
#[derive(Debug, Default)]
pub struct Translator;

impl Translator {
    pub fn new() -> Self {
        Self
    }

    /// Translate up to `max_rows` data rows (all, when `None`).
    pub fn translate(
        &self,
        cursor: &mut dyn RowCursor,
        config: &TranslationConfig,
        max_rows: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<Translation> {
        config.validate()?;
        cursor.reset()?;
        let parser = config.parser();

        let mut selected: Vec<usize> = Vec::new();
        let mut attributes: Vec<Attribute> = Vec::new();
        for meta in config.selected_columns() {
            selected.push(meta.index);
            // A column that was never typed is carried as plain nominal.
            let value_type = match meta.value_type {
                ValueType::Unknown => ValueType::Nominal,
                t => t,
            };
            attributes.push(Attribute::new(
                meta.name(),
                value_type,
                meta.role.clone(),
                meta.index,
            ));
        }

        let mut table = Table::new(attributes);
        let mut warnings: Vec<CellError> = Vec::new();
        let mut suppressed = 0usize;

        while cursor.has_next() {
            if cancel.observe() {
                table.mark_incomplete();
                break;
            }
            if let Some(max) = max_rows {
                if table.row_count() >= max {
                    break;
                }
            }

            cursor.advance()?;
            let row = cursor.row_index().unwrap_or(0);

            if config.first_row_supplies_names(row, cursor.column_names().is_some()) {
                apply_annotation(&AnnotationKind::Name, cursor, &selected, &mut table);
                continue;
            }
            if let Some(kind) = config.annotation(row) {
                apply_annotation(kind, cursor, &selected, &mut table);
                continue;
            }

            // Build the whole row before committing any of it.
            let mut buffer = Vec::with_capacity(selected.len());
            for (slot, &column) in selected.iter().enumerate() {
                let attribute = table
                    .attribute_mut(slot)
                    .ok_or_else(|| RowcastError::Config(format!("no attribute at slot {slot}")))?;
                let value = convert_cell(
                    cursor,
                    row,
                    column,
                    attribute,
                    &parser,
                    config.fault_tolerant,
                    &mut warnings,
                    &mut suppressed,
                )?;
                buffer.push(value);
            }
            table.push_row(&buffer);
        }

        Ok(Translation {
            table,
            warnings,
            suppressed_warnings: suppressed,
        })
    }
}

/// Apply one annotation row to the target attributes.
fn apply_annotation(
    kind: &AnnotationKind,
    cursor: &dyn RowCursor,
    selected: &[usize],
    table: &mut Table,
) {
    for (slot, &column) in selected.iter().enumerate() {
        if cursor.is_missing(column) {
            continue;
        }
        let Some(raw) = cursor.get_string(column) else {
            continue;
        };
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        let Some(attribute) = table.attribute_mut(slot) else {
            continue;
        };
        match kind {
            AnnotationKind::Name => attribute.name = value.to_string(),
            AnnotationKind::Role(key) => {
                attribute.annotations.insert(key.clone(), value.to_string());
            }
        }
    }
}

/// Convert one cell to the attribute's declared type.
#[allow(clippy::too_many_arguments)]
fn convert_cell(
    cursor: &dyn RowCursor,
    row: usize,
    column: usize,
    attribute: &mut Attribute,
    parser: &CellParser,
    fault_tolerant: bool,
    warnings: &mut Vec<CellError>,
    suppressed: &mut usize,
) -> Result<f64> {
    if cursor.is_missing(column) {
        return Ok(f64::NAN);
    }

    let mut fail = |error: CellError| -> Result<f64> {
        if fault_tolerant {
            if warnings.len() < MAX_WARNINGS {
                warnings.push(error);
            } else {
                *suppressed += 1;
            }
            Ok(f64::NAN)
        } else {
            Err(error.into())
        }
    };

    match attribute.value_type {
        ValueType::Integer => {
            if cursor.native_value_type(column).is_numeric() {
                match cursor.get_number(column) {
                    Some(Ok(v)) => Ok(v),
                    Some(Err(e)) => {
                        let raw = cursor.get_string(column).unwrap_or_default().to_string();
                        fail(
                            CellError::new(row, column, ErrorCode::UnparseableInteger, raw)
                                .with_source(e),
                        )
                    }
                    None => Ok(f64::NAN),
                }
            } else {
                let raw = cursor.get_string(column).unwrap_or_default();
                match parser.integer(raw) {
                    Some(v) => Ok(v as f64),
                    None => fail(CellError::new(
                        row,
                        column,
                        ErrorCode::UnparseableInteger,
                        raw,
                    )),
                }
            }
        }
        ValueType::Real => {
            if cursor.native_value_type(column).is_numeric() {
                match cursor.get_number(column) {
                    Some(Ok(v)) => Ok(v),
                    Some(Err(e)) => {
                        let raw = cursor.get_string(column).unwrap_or_default().to_string();
                        fail(
                            CellError::new(row, column, ErrorCode::UnparseableReal, raw)
                                .with_source(e),
                        )
                    }
                    None => Ok(f64::NAN),
                }
            } else {
                let raw = cursor.get_string(column).unwrap_or_default();
                match parser.real(raw) {
                    Some(v) => Ok(v),
                    None => fail(CellError::new(row, column, ErrorCode::UnparseableReal, raw)),
                }
            }
        }
        ValueType::DateTime | ValueType::Date | ValueType::Time => {
            if let Some(native) = cursor.get_date(column) {
                return Ok(CellParser::epoch_millis(native));
            }
            let raw = cursor.get_string(column).unwrap_or_default();
            match parser.temporal(raw) {
                Some((dt, _)) => Ok(CellParser::epoch_millis(dt)),
                None => fail(CellError::new(row, column, ErrorCode::UnparseableDate, raw)),
            }
        }
        // Nominal family, including Binominal's two-value ceiling.
        _ => {
            let raw = cursor.get_string(column).unwrap_or_default();
            let value = raw.trim();
            if attribute.value_type == ValueType::Binominal
                && attribute.index_of(value).is_none()
                && attribute.dictionary().map_or(0, |d| d.len()) >= 2
            {
                return fail(CellError::new(
                    row,
                    column,
                    ErrorCode::MoreThanTwoValues,
                    value,
                ));
            }
            Ok(attribute.map_value(value) as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnMetaData;
    use crate::cursor::MemoryCursor;

    fn strict_config(types: &[ValueType]) -> TranslationConfig {
        TranslationConfig::new(
            types
                .iter()
                .enumerate()
                .map(|(i, t)| ColumnMetaData::new(i).with_type(*t))
                .collect(),
        )
    }

    fn translate(
        rows: &[&[&str]],
        config: &TranslationConfig,
    ) -> Result<Translation> {
        let mut cursor = MemoryCursor::from_strings(rows);
        Translator::new().translate(&mut cursor, config, None, &CancelToken::new())
    }

    #[test]
    fn test_strict_integer_failure_is_addressed_precisely() {
        let config = strict_config(&[ValueType::Integer, ValueType::Real]);
        let err = translate(&[&["1", "2.5"], &["x", "3.0"]], &config).unwrap_err();
        match err {
            crate::error::RowcastError::Cell(cell) => {
                assert_eq!(cell.code, ErrorCode::UnparseableInteger);
                assert_eq!(cell.row, 1);
                assert_eq!(cell.column, 0);
                assert_eq!(cell.value, "x");
            }
            other => panic!("expected cell error, got {other}"),
        }
    }

    #[test]
    fn test_fault_tolerant_downgrades_to_missing() {
        let mut config = strict_config(&[ValueType::Integer, ValueType::Real]);
        config.fault_tolerant = true;
        let result = translate(&[&["1", "2.5"], &["x", "3.0"]], &config).unwrap();

        assert_eq!(result.table.row_count(), 2);
        assert_eq!(result.table.value(0, 0), 1.0);
        assert!(result.table.is_missing(1, 0));
        assert_eq!(result.table.column(1), &[2.5, 3.0]);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, ErrorCode::UnparseableInteger);
    }

    #[test]
    fn test_nominal_dictionary_is_first_seen_order() {
        let config = strict_config(&[ValueType::Polynominal]);
        let result = translate(&[&["b"], &["a"], &["b"], &["c"]], &config).unwrap();
        assert_eq!(result.table.column(0), &[0.0, 1.0, 0.0, 2.0]);
        assert_eq!(result.table.nominal_value(1, 0), Some("a"));
    }

    #[test]
    fn test_binominal_third_value_is_an_error() {
        let config = strict_config(&[ValueType::Binominal]);
        let err = translate(&[&["yes"], &["no"], &["maybe"]], &config).unwrap_err();
        match err {
            crate::error::RowcastError::Cell(cell) => {
                assert_eq!(cell.code, ErrorCode::MoreThanTwoValues);
                assert_eq!(cell.row, 2);
            }
            other => panic!("expected cell error, got {other}"),
        }

        let mut tolerant = strict_config(&[ValueType::Binominal]);
        tolerant.fault_tolerant = true;
        let result = translate(&[&["yes"], &["no"], &["maybe"]], &tolerant).unwrap();
        assert!(result.table.is_missing(2, 0));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_annotation_rows_never_become_data() {
        let mut config = strict_config(&[ValueType::Integer]);
        config.set_annotation(0, AnnotationKind::Name);
        config.set_annotation(2, AnnotationKind::Role("unit".to_string()));
        let result =
            translate(&[&["age"], &["30"], &["years"], &["25"]], &config).unwrap();

        assert_eq!(result.table.row_count(), 2);
        let attr = result.table.attribute(0).unwrap();
        assert_eq!(attr.name, "age");
        assert_eq!(attr.annotations.get("unit").map(String::as_str), Some("years"));
        assert_eq!(result.table.column(0), &[30.0, 25.0]);
    }

    #[test]
    fn test_first_row_names_apply_when_the_source_has_none() {
        let mut config = strict_config(&[ValueType::Integer]);
        config.first_row_as_names = true;
        let result = translate(&[&["age"], &["30"], &["25"]], &config).unwrap();

        assert_eq!(result.table.attribute(0).unwrap().name, "age");
        assert_eq!(result.table.row_count(), 2);
        assert_eq!(result.table.column(0), &[30.0, 25.0]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_sources_with_their_own_names_ignore_the_first_row_flag() {
        let mut config = strict_config(&[ValueType::Integer]);
        config.first_row_as_names = true;
        let mut cursor = MemoryCursor::from_strings(&[&["30"], &["25"]])
            .with_names(vec!["age".to_string()]);
        let result = Translator::new()
            .translate(&mut cursor, &config, None, &CancelToken::new())
            .unwrap();
        // The adapter already consumed its header; every row is data.
        assert_eq!(result.table.row_count(), 2);
    }

    #[test]
    fn test_empty_annotation_cells_keep_the_prior_name() {
        let mut config = TranslationConfig::new(vec![
            ColumnMetaData::named(0, "kept").with_type(ValueType::Integer),
            ColumnMetaData::named(1, "renamed").with_type(ValueType::Integer),
        ]);
        config.set_annotation(0, AnnotationKind::Name);
        let result = translate(&[&["", "better"], &["1", "2"]], &config).unwrap();
        assert_eq!(result.table.attribute(0).unwrap().name, "kept");
        assert_eq!(result.table.attribute(1).unwrap().name, "better");
    }

    #[test]
    fn test_deselected_columns_are_dropped() {
        let mut config = strict_config(&[ValueType::Integer, ValueType::Integer]);
        config.column_mut(0).unwrap().selected = false;
        let result = translate(&[&["1", "2"], &["3", "4"]], &config).unwrap();
        assert_eq!(result.table.attribute_count(), 1);
        assert_eq!(result.table.column(0), &[2.0, 4.0]);
        assert_eq!(result.table.attribute(0).unwrap().source_column, 1);
    }

    #[test]
    fn test_missing_cells_encode_as_nan() {
        let config = strict_config(&[ValueType::Integer, ValueType::Polynominal]);
        let result = translate(&[&["1", "a"], &["NA", "?"]], &config).unwrap();
        assert!(result.table.is_missing(1, 0));
        assert!(result.table.is_missing(1, 1));
        assert_eq!(result.table.nominal_value(1, 1), None);
    }

    #[test]
    fn test_temporal_cells_encode_epoch_millis() {
        let config = strict_config(&[ValueType::Date]);
        let result = translate(&[&["1970-01-02"]], &config).unwrap();
        assert_eq!(result.table.value(0, 0), 86_400_000.0);
    }

    #[test]
    fn test_max_rows_caps_data_rows_only() {
        let mut config = strict_config(&[ValueType::Integer]);
        config.set_annotation(0, AnnotationKind::Name);
        let mut cursor =
            MemoryCursor::from_strings(&[&["age"], &["1"], &["2"], &["3"]]);
        let result = Translator::new()
            .translate(&mut cursor, &config, Some(2), &CancelToken::new())
            .unwrap();
        assert_eq!(result.table.row_count(), 2);
        assert!(result.table.is_complete());
    }

    #[test]
    fn test_cancellation_yields_partial_incomplete_table() {
        let config = strict_config(&[ValueType::Integer]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut cursor = MemoryCursor::from_strings(&[&["1"], &["2"]]);
        let result = Translator::new()
            .translate(&mut cursor, &config, None, &cancel)
            .unwrap();
        assert_eq!(result.table.row_count(), 0);
        assert!(!result.table.is_complete());
        // The request was consumed by this pass.
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_invalid_config_fails_before_reading_rows() {
        let mut config = strict_config(&[ValueType::Integer, ValueType::Integer]);
        config.column_mut(0).unwrap().role = Some("id".to_string());
        config.column_mut(1).unwrap().role = Some("id".to_string());
        let err = translate(&[&["1", "2"]], &config).unwrap_err();
        assert!(matches!(err, crate::error::RowcastError::Config(_)));
    }

    #[test]
    fn test_native_numeric_sources_bypass_string_parsing() {
        let config = strict_config(&[ValueType::Real]);
        let mut cursor = MemoryCursor::from_strings(&[&["1.5"], &["2.5"]])
            .with_native_types(vec![ValueType::Real]);
        let result = Translator::new()
            .translate(&mut cursor, &config, None, &CancelToken::new())
            .unwrap();
        assert_eq!(result.table.column(0), &[1.5, 2.5]);
    }
}
