//! Progressive type generalization over a bounded row prefix.

use crate::config::{TranslationConfig, ValueType};
use crate::cursor::RowCursor;
use crate::error::Result;
use crate::parse::CellParser;

/// Default number of rows probed per pass.
pub const DEFAULT_PROBE_ROWS: usize = 1000;

/// Per-column inference state during one probe pass.
#[derive(Debug, Default)]
struct ColumnState {
    /// Externally fixed by the user or the source's native typing; never
    /// probed.
    fixed: bool,
    /// Current rung on the generalization ladder; `None` until the first
    /// non-missing cell.
    current: Option<ValueType>,
    /// Which temporal flavor the date rung observed.
    temporal: Option<ValueType>,
    /// Up to two distinct observed values.
    buffer: Vec<String>,
    /// A third distinct value appeared; never binominal again.
    over_two: bool,
}

impl ColumnState {
    fn fixed() -> Self {
        Self {
            fixed: true,
            ..Self::default()
        }
    }

    /// Record a distinct-value observation.
    fn observe(&mut self, value: &str) {
        if self.over_two || self.buffer.iter().any(|v| v == value) {
            return;
        }
        if self.buffer.len() < 2 {
            self.buffer.push(value.to_string());
        } else {
            self.over_two = true;
        }
    }

    /// Final type for a column whose configured type was `Unknown`.
    fn conclude(&self) -> ValueType {
        match self.current {
            // Zero evidence: an all-missing column cannot be usefully typed.
            None => ValueType::Nominal,
            Some(ValueType::Date) => self.temporal.unwrap_or(ValueType::Date),
            Some(t) => t,
        }
    }
}

/// Infers column types from a bounded prefix of a cursor.
///
/// Each non-missing cell is probed against the column's current candidate
/// type; on failure the candidate generalizes along the fixed ladder
/// Integer → Real → Date → Binominal → Polynominal until one rung accepts
/// (Polynominal always does). A column that reaches Polynominal is frozen.
///
/// The numeric rungs are deliberately tried before the date rung, so a
/// column of short integer-like date codes types as Integer, never Date.
/// Results are written back only into columns whose configured type was
/// still `Unknown`; running twice over a reset cursor yields identical
/// assignments.
#[derive(Debug, Clone)]
pub struct TypeGuesser {
    probe_rows: usize,
}

impl TypeGuesser {
    pub fn new() -> Self {
        Self {
            probe_rows: DEFAULT_PROBE_ROWS,
        }
    }

    /// Override the probe window (never a process-global setting).
    pub fn with_probe_rows(mut self, probe_rows: usize) -> Self {
        self.probe_rows = probe_rows;
        self
    }

    pub fn probe_rows(&self) -> usize {
        self.probe_rows
    }

    /// Run the probe pass and fill in the config's `Unknown` column types.
    pub fn guess(
        &self,
        cursor: &mut dyn RowCursor,
        config: &mut TranslationConfig,
    ) -> Result<()> {
        cursor.reset()?;
        let parser = config.parser();

        let initial_width = config.column_count().max(cursor.column_count());
        let mut states: Vec<ColumnState> = (0..initial_width)
            .map(|i| match config.column(i) {
                Some(meta) if meta.value_type != ValueType::Unknown => ColumnState::fixed(),
                _ => ColumnState::default(),
            })
            .collect();

        let mut probed = 0;
        while probed < self.probe_rows && cursor.has_next() {
            cursor.advance()?;
            let row = cursor.row_index().unwrap_or(0);
            // Name-supplying rows, however configured, carry no type evidence.
            if config.first_row_supplies_names(row, cursor.column_names().is_some())
                || config.is_annotation_row(row)
            {
                continue;
            }
            probed += 1;

            // Wider rows extend the arena with probeable columns.
            while states.len() < cursor.column_count() {
                states.push(ColumnState::default());
            }

            for (column, state) in states.iter_mut().enumerate() {
                if state.fixed || state.current == Some(ValueType::Polynominal) {
                    continue;
                }
                if cursor.is_missing(column) {
                    continue;
                }
                let Some(raw) = cursor.get_string(column) else {
                    continue;
                };
                let value = raw.trim().to_string();
                state.observe(&value);
                Self::climb(state, &value, &parser);
            }
        }

        config.ensure_width(states.len());
        for (column, state) in states.iter().enumerate() {
            if let Some(meta) = config.column_mut(column) {
                if meta.value_type == ValueType::Unknown {
                    meta.value_type = state.conclude();
                }
            }
        }
        Ok(())
    }

    /// Generalize the column's candidate until a rung accepts the value.
    fn climb(state: &mut ColumnState, value: &str, parser: &CellParser) {
        let mut candidate = state.current.unwrap_or(ValueType::Integer);
        loop {
            let accepted = match candidate {
                ValueType::Integer => parser.integer(value).is_some(),
                ValueType::Real => parser.real(value).is_some(),
                ValueType::Date => match parser.temporal(value) {
                    Some((_, flavor)) => {
                        state.temporal = Some(merge_temporal(state.temporal, flavor));
                        true
                    }
                    None => false,
                },
                ValueType::Binominal => !state.over_two,
                // Universal fallback.
                _ => true,
            };
            if accepted {
                state.current = Some(candidate);
                return;
            }
            candidate = next_rung(candidate);
        }
    }
}

impl Default for TypeGuesser {
    fn default() -> Self {
        Self::new()
    }
}

/// The next more general rung on the ladder.
fn next_rung(current: ValueType) -> ValueType {
    match current {
        ValueType::Integer => ValueType::Real,
        ValueType::Real => ValueType::Date,
        ValueType::Date => ValueType::Binominal,
        _ => ValueType::Polynominal,
    }
}

/// Widen across differing temporal flavors.
fn merge_temporal(seen: Option<ValueType>, flavor: ValueType) -> ValueType {
    match seen {
        None => flavor,
        Some(prior) if prior == flavor => flavor,
        Some(_) => ValueType::DateTime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnnotationKind, ColumnMetaData};
    use crate::cursor::MemoryCursor;

    fn guess_types(rows: &[&[&str]]) -> Vec<ValueType> {
        let mut cursor = MemoryCursor::from_strings(rows);
        let mut config = TranslationConfig::bootstrap(&cursor);
        TypeGuesser::new().guess(&mut cursor, &mut config).unwrap();
        config.columns().iter().map(|c| c.value_type).collect()
    }

    #[test]
    fn test_all_integers_stay_integer() {
        assert_eq!(guess_types(&[&["1"], &["-2"], &["300"]]), vec![ValueType::Integer]);
    }

    #[test]
    fn test_one_real_generalizes_to_real() {
        assert_eq!(guess_types(&[&["1"], &["2.5"], &["3"]]), vec![ValueType::Real]);
    }

    #[test]
    fn test_iso_dates_type_as_date() {
        assert_eq!(
            guess_types(&[&["2023-01-01"], &["2023-02-03"]]),
            vec![ValueType::Date]
        );
    }

    #[test]
    fn test_datetime_cells_type_as_datetime() {
        assert_eq!(
            guess_types(&[&["2023-01-01 08:00:00"], &["2023-02-03 09:30:00"]]),
            vec![ValueType::DateTime]
        );
    }

    #[test]
    fn test_mixed_temporal_flavors_widen_to_datetime() {
        assert_eq!(
            guess_types(&[&["2023-01-01"], &["2023-02-03 09:30:00"]]),
            vec![ValueType::DateTime]
        );
    }

    #[test]
    fn test_two_distinct_strings_are_binominal() {
        assert_eq!(
            guess_types(&[&["yes"], &["no"], &["yes"]]),
            vec![ValueType::Binominal]
        );
    }

    #[test]
    fn test_three_distinct_strings_are_polynominal() {
        assert_eq!(
            guess_types(&[&["a"], &["b"], &["c"]]),
            vec![ValueType::Polynominal]
        );
    }

    #[test]
    fn test_numbers_then_text_fall_to_nominal_rungs() {
        assert_eq!(
            guess_types(&[&["1"], &["2"], &["x"]]),
            vec![ValueType::Polynominal]
        );
        assert_eq!(guess_types(&[&["1"], &["x"]]), vec![ValueType::Binominal]);
    }

    #[test]
    fn test_all_missing_column_defaults_to_nominal() {
        assert_eq!(guess_types(&[&["NA"], &[""], &["?"]]), vec![ValueType::Nominal]);
    }

    #[test]
    fn test_integer_like_date_codes_stay_numeric() {
        // Observed behavior, preserved: the numeric rungs come first.
        assert_eq!(
            guess_types(&[&["20230101"], &["20230203"]]),
            vec![ValueType::Integer]
        );
    }

    #[test]
    fn test_probe_cap_bounds_the_scan() {
        let mut cursor =
            MemoryCursor::from_strings(&[&["1"], &["2"], &["x"], &["y"], &["z"]]);
        let mut config = TranslationConfig::bootstrap(&cursor);
        TypeGuesser::new()
            .with_probe_rows(2)
            .guess(&mut cursor, &mut config)
            .unwrap();
        // Only the first two rows were seen; both parse as integers.
        assert_eq!(config.column(0).unwrap().value_type, ValueType::Integer);
    }

    #[test]
    fn test_first_row_names_are_not_probed() {
        let mut cursor = MemoryCursor::from_strings(&[&["age"], &["1"], &["2"]]);
        let mut config = TranslationConfig::bootstrap(&cursor);
        config.first_row_as_names = true;
        TypeGuesser::new().guess(&mut cursor, &mut config).unwrap();
        assert_eq!(config.column(0).unwrap().value_type, ValueType::Integer);
    }

    #[test]
    fn test_annotation_rows_are_not_probed() {
        let mut cursor = MemoryCursor::from_strings(&[&["age"], &["1"], &["2"]]);
        let mut config = TranslationConfig::bootstrap(&cursor);
        config.set_annotation(0, AnnotationKind::Name);
        TypeGuesser::new().guess(&mut cursor, &mut config).unwrap();
        assert_eq!(config.column(0).unwrap().value_type, ValueType::Integer);
    }

    #[test]
    fn test_fixed_types_are_never_overwritten() {
        let mut cursor = MemoryCursor::from_strings(&[&["1", "1"], &["2", "2"]]);
        let mut config = TranslationConfig::new(vec![
            ColumnMetaData::new(0).with_type(ValueType::Polynominal),
            ColumnMetaData::new(1),
        ]);
        TypeGuesser::new().guess(&mut cursor, &mut config).unwrap();
        assert_eq!(config.column(0).unwrap().value_type, ValueType::Polynominal);
        assert_eq!(config.column(1).unwrap().value_type, ValueType::Integer);
    }

    #[test]
    fn test_guessing_is_idempotent() {
        let rows: &[&[&str]] = &[&["1", "a", "2023-01-01"], &["2.5", "b", "x"]];
        let mut cursor = MemoryCursor::from_strings(rows);
        let mut config = TranslationConfig::bootstrap(&cursor);
        let guesser = TypeGuesser::new();
        guesser.guess(&mut cursor, &mut config).unwrap();
        let first: Vec<ValueType> = config.columns().iter().map(|c| c.value_type).collect();

        let mut fresh = TranslationConfig::bootstrap(&cursor);
        guesser.guess(&mut cursor, &mut fresh).unwrap();
        let second: Vec<ValueType> = fresh.columns().iter().map(|c| c.value_type).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wider_rows_extend_the_config() {
        let mut cursor = MemoryCursor::from_strings(&[&["1"], &["2", "extra", "x"]]);
        let mut config = TranslationConfig::bootstrap(&cursor);
        TypeGuesser::new().guess(&mut cursor, &mut config).unwrap();
        assert_eq!(config.column_count(), 3);
        assert_eq!(config.column(0).unwrap().value_type, ValueType::Integer);
    }
}
