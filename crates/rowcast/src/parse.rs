//! Cell-level parsing against configured value formats.
//!
//! Parsing never signals "not this type" through errors the caller has to
//! catch; every probe returns an `Option` so fall-through between candidate
//! types stays explicit.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ValueType;

/// Check if a raw cell represents a missing/null value.
pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "?"
        || trimmed == "."
        || trimmed == "-"
}

/// Date shapes tried in order when no explicit pattern is configured.
/// The regex is a cheap prefilter; chrono has the final word.
static BUILTIN_DATE_FORMATS: Lazy<Vec<(Regex, &'static str, ValueType)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}$").unwrap(),
            "%Y-%m-%d %H:%M:%S",
            ValueType::DateTime,
        ),
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}$").unwrap(),
            "%Y-%m-%d %H:%M",
            ValueType::DateTime,
        ),
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap(),
            "%Y-%m-%d",
            ValueType::Date,
        ),
        (
            Regex::new(r"^\d{4}/\d{2}/\d{2}$").unwrap(),
            "%Y/%m/%d",
            ValueType::Date,
        ),
        (
            Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap(),
            "%m/%d/%Y",
            ValueType::Date,
        ),
        (
            Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").unwrap(),
            "%d.%m.%Y",
            ValueType::Date,
        ),
        (
            Regex::new(r"^\d{2}:\d{2}:\d{2}$").unwrap(),
            "%H:%M:%S",
            ValueType::Time,
        ),
        (
            Regex::new(r"^\d{2}:\d{2}$").unwrap(),
            "%H:%M",
            ValueType::Time,
        ),
    ]
});

/// Parses raw cell text into typed values.
///
/// An explicit chrono pattern pins temporal parsing to exactly that shape;
/// without one, the built-in shapes above are tried in order.
#[derive(Debug, Clone, Default)]
pub struct CellParser {
    format: Option<String>,
}

impl CellParser {
    /// Parser using the built-in date shapes.
    pub fn new() -> Self {
        Self { format: None }
    }

    /// Parser pinned to an explicit chrono date pattern.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
        }
    }

    /// The configured pattern, if any.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// The temporal flavor the configured pattern produces.
    pub fn temporal_type(&self) -> ValueType {
        match &self.format {
            Some(fmt) => classify_format(fmt),
            None => ValueType::Date,
        }
    }

    /// Probe the cell as a whole number.
    pub fn integer(&self, value: &str) -> Option<i64> {
        value.trim().parse::<i64>().ok()
    }

    /// Probe the cell as a real number. Non-finite spellings ("NaN",
    /// "inf") are not data and do not count.
    pub fn real(&self, value: &str) -> Option<f64> {
        value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Probe the cell as a date/time value under the configured pattern,
    /// reporting which temporal flavor matched.
    pub fn temporal(&self, value: &str) -> Option<(NaiveDateTime, ValueType)> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match &self.format {
            Some(fmt) => {
                parse_with_format(trimmed, fmt).map(|dt| (dt, classify_format(fmt)))
            }
            None => BUILTIN_DATE_FORMATS.iter().find_map(|(shape, fmt, kind)| {
                if !shape.is_match(trimmed) {
                    return None;
                }
                parse_with_format(trimmed, fmt).map(|dt| (dt, *kind))
            }),
        }
    }

    /// Numeric encoding of a temporal value: milliseconds since the epoch.
    pub fn epoch_millis(value: NaiveDateTime) -> f64 {
        value.and_utc().timestamp_millis() as f64
    }
}

/// Parse against one chrono pattern, trying full datetime first, then
/// date-only (midnight) and time-only (epoch day) interpretations.
fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    // "T" separators parse with the space variant of the same pattern.
    let candidate = if value.contains('T') && format.contains(' ') {
        value.replacen('T', " ", 1)
    } else {
        value.to_string()
    };

    if let Ok(dt) = NaiveDateTime::parse_from_str(&candidate, format) {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&candidate, format) {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(t) = NaiveTime::parse_from_str(&candidate, format) {
        return NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(t));
    }
    None
}

/// Decide which temporal flavor a chrono pattern describes.
fn classify_format(format: &str) -> ValueType {
    let has_time = ["%H", "%M", "%S", "%T", "%R", "%r", "%I"]
        .iter()
        .any(|spec| format.contains(spec));
    let has_date = ["%Y", "%y", "%m", "%d", "%D", "%F", "%e", "%b", "%B", "%j"]
        .iter()
        .any(|spec| format.contains(spec));
    match (has_date, has_time) {
        (true, true) => ValueType::DateTime,
        (false, true) => ValueType::Time,
        _ => ValueType::Date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tokens() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("  "));
        assert!(is_missing_token("NA"));
        assert!(is_missing_token("n/a"));
        assert!(is_missing_token("NULL"));
        assert!(is_missing_token("?"));
        assert!(is_missing_token("."));
        assert!(!is_missing_token("0"));
        assert!(!is_missing_token("value"));
    }

    #[test]
    fn test_integer_probe() {
        let parser = CellParser::new();
        assert_eq!(parser.integer("42"), Some(42));
        assert_eq!(parser.integer(" -7 "), Some(-7));
        assert_eq!(parser.integer("2.5"), None);
        assert_eq!(parser.integer("abc"), None);
    }

    #[test]
    fn test_real_probe_rejects_non_finite() {
        let parser = CellParser::new();
        assert_eq!(parser.real("2.5"), Some(2.5));
        assert_eq!(parser.real("1e3"), Some(1000.0));
        assert_eq!(parser.real("NaN"), None);
        assert_eq!(parser.real("inf"), None);
        assert_eq!(parser.real("abc"), None);
    }

    #[test]
    fn test_builtin_date_shapes() {
        let parser = CellParser::new();
        let (_, kind) = parser.temporal("2023-05-17").unwrap();
        assert_eq!(kind, ValueType::Date);
        let (_, kind) = parser.temporal("2023-05-17 08:30:00").unwrap();
        assert_eq!(kind, ValueType::DateTime);
        let (_, kind) = parser.temporal("08:30").unwrap();
        assert_eq!(kind, ValueType::Time);
        assert!(parser.temporal("not a date").is_none());
        // Shape matches, chrono rejects: month 13 does not exist.
        assert!(parser.temporal("2023-13-01").is_none());
    }

    #[test]
    fn test_explicit_format_pins_the_shape() {
        let parser = CellParser::with_format("%d.%m.%Y");
        assert!(parser.temporal("17.05.2023").is_some());
        assert!(parser.temporal("2023-05-17").is_none());
        assert_eq!(parser.temporal_type(), ValueType::Date);
    }

    #[test]
    fn test_format_classification() {
        assert_eq!(classify_format("%Y-%m-%d"), ValueType::Date);
        assert_eq!(classify_format("%Y-%m-%d %H:%M:%S"), ValueType::DateTime);
        assert_eq!(classify_format("%H:%M"), ValueType::Time);
    }

    #[test]
    fn test_epoch_encoding_is_stable() {
        let parser = CellParser::new();
        let (dt, _) = parser.temporal("1970-01-02").unwrap();
        assert_eq!(CellParser::epoch_millis(dt), 86_400_000.0);
    }
}
