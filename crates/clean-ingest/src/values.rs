//! Polars AnyValue utility functions.
//!
//! Conversions used when reading cells out of a loaded frame and when
//! serializing them back to CSV text.

use chrono::{DateTime, Days, NaiveDate, Utc};
use polars::prelude::AnyValue;

/// Days-since-epoch origin used by Polars `Date` values.
fn epoch_date() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

/// Convert a Polars `Date` physical value back to a calendar date.
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    let magnitude = Days::new(u64::from(days.unsigned_abs()));
    if days >= 0 {
        epoch_date().checked_add_days(magnitude)
    } else {
        epoch_date().checked_sub_days(magnitude)
    }
}

/// Convert a calendar date to the Polars `Date` physical value.
pub fn days_from_date(date: NaiveDate) -> i32 {
    // chrono's supported range (+/- 262_143 years) fits in i32 days
    date.signed_duration_since(epoch_date()).num_days() as i32
}

/// Converts a Polars AnyValue to its CSV text representation.
///
/// Null becomes the empty string and dates use `YYYY-MM-DD`.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Date(days) => date_from_days(days)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None if the result is empty.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(" 149 "), Some(149.0));
        assert_eq!(parse_f64("99.5"), Some(99.5));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("$10"), None);
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(10.5), "10.5");
        assert_eq!(format_numeric(100.0), "100");
    }

    #[test]
    fn test_date_days_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2019, 5, 21).unwrap();
        let days = days_from_date(date);
        assert_eq!(days, 18037);
        assert_eq!(date_from_days(days), Some(date));
        let before_epoch = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(date_from_days(days_from_date(before_epoch)), Some(before_epoch));
    }

    #[test]
    fn test_any_to_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::String("Brooklyn")), "Brooklyn");
        assert_eq!(any_to_string(AnyValue::Date(18037)), "2019-05-21");
        assert_eq!(any_to_string(AnyValue::Float64(225.0)), "225");
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::String("80")), Some(80.0));
        assert_eq!(any_to_f64(AnyValue::String("n/a")), None);
        assert_eq!(any_to_f64(AnyValue::Int64(7)), Some(7.0));
        assert_eq!(any_to_f64(AnyValue::Null), None);
    }
}
