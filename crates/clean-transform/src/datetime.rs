//! Review date parsing and normalization.
//!
//! `last_review` arrives as free-form text from the listing export. Values are
//! parsed into calendar dates and stored as a Polars `Date` column, which the
//! writer serializes as ISO 8601 (`YYYY-MM-DD`). Time components are dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame, DataType, NamedFrom, Series};

use clean_ingest::{LAST_REVIEW_COLUMN, any_to_string_non_empty, date_from_days, days_from_date};

use crate::error::{Result, TransformError};

/// Date-only layouts, most common first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2019-05-21
    "%Y/%m/%d", // 2019/05/21
    "%m/%d/%Y", // 05/21/2019
    "%d-%b-%Y", // 21-May-2019
    "%b %d, %Y", // May 21, 2019
    "%B %d, %Y", // May 21, 2019 (full month)
    "%d %b %Y", // 21 May 2019
    "%d %B %Y", // 21 May 2019 (full month)
];

/// Date-time layouts without offset.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a review date, returning `None` when the text is not a recognizable date.
///
/// Empty input is not a date either; callers treat it as a missing value
/// before calling this.
pub fn parse_review_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = parse_compact(trimmed) {
        return Some(date);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    // Keep the calendar day as written, not shifted to UTC
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_local().date())
}

/// `YYYYMMDD` with exactly eight digits.
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a date in the canonical output form.
pub fn format_review_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Read one `last_review` cell. Already-typed dates pass straight through.
fn review_cell(value: AnyValue<'_>) -> std::result::Result<Option<NaiveDate>, String> {
    if let AnyValue::Date(days) = value {
        return Ok(date_from_days(days));
    }
    match any_to_string_non_empty(value) {
        None => Ok(None),
        Some(text) => parse_review_date(&text).map(Some).ok_or(text),
    }
}

/// Replace `last_review` with a `Date` column.
///
/// Empty cells become null. The first value that is not a date aborts the
/// whole transform; `source_rows[i]` gives the 0-based input row of output
/// row `i` so the error can point at the original file.
pub fn normalize_review_dates(df: &DataFrame, source_rows: &[usize]) -> Result<DataFrame> {
    let column = df
        .column(LAST_REVIEW_COLUMN)
        .map_err(|_| TransformError::MissingColumn {
            column: LAST_REVIEW_COLUMN.to_string(),
        })?;

    let mut days: Vec<Option<i32>> = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        match review_cell(value) {
            Ok(date) => days.push(date.map(days_from_date)),
            Err(text) => {
                let row = source_rows.get(idx).copied().unwrap_or(idx) + 1;
                return Err(TransformError::Parse {
                    row,
                    column: LAST_REVIEW_COLUMN.to_string(),
                    value: text,
                });
            }
        }
    }

    let series = Series::new(LAST_REVIEW_COLUMN.into(), days).cast(&DataType::Date)?;
    let mut out = df.clone();
    out.with_column(series)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_review_date("2019-05-21"), Some(ymd(2019, 5, 21)));
        assert_eq!(parse_review_date(" 2018-10-19 "), Some(ymd(2018, 10, 19)));
    }

    #[test]
    fn parses_common_export_layouts() {
        let expected = Some(ymd(2019, 5, 21));
        assert_eq!(parse_review_date("2019/05/21"), expected);
        assert_eq!(parse_review_date("20190521"), expected);
        assert_eq!(parse_review_date("05/21/2019"), expected);
        assert_eq!(parse_review_date("21-May-2019"), expected);
        assert_eq!(parse_review_date("May 21, 2019"), expected);
        assert_eq!(parse_review_date("21 May 2019"), expected);
    }

    #[test]
    fn drops_time_component() {
        let expected = Some(ymd(2019, 5, 21));
        assert_eq!(parse_review_date("2019-05-21 00:00:00"), expected);
        assert_eq!(parse_review_date("2019-05-21T23:59:59.123"), expected);
        assert_eq!(parse_review_date("2019-05-21T18:30"), expected);
        assert_eq!(parse_review_date("2019-05-21T23:30:00-05:00"), expected);
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_review_date(""), None);
        assert_eq!(parse_review_date("not-a-date"), None);
        assert_eq!(parse_review_date("2019-13-01"), None);
        assert_eq!(parse_review_date("2019-02-30"), None);
        assert_eq!(parse_review_date("12345678"), None);
    }

    #[test]
    fn canonical_form_is_stable() {
        let first = parse_review_date("May 21, 2019").map(format_review_date);
        let second = first.as_deref().and_then(parse_review_date).map(format_review_date);
        assert_eq!(first.as_deref(), Some("2019-05-21"));
        assert_eq!(first, second);
    }
}
