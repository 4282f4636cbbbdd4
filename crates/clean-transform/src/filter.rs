//! Price outlier filter.

use polars::prelude::{AnyValue, BooleanChunked, DataFrame, NewChunkedArray};

use clean_ingest::{PRICE_COLUMN, any_to_f64};

use crate::bounds::PriceBounds;
use crate::error::{Result, TransformError};

/// Rows kept by the outlier filter.
#[derive(Debug, Clone)]
pub struct FilteredFrame {
    pub data: DataFrame,
    /// 0-based input index of every retained row, in output order.
    pub source_rows: Vec<usize>,
}

/// Read the `price` column as numbers; absent or non-numeric cells are `None`.
pub fn price_values(df: &DataFrame) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(PRICE_COLUMN)
        .map_err(|_| TransformError::MissingColumn {
            column: PRICE_COLUMN.to_string(),
        })?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Keep only rows whose price lies inside `bounds`.
///
/// Rows with a missing or non-numeric price fail the predicate. The input frame
/// is left untouched and row order is preserved.
pub fn filter_price_outliers(df: &DataFrame, bounds: &PriceBounds) -> Result<FilteredFrame> {
    let prices = price_values(df)?;
    let keep: Vec<bool> = prices
        .iter()
        .map(|price| price.is_some_and(|value| bounds.contains(value)))
        .collect();
    let source_rows = keep
        .iter()
        .enumerate()
        .filter_map(|(idx, kept)| kept.then_some(idx))
        .collect();
    let mask = BooleanChunked::from_slice("price_in_bounds".into(), &keep);
    let data = df.filter(&mask)?;
    Ok(FilteredFrame { data, source_rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    fn frame(prices: &[Option<&str>]) -> DataFrame {
        let ids: Vec<String> = (0..prices.len()).map(|idx| idx.to_string()).collect();
        let columns: Vec<Column> = vec![
            Series::new("id".into(), ids).into_column(),
            Series::new(PRICE_COLUMN.into(), prices.to_vec()).into_column(),
        ];
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn keeps_rows_inside_closed_interval() {
        let df = frame(&[Some("9"), Some("10"), Some("55.5"), Some("100"), Some("101")]);
        let bounds = PriceBounds::new(10.0, 100.0).unwrap();

        let filtered = filter_price_outliers(&df, &bounds).unwrap();

        assert_eq!(filtered.data.height(), 3);
        assert_eq!(filtered.source_rows, vec![1, 2, 3]);
    }

    #[test]
    fn missing_and_non_numeric_prices_are_dropped() {
        let df = frame(&[None, Some("abc"), Some(""), Some("NaN"), Some("20")]);
        let bounds = PriceBounds::new(0.0, 100.0).unwrap();

        let filtered = filter_price_outliers(&df, &bounds).unwrap();

        assert_eq!(filtered.source_rows, vec![4]);
    }

    #[test]
    fn input_frame_is_not_mutated() {
        let df = frame(&[Some("1"), Some("500")]);
        let bounds = PriceBounds::new(0.0, 10.0).unwrap();

        let _ = filter_price_outliers(&df, &bounds).unwrap();

        assert_eq!(df.height(), 2);
    }

    #[test]
    fn missing_price_column_is_an_error() {
        let df = DataFrame::new(vec![Series::new("id".into(), vec!["1"]).into_column()]).unwrap();
        let bounds = PriceBounds::new(0.0, 10.0).unwrap();

        let err = filter_price_outliers(&df, &bounds).unwrap_err();

        assert!(matches!(err, TransformError::MissingColumn { .. }));
    }
}
