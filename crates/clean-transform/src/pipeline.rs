//! The cleaning transform: outlier filter followed by date normalization.

use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::bounds::PriceBounds;
use crate::datetime::normalize_review_dates;
use crate::error::Result;
use crate::filter::filter_price_outliers;

/// Result of a cleaning pass.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub data: DataFrame,
    pub input_rows: usize,
    pub output_rows: usize,
}

impl CleanOutcome {
    pub fn dropped_rows(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

/// Clean a listing frame.
///
/// 1. Drop rows whose `price` is outside `bounds` (or not a number).
/// 2. Convert every remaining `last_review` to a calendar date.
///
/// Any unparseable review date fails the whole pass. The input frame is not
/// modified.
pub fn clean(df: &DataFrame, bounds: &PriceBounds) -> Result<CleanOutcome> {
    let start = Instant::now();
    let input_rows = df.height();

    let filtered = filter_price_outliers(df, bounds)?;
    info!(
        min_price = bounds.min(),
        max_price = bounds.max(),
        input_rows,
        kept_rows = filtered.data.height(),
        "removed price outliers"
    );

    let data = normalize_review_dates(&filtered.data, &filtered.source_rows)?;
    let output_rows = data.height();
    debug!(
        output_rows,
        duration_ms = start.elapsed().as_millis(),
        "normalized review dates"
    );

    Ok(CleanOutcome {
        data,
        input_rows,
        output_rows,
    })
}
