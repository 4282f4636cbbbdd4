//! Cleaning transforms for the listing dataset.
//!
//! Two deterministic steps over an in-memory frame:
//!
//! - **Outlier filter**: keep rows with `min_price <= price <= max_price`.
//! - **Date normalization**: coerce `last_review` into a calendar date column.
//!
//! Both are pure with respect to their input; [`clean`] returns a new frame.

pub mod bounds;
pub mod datetime;
pub mod error;
pub mod filter;
pub mod pipeline;

pub use bounds::PriceBounds;
pub use datetime::{format_review_date, normalize_review_dates, parse_review_date};
pub use error::{Result, TransformError};
pub use filter::{FilteredFrame, filter_price_outliers, price_values};
pub use pipeline::{CleanOutcome, clean};
