//! Listing dataset ingestion.
//!
//! Loads the raw listing CSV materialized by the artifact resolver into a
//! Polars DataFrame and checks it carries the columns the cleaning step needs.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use clean_ingest::read_dataset;
//!
//! let df = read_dataset(Path::new("sample.csv"))?;
//! println!("{} listings", df.height());
//! ```

mod error;
mod reader;
mod schema;
mod values;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use reader::{read_csv_header, read_dataset, validate_encoding};

// === Schema ===
pub use schema::{LAST_REVIEW_COLUMN, PRICE_COLUMN, REQUIRED_COLUMNS, validate_columns};

// === Value Helpers ===
pub use values::{
    any_to_f64, any_to_string, any_to_string_non_empty, date_from_days, days_from_date,
    format_numeric, parse_f64,
};
