//! Error types for the cleaning transforms.

use thiserror::Error;

/// Errors raised by the transform pipeline. All of them are fatal to the step.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Caller supplied bounds that cannot describe a closed interval.
    #[error("invalid price bounds: min_price {min} must not exceed max_price {max}")]
    FilterPrecondition { min: f64, max: f64 },

    /// A value failed its required type coercion.
    #[error("row {row}: cannot parse {column} value '{value}' as a date")]
    Parse {
        /// 1-based data row in the input file (header excluded).
        row: usize,
        column: String,
        value: String,
    },

    /// A column the transform operates on is absent.
    #[error("column '{column}' not found")]
    MissingColumn { column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
