//! Inclusive price interval used by the outlier filter.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};

/// Closed interval `[min, max]` of acceptable listing prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    min: f64,
    max: f64,
}

impl PriceBounds {
    /// Build bounds, failing fast when `min > max` or either bound is NaN.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(TransformError::FilterPrecondition { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Inclusive on both ends; NaN is never contained.
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}
