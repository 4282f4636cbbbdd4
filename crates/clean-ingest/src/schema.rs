//! The fixed listing schema the cleaning step operates on.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Numeric column used by the outlier filter.
pub const PRICE_COLUMN: &str = "price";

/// Date-like column normalized by the pipeline.
pub const LAST_REVIEW_COLUMN: &str = "last_review";

/// Columns that must be present in every input dataset.
pub const REQUIRED_COLUMNS: [&str; 2] = [PRICE_COLUMN, LAST_REVIEW_COLUMN];

/// Check a header for the required columns and for duplicate names.
///
/// Column names are matched exactly; the listing export is lower-case.
pub fn validate_columns<S: AsRef<str>>(columns: &[S], path: &Path) -> Result<()> {
    let mut seen = BTreeSet::new();
    for column in columns {
        let column = column.as_ref();
        if !seen.insert(column) {
            return Err(IngestError::DuplicateColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    for required in REQUIRED_COLUMNS {
        if !seen.contains(required) {
            return Err(IngestError::MissingColumn {
                column: required.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_listing_header() {
        let columns = ["id", "name", "price", "last_review", "reviews_per_month"];
        assert!(validate_columns(&columns, Path::new("sample.csv")).is_ok());
    }

    #[test]
    fn rejects_missing_last_review() {
        let columns = ["id", "price"];
        let err = validate_columns(&columns, Path::new("sample.csv")).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { column, .. } if column == "last_review"));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let columns = ["price", "last_review", "price"];
        let err = validate_columns(&columns, Path::new("sample.csv")).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateColumn { .. }));
    }
}
