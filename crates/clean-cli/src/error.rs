//! Step-level error taxonomy.

use thiserror::Error;

use clean_ingest::IngestError;
use clean_model::ModelError;
use clean_output::OutputError;
use clean_tracking::{PublishError, ResolutionError};
use clean_transform::TransformError;

/// Every way a run of the step can fail. All variants are fatal.
#[derive(Debug, Error)]
pub enum StepError {
    /// Step arguments do not form a valid reference, descriptor, or transition.
    #[error("invalid step configuration: {0}")]
    Config(#[from] ModelError),

    #[error("cannot resolve input artifact: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("cannot load input dataset: {0}")]
    Ingest(#[from] IngestError),

    /// Bounds precondition or review-date parse failure.
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("cannot write cleaned dataset: {0}")]
    Output(#[from] OutputError),

    #[error("cannot publish output artifact: {0}")]
    Publish(#[from] PublishError),

    #[error("cannot create working directory: {0}")]
    WorkDir(#[source] std::io::Error),
}

impl StepError {
    /// Failure category recorded with the run and shown in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StepError::Config(_) => "ConfigError",
            StepError::Resolution(_) => "ResolutionError",
            StepError::Ingest(_) => "IngestError",
            StepError::Transform(TransformError::FilterPrecondition { .. }) => {
                "FilterPrecondition"
            }
            StepError::Transform(TransformError::Parse { .. }) => "ParseError",
            StepError::Transform(_) => "TransformError",
            StepError::Output(_) => "OutputError",
            StepError::Publish(_) => "PublishError",
            StepError::WorkDir(_) => "WorkDirError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_errors_map_to_taxonomy() {
        let precondition = StepError::from(TransformError::FilterPrecondition {
            min: 100.0,
            max: 10.0,
        });
        assert_eq!(precondition.kind(), "FilterPrecondition");

        let parse = StepError::from(TransformError::Parse {
            row: 3,
            column: "last_review".to_string(),
            value: "not-a-date".to_string(),
        });
        assert_eq!(parse.kind(), "ParseError");
        assert_eq!(
            parse.to_string(),
            "row 3: cannot parse last_review value 'not-a-date' as a date"
        );
    }

    #[test]
    fn resolution_errors_keep_their_message() {
        let err = StepError::from(ResolutionError::ArtifactNotFound {
            name: "sample.csv".to_string(),
        });
        assert_eq!(err.kind(), "ResolutionError");
        assert_eq!(
            err.to_string(),
            "cannot resolve input artifact: artifact 'sample.csv' not found"
        );
    }
}
