//! Tracking error types.
//!
//! Resolution and publication fail with separate error types so the step can
//! report which side of the pipeline broke.

use std::path::PathBuf;
use thiserror::Error;

use clean_model::ModelError;

/// Input artifact could not be resolved to a readable local file.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Reference text is malformed.
    #[error(transparent)]
    InvalidReference(#[from] ModelError),

    /// No artifact with this name exists in the store.
    #[error("artifact '{name}' not found")]
    ArtifactNotFound { name: String },

    /// The artifact exists but not at the requested version.
    #[error("artifact '{name}' has no version v{version}")]
    VersionNotFound { name: String, version: u32 },

    /// Stored manifest is missing or malformed.
    #[error("corrupt manifest {path}: {message}")]
    CorruptManifest { path: PathBuf, message: String },

    /// The materialized file cannot be read.
    #[error("artifact content unreadable at {path}: {source}")]
    ContentUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The materialized file no longer matches the recorded digest.
    #[error("artifact {name}:v{version} content digest {actual} does not match recorded {expected}")]
    DigestMismatch {
        name: String,
        version: u32,
        expected: String,
        actual: String,
    },
}

/// Output artifact could not be created or recorded.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Descriptor name or type failed validation.
    #[error(transparent)]
    InvalidDescriptor(#[from] ModelError),

    /// The file to publish does not exist or is not a regular file.
    #[error("file to publish not found: {path}")]
    SourceMissing { path: PathBuf },

    /// The name is already claimed by an artifact of another type.
    #[error("artifact '{name}' already exists with type '{existing}', cannot publish as '{requested}'")]
    TypeConflict {
        name: String,
        existing: String,
        requested: String,
    },

    /// Existing versions of the name could not be inspected.
    #[error("cannot inspect existing artifact '{name}': {message}")]
    Catalog { name: String, message: String },

    /// File I/O error while staging the new version.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Staged version could not be committed into place.
    #[error("failed to commit {staging} as {target}: {source}")]
    CommitFailed {
        staging: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The run record could not be persisted.
#[derive(Debug, Error)]
pub enum RunRecordError {
    #[error("failed to {operation} run record {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize run record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PublishError::TypeConflict {
            name: "clean_sample.csv".to_string(),
            existing: "raw_data".to_string(),
            requested: "clean_sample".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "artifact 'clean_sample.csv' already exists with type 'raw_data', cannot publish as 'clean_sample'"
        );
    }
}
