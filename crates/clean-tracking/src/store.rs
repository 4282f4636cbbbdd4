//! The artifact store interface consumed by the cleaning step.

use std::path::{Path, PathBuf};

use tracing::info;

use clean_model::{ArtifactDescriptor, ArtifactHandle, ArtifactRef, RunContext};

use crate::error::{PublishError, ResolutionError, RunRecordError};

/// A resolved input: the version that was picked and where its content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub handle: ArtifactHandle,
    /// Local, read-only materialized copy of the artifact's file.
    pub path: PathBuf,
}

/// Tracking service operations used by one run of the step.
///
/// Every operation that touches an artifact records the matching lineage edge
/// on `run`. Implementations never leave a half-published version behind.
pub trait ArtifactStore {
    /// Resolve `reference` to a local file and record a `used` edge.
    fn resolve(
        &mut self,
        run: &mut RunContext,
        reference: &ArtifactRef,
    ) -> Result<ResolvedArtifact, ResolutionError>;

    /// Publish `path` as a new version of `descriptor.name` and record a
    /// `produced` edge.
    fn publish(
        &mut self,
        run: &mut RunContext,
        path: &Path,
        descriptor: &ArtifactDescriptor,
    ) -> Result<ArtifactHandle, PublishError>;

    /// Persist the final state of `run`. Called on success and on failure.
    fn finish_run(&mut self, run: &RunContext) -> Result<(), RunRecordError>;
}

/// What a publish call should do given the current latest version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PublishPlan {
    /// Content matches the latest version; reuse it.
    Reuse(ArtifactHandle),
    /// Create this version number.
    Create(u32),
}

/// Decide between reusing the latest version and creating a new one.
///
/// A name belongs to exactly one artifact type; publishing under another type
/// is a collision.
///
/// Identical content reuses the latest version as recorded, description
/// included. A new description alone never creates a version.
pub(crate) fn plan_publish(
    latest: Option<&ArtifactHandle>,
    descriptor: &ArtifactDescriptor,
    digest: &str,
) -> Result<PublishPlan, PublishError> {
    let Some(latest) = latest else {
        return Ok(PublishPlan::Create(0));
    };
    if latest.artifact_type != descriptor.artifact_type {
        return Err(PublishError::TypeConflict {
            name: descriptor.name.clone(),
            existing: latest.artifact_type.clone(),
            requested: descriptor.artifact_type.clone(),
        });
    }
    if latest.digest == digest {
        if latest.description != descriptor.description {
            info!(
                artifact = %latest.qualified_name(),
                recorded = %latest.description,
                requested = %descriptor.description,
                "content unchanged, keeping recorded description"
            );
        }
        return Ok(PublishPlan::Reuse(latest.clone()));
    }
    Ok(PublishPlan::Create(latest.version + 1))
}
