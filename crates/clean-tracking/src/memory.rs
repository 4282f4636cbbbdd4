//! In-memory artifact store for tests and dry runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use clean_model::{ArtifactAlias, ArtifactDescriptor, ArtifactHandle, ArtifactRef, RunContext};

use crate::error::{PublishError, ResolutionError, RunRecordError};
use crate::hash::compute_digest;
use crate::store::{ArtifactStore, PublishPlan, ResolvedArtifact, plan_publish};

#[derive(Debug, Clone)]
struct StoredVersion {
    handle: ArtifactHandle,
    content: Vec<u8>,
}

/// Keeps every version in memory and materializes resolved inputs under
/// `materialize_dir`.
#[derive(Debug)]
pub struct InMemoryArtifactStore {
    materialize_dir: PathBuf,
    artifacts: BTreeMap<String, Vec<StoredVersion>>,
    runs: Vec<RunContext>,
}

impl InMemoryArtifactStore {
    pub fn new(materialize_dir: impl Into<PathBuf>) -> Self {
        Self {
            materialize_dir: materialize_dir.into(),
            artifacts: BTreeMap::new(),
            runs: Vec::new(),
        }
    }

    /// Add a version without an owning run.
    pub fn seed(
        &mut self,
        descriptor: &ArtifactDescriptor,
        file_name: &str,
        content: impl Into<Vec<u8>>,
    ) -> Result<ArtifactHandle, PublishError> {
        self.commit(descriptor, file_name, content.into(), None)
    }

    /// All versions of `name`, oldest first.
    pub fn versions(&self, name: &str) -> Vec<&ArtifactHandle> {
        self.artifacts
            .get(name)
            .map(|versions| versions.iter().map(|stored| &stored.handle).collect())
            .unwrap_or_default()
    }

    /// Stored bytes of one version.
    pub fn content(&self, name: &str, version: u32) -> Option<&[u8]> {
        self.artifacts
            .get(name)?
            .iter()
            .find(|stored| stored.handle.version == version)
            .map(|stored| stored.content.as_slice())
    }

    /// Runs passed to [`ArtifactStore::finish_run`], in call order.
    pub fn finished_runs(&self) -> &[RunContext] {
        &self.runs
    }

    fn commit(
        &mut self,
        descriptor: &ArtifactDescriptor,
        file_name: &str,
        content: Vec<u8>,
        created_by: Option<uuid::Uuid>,
    ) -> Result<ArtifactHandle, PublishError> {
        descriptor.validate()?;
        let digest = compute_digest(&content);
        let versions = self.artifacts.entry(descriptor.name.clone()).or_default();
        let latest = versions.last().map(|stored| &stored.handle);
        let version = match plan_publish(latest, descriptor, &digest)? {
            PublishPlan::Reuse(handle) => return Ok(handle),
            PublishPlan::Create(version) => version,
        };
        let handle = ArtifactHandle {
            name: descriptor.name.clone(),
            artifact_type: descriptor.artifact_type.clone(),
            version,
            description: descriptor.description.clone(),
            file_name: file_name.to_string(),
            digest,
            size: content.len() as u64,
            created_by,
            created_at: Utc::now(),
        };
        versions.push(StoredVersion {
            handle: handle.clone(),
            content,
        });
        debug!(artifact = %handle.qualified_name(), "stored artifact in memory");
        Ok(handle)
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn resolve(
        &mut self,
        run: &mut RunContext,
        reference: &ArtifactRef,
    ) -> Result<ResolvedArtifact, ResolutionError> {
        let versions = self
            .artifacts
            .get(&reference.name)
            .filter(|versions| !versions.is_empty())
            .ok_or_else(|| ResolutionError::ArtifactNotFound {
                name: reference.name.clone(),
            })?;
        let stored = match reference.alias {
            ArtifactAlias::Latest => versions.last(),
            ArtifactAlias::Version(version) => versions
                .iter()
                .find(|stored| stored.handle.version == version),
        };
        let Some(stored) = stored else {
            return Err(ResolutionError::VersionNotFound {
                name: reference.name.clone(),
                version: match reference.alias {
                    ArtifactAlias::Version(version) => version,
                    ArtifactAlias::Latest => 0,
                },
            });
        };

        let dir = self
            .materialize_dir
            .join(&stored.handle.name)
            .join(format!("v{}", stored.handle.version));
        let path = dir.join(&stored.handle.file_name);
        let unreadable = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ResolutionError::ContentUnreadable { path, source }
        };
        fs::create_dir_all(&dir).map_err(unreadable(&dir))?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(unreadable(&path)(e)),
        }
        fs::write(&path, &stored.content).map_err(unreadable(&path))?;
        let mut permissions = fs::metadata(&path)
            .map_err(unreadable(&path))?
            .permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).map_err(unreadable(&path))?;

        run.record_used(&stored.handle);
        Ok(ResolvedArtifact {
            handle: stored.handle.clone(),
            path,
        })
    }

    fn publish(
        &mut self,
        run: &mut RunContext,
        path: &Path,
        descriptor: &ArtifactDescriptor,
    ) -> Result<ArtifactHandle, PublishError> {
        let content = match fs::metadata(path) {
            Ok(meta) if meta.is_file() => fs::read(path).map_err(|e| PublishError::Io {
                operation: "read",
                path: path.to_path_buf(),
                source: e,
            })?,
            _ => {
                return Err(PublishError::SourceMissing {
                    path: path.to_path_buf(),
                });
            }
        };
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&descriptor.name)
            .to_string();
        let handle = self.commit(descriptor, &file_name, content, Some(run.id()))?;
        run.record_produced(&handle);
        Ok(handle)
    }

    fn finish_run(&mut self, run: &RunContext) -> Result<(), RunRecordError> {
        self.runs.retain(|finished| finished.id() != run.id());
        self.runs.push(run.clone());
        Ok(())
    }
}
