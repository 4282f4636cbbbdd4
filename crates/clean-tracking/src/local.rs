//! Filesystem-backed artifact store.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   artifacts/
//!     <name>/
//!       v0/
//!         manifest.json   ArtifactHandle as JSON
//!         <file>          content blob (read-only)
//!       v1/ ...
//!   runs/
//!     <run-id>.json       RunContext as JSON
//! ```
//!
//! A version directory only ever appears through an atomic rename of a fully
//! written staging directory, so readers never see a partial version.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use clean_model::{ArtifactAlias, ArtifactDescriptor, ArtifactHandle, ArtifactRef, RunContext};

use crate::error::{PublishError, ResolutionError, RunRecordError};
use crate::hash::compute_file_digest;
use crate::store::{ArtifactStore, PublishPlan, ResolvedArtifact, plan_publish};

pub const ARTIFACTS_DIR: &str = "artifacts";
pub const RUNS_DIR: &str = "runs";
pub const MANIFEST_FILE: &str = "manifest.json";
const STAGING_PREFIX: &str = ".staging-";

#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    /// Open a store rooted at `root`. Directories are created on first write.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_dir(&self, name: &str) -> PathBuf {
        self.root.join(ARTIFACTS_DIR).join(name)
    }

    fn version_dir(&self, name: &str, version: u32) -> PathBuf {
        self.artifact_dir(name).join(format!("v{version}"))
    }

    pub fn run_record_path(&self, run_id: Uuid) -> PathBuf {
        self.root.join(RUNS_DIR).join(format!("{run_id}.json"))
    }

    /// Committed versions of `name`, ascending. Unknown names have none.
    pub fn versions(&self, name: &str) -> io::Result<Vec<u32>> {
        let dir = self.artifact_dir(name);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(version) = file_name
                .to_str()
                .and_then(|name| name.strip_prefix('v'))
                .and_then(|digits| digits.parse::<u32>().ok())
            else {
                continue;
            };
            if entry.path().join(MANIFEST_FILE).is_file() {
                versions.push(version);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    /// Load the manifest of one committed version.
    pub fn load_manifest(&self, name: &str, version: u32) -> Result<ArtifactHandle, ResolutionError> {
        let path = self.version_dir(name, version).join(MANIFEST_FILE);
        let bytes = fs::read(&path).map_err(|e| ResolutionError::CorruptManifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let handle: ArtifactHandle =
            serde_json::from_slice(&bytes).map_err(|e| ResolutionError::CorruptManifest {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if handle.name != name || handle.version != version || !is_plain_file_name(&handle.file_name)
        {
            return Err(ResolutionError::CorruptManifest {
                path,
                message: "manifest does not describe this version".to_string(),
            });
        }
        Ok(handle)
    }

    /// Publish a file without an owning run (seeding raw data).
    pub fn import(
        &mut self,
        path: &Path,
        descriptor: &ArtifactDescriptor,
    ) -> Result<ArtifactHandle, PublishError> {
        self.commit(path, descriptor, None)
    }

    fn commit(
        &mut self,
        path: &Path,
        descriptor: &ArtifactDescriptor,
        created_by: Option<Uuid>,
    ) -> Result<ArtifactHandle, PublishError> {
        descriptor.validate()?;
        let is_file = fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false);
        if !is_file {
            return Err(PublishError::SourceMissing {
                path: path.to_path_buf(),
            });
        }
        let (digest, size) = compute_file_digest(path).map_err(|e| PublishError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })?;

        let name = descriptor.name.as_str();
        let catalog_error = |message: String| PublishError::Catalog {
            name: name.to_string(),
            message,
        };
        let versions = self.versions(name).map_err(|e| catalog_error(e.to_string()))?;
        let latest = versions
            .last()
            .map(|version| self.load_manifest(name, *version))
            .transpose()
            .map_err(|e| catalog_error(e.to_string()))?;

        let version = match plan_publish(latest.as_ref(), descriptor, &digest)? {
            PublishPlan::Reuse(handle) => {
                info!(
                    artifact = %handle.qualified_name(),
                    digest = %handle.digest,
                    "content unchanged, reusing latest version"
                );
                return Ok(handle);
            }
            PublishPlan::Create(version) => version,
        };

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| is_plain_file_name(name))
            .unwrap_or(name)
            .to_string();
        let handle = ArtifactHandle {
            name: name.to_string(),
            artifact_type: descriptor.artifact_type.clone(),
            version,
            description: descriptor.description.clone(),
            file_name,
            digest,
            size,
            created_by,
            created_at: Utc::now(),
        };

        let artifact_dir = self.artifact_dir(name);
        fs::create_dir_all(&artifact_dir).map_err(|e| PublishError::Io {
            operation: "create directory",
            path: artifact_dir.clone(),
            source: e,
        })?;
        let staging = artifact_dir.join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()));
        let target = self.version_dir(name, version);

        let committed = stage_version(&staging, path, &handle).and_then(|()| {
            fs::rename(&staging, &target).map_err(|e| PublishError::CommitFailed {
                staging: staging.clone(),
                target: target.clone(),
                source: e,
            })
        });
        if let Err(error) = committed {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %staging.display(), error = %cleanup, "failed to remove staging directory");
                }
            }
            return Err(error);
        }

        info!(
            artifact = %handle.qualified_name(),
            artifact_type = %handle.artifact_type,
            size = handle.size,
            digest = %handle.digest,
            "published artifact"
        );
        Ok(handle)
    }
}

/// Write blob and manifest into `staging`, both synced to disk.
fn stage_version(staging: &Path, source: &Path, handle: &ArtifactHandle) -> Result<(), PublishError> {
    let io_error = |operation: &'static str, path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| PublishError::Io {
            operation,
            path,
            source,
        }
    };

    fs::create_dir(staging).map_err(io_error("create directory", staging))?;

    let blob = staging.join(&handle.file_name);
    fs::copy(source, &blob).map_err(io_error("copy", &blob))?;
    File::open(&blob)
        .and_then(|file| file.sync_all())
        .map_err(io_error("sync", &blob))?;

    let manifest_path = staging.join(MANIFEST_FILE);
    let manifest = serde_json::to_vec_pretty(handle)
        .map_err(|e| io_error("serialize", &manifest_path)(io::Error::other(e)))?;
    let mut manifest_file =
        File::create(&manifest_path).map_err(io_error("create", &manifest_path))?;
    manifest_file
        .write_all(&manifest)
        .and_then(|()| manifest_file.sync_all())
        .map_err(io_error("write", &manifest_path))?;

    let mut permissions = fs::metadata(&blob)
        .map_err(io_error("stat", &blob))?
        .permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&blob, permissions).map_err(io_error("protect", &blob))?;
    Ok(())
}

/// A single path component that is safe to join under a version directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name != MANIFEST_FILE
        && !name.contains(['/', '\\'])
}

impl ArtifactStore for LocalArtifactStore {
    fn resolve(
        &mut self,
        run: &mut RunContext,
        reference: &ArtifactRef,
    ) -> Result<ResolvedArtifact, ResolutionError> {
        let name = reference.name.as_str();
        let versions = self
            .versions(name)
            .map_err(|e| ResolutionError::ContentUnreadable {
                path: self.artifact_dir(name),
                source: e,
            })?;
        let Some(&latest) = versions.last() else {
            return Err(ResolutionError::ArtifactNotFound {
                name: name.to_string(),
            });
        };
        let version = match reference.alias {
            ArtifactAlias::Latest => latest,
            ArtifactAlias::Version(version) if versions.contains(&version) => version,
            ArtifactAlias::Version(version) => {
                return Err(ResolutionError::VersionNotFound {
                    name: name.to_string(),
                    version,
                });
            }
        };

        let handle = self.load_manifest(name, version)?;
        let path = self.version_dir(name, version).join(&handle.file_name);
        let (digest, _) =
            compute_file_digest(&path).map_err(|e| ResolutionError::ContentUnreadable {
                path: path.clone(),
                source: e,
            })?;
        if digest != handle.digest {
            return Err(ResolutionError::DigestMismatch {
                name: handle.name.clone(),
                version,
                expected: handle.digest.clone(),
                actual: digest,
            });
        }

        run.record_used(&handle);
        debug!(
            artifact = %handle.qualified_name(),
            path = %path.display(),
            "materialized artifact"
        );
        Ok(ResolvedArtifact { handle, path })
    }

    fn publish(
        &mut self,
        run: &mut RunContext,
        path: &Path,
        descriptor: &ArtifactDescriptor,
    ) -> Result<ArtifactHandle, PublishError> {
        let handle = self.commit(path, descriptor, Some(run.id()))?;
        run.record_produced(&handle);
        Ok(handle)
    }

    fn finish_run(&mut self, run: &RunContext) -> Result<(), RunRecordError> {
        let path = self.run_record_path(run.id());
        let io_error = |operation: &'static str, path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| RunRecordError::Io {
                operation,
                path,
                source,
            }
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;
        }
        let bytes = serde_json::to_vec_pretty(run)?;
        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(io_error("create", &temp_path))?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(io_error("write", &temp_path))?;
        fs::rename(&temp_path, &path).map_err(io_error("commit", &path))?;
        debug!(run_id = %run.id(), state = %run.state(), path = %path.display(), "recorded run");
        Ok(())
    }
}
