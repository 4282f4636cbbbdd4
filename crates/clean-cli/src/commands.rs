use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use clean_cli::pipeline::{StepOptions, StepReport, run_step};
use clean_model::{ArtifactDescriptor, ArtifactHandle};
use clean_tracking::LocalArtifactStore;

use crate::cli::{ImportArgs, StepArgs};

pub fn run_clean(store_root: &Path, args: &StepArgs) -> Result<StepReport> {
    let config = args.run_config()?;
    let options = StepOptions {
        job_type: args.job_type.clone(),
        work_dir: args.work_dir.clone(),
    };
    let mut store = LocalArtifactStore::open(store_root);
    let report = run_step(&mut store, config, &options)?;
    Ok(report)
}

pub fn run_import(store_root: &Path, args: &ImportArgs) -> Result<ArtifactHandle> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("cannot derive an artifact name from {}", args.file.display()))?,
    };
    let descriptor = ArtifactDescriptor::new(name, &args.artifact_type, &args.description)
        .context("invalid artifact descriptor")?;
    let mut store = LocalArtifactStore::open(store_root);
    let handle = store
        .import(&args.file, &descriptor)
        .with_context(|| format!("import {}", args.file.display()))?;
    info!(artifact = %handle.qualified_name(), digest = %handle.digest, "imported artifact");
    Ok(handle)
}
