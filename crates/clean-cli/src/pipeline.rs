//! One run of the basic cleaning step.
//!
//! Resolve the input artifact, clean it, write the result to the working
//! directory, and publish it. The run context is finished on every path, so
//! a failed run is recorded with its reason and no output artifact.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use clean_ingest::read_dataset;
use clean_model::{
    ArtifactDescriptor, ArtifactHandle, ArtifactRef, DEFAULT_JOB_TYPE, RunConfig, RunContext,
    StepState,
};
use clean_output::write_dataset_csv;
use clean_tracking::ArtifactStore;
use clean_transform::{PriceBounds, clean};

use crate::error::StepError;

/// Run-level options that are not part of the step's own arguments.
#[derive(Debug, Clone)]
pub struct StepOptions {
    pub job_type: String,
    /// Keep the cleaned file here instead of a temporary directory.
    pub work_dir: Option<PathBuf>,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            job_type: DEFAULT_JOB_TYPE.to_string(),
            work_dir: None,
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub run_id: Uuid,
    pub input: ArtifactHandle,
    pub output: ArtifactHandle,
    pub input_rows: usize,
    pub output_rows: usize,
    /// Location of the cleaned file when a work dir was given.
    pub output_path: Option<PathBuf>,
    pub duration: Duration,
}

impl StepReport {
    pub fn dropped_rows(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

/// Where the cleaned file is written before publication.
enum WorkDir {
    Kept(PathBuf),
    Temp(TempDir),
}

impl WorkDir {
    fn prepare(requested: Option<&Path>) -> Result<Self, StepError> {
        match requested {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(StepError::WorkDir)?;
                Ok(WorkDir::Kept(dir.to_path_buf()))
            }
            None => tempfile::Builder::new()
                .prefix("basic-cleaning-")
                .tempdir()
                .map(WorkDir::Temp)
                .map_err(StepError::WorkDir),
        }
    }

    fn path(&self) -> &Path {
        match self {
            WorkDir::Kept(path) => path,
            WorkDir::Temp(dir) => dir.path(),
        }
    }

    fn is_kept(&self) -> bool {
        matches!(self, WorkDir::Kept(_))
    }
}

/// Execute the step against `store`.
///
/// The run is always handed to [`ArtifactStore::finish_run`], whether the
/// step succeeded or not.
pub fn run_step<S: ArtifactStore>(
    store: &mut S,
    config: RunConfig,
    options: &StepOptions,
) -> Result<StepReport, StepError> {
    let start = Instant::now();
    let mut run = RunContext::new(options.job_type.clone(), config);
    let span = info_span!("run", run_id = %run.id(), job_type = %run.job_type());
    let _guard = span.enter();
    info!(
        input = %run.config().input_artifact,
        output = %run.config().output_artifact,
        min_price = run.config().min_price,
        max_price = run.config().max_price,
        "starting run"
    );

    let result = execute(store, &mut run, options, start);
    if let Err(err) = &result {
        run.fail(err.to_string());
        error!(kind = err.kind(), error = %err, "run failed");
    }
    if let Err(record_error) = store.finish_run(&run) {
        warn!(error = %record_error, "failed to record run");
    }
    result
}

fn execute<S: ArtifactStore>(
    store: &mut S,
    run: &mut RunContext,
    options: &StepOptions,
    start: Instant,
) -> Result<StepReport, StepError> {
    let config = run.config().clone();
    let bounds = PriceBounds::new(config.min_price, config.max_price)?;
    let reference = ArtifactRef::parse(&config.input_artifact)?;
    let descriptor = ArtifactDescriptor::new(
        &config.output_artifact,
        &config.output_type,
        &config.output_description,
    )?;

    let resolved = info_span!("resolve", artifact = %reference).in_scope(|| {
        let resolve_start = Instant::now();
        let resolved = store.resolve(run, &reference)?;
        info!(
            version = %resolved.handle.qualified_name(),
            size = resolved.handle.size,
            duration_ms = resolve_start.elapsed().as_millis(),
            "resolved input artifact"
        );
        Ok::<_, StepError>(resolved)
    })?;
    run.advance(StepState::Resolved)?;

    let work_dir = WorkDir::prepare(options.work_dir.as_deref())?;
    let output_path = work_dir.path().join(&descriptor.name);
    let outcome = info_span!("transform").in_scope(|| {
        let transform_start = Instant::now();
        let df = read_dataset(&resolved.path)?;
        let outcome = clean(&df, &bounds)?;
        let written = write_dataset_csv(&outcome.data, &output_path)?;
        info!(
            input_rows = outcome.input_rows,
            output_rows = outcome.output_rows,
            dropped_rows = outcome.dropped_rows(),
            bytes = written.bytes,
            duration_ms = transform_start.elapsed().as_millis(),
            "cleaned dataset"
        );
        Ok::<_, StepError>(outcome)
    })?;
    run.advance(StepState::Transformed)?;

    let output = info_span!("publish", artifact = %descriptor.name).in_scope(|| {
        let handle = store.publish(run, &output_path, &descriptor)?;
        info!(
            version = %handle.qualified_name(),
            digest = %handle.digest,
            "published output artifact"
        );
        Ok::<_, StepError>(handle)
    })?;
    run.advance(StepState::Published)?;
    run.advance(StepState::Done)?;

    let duration = start.elapsed();
    info!(duration_ms = duration.as_millis(), "run finished");
    Ok(StepReport {
        run_id: run.id(),
        input: resolved.handle,
        output,
        input_rows: outcome.input_rows,
        output_rows: outcome.output_rows,
        output_path: work_dir.is_kept().then_some(output_path),
        duration,
    })
}
