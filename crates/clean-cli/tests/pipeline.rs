//! Integration tests for one run of the cleaning step.

use std::fs;
use std::path::Path;

use clean_cli::{StepError, StepOptions, run_step};
use clean_model::{
    ArtifactDescriptor, ArtifactRef, LineageDirection, RunConfig, StepState,
};
use clean_tracking::{ArtifactStore, InMemoryArtifactStore, LocalArtifactStore};
use clean_transform::TransformError;
use tempfile::tempdir;

const LISTINGS: &str = "\
id,name,price,last_review
1,Cozy room,10,2020-01-05
2,Penthouse,9999,2020-02-01
3,\"Loft, Brooklyn\",100,
4,Studio,55.50,2019-07-08T00:00:00
";

fn config(min_price: f64, max_price: f64) -> RunConfig {
    RunConfig {
        input_artifact: "sample.csv:latest".to_string(),
        output_artifact: "clean_sample.csv".to_string(),
        output_type: "clean_sample".to_string(),
        output_description: "Data with outliers removed".to_string(),
        min_price,
        max_price,
    }
}

fn seeded_store(dir: &Path, content: &str) -> InMemoryArtifactStore {
    let mut store = InMemoryArtifactStore::new(dir.join("materialized"));
    let descriptor = ArtifactDescriptor::new("sample.csv", "raw_data", "Raw listings").unwrap();
    store
        .seed(&descriptor, "sample.csv", content.as_bytes())
        .unwrap();
    store
}

fn published_csv(store: &InMemoryArtifactStore, version: u32) -> String {
    let bytes = store.content("clean_sample.csv", version).unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[test]
fn cleaned_output_snapshot() {
    let dir = tempdir().unwrap();
    let mut store = seeded_store(dir.path(), LISTINGS);

    let report = run_step(&mut store, config(10.0, 100.0), &StepOptions::default()).unwrap();

    assert_eq!(report.input_rows, 4);
    assert_eq!(report.output_rows, 3);
    assert_eq!(report.dropped_rows(), 1);
    assert_eq!(report.output.version, 0);
    assert!(report.output_path.is_none());
    insta::assert_snapshot!(published_csv(&store, 0));
}

#[test]
fn run_records_lineage_and_finishes_done() {
    let dir = tempdir().unwrap();
    let mut store = seeded_store(dir.path(), LISTINGS);

    let report = run_step(&mut store, config(10.0, 100.0), &StepOptions::default()).unwrap();

    let runs = store.finished_runs();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert_eq!(run.id(), report.run_id);
    assert_eq!(run.state(), StepState::Done);
    assert!(run.finished_at().is_some());
    assert_eq!(run.job_type(), "basic_cleaning");

    let used: Vec<_> = run.edges(LineageDirection::Used).collect();
    let produced: Vec<_> = run.edges(LineageDirection::Produced).collect();
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].artifact, "sample.csv");
    assert_eq!(produced.len(), 1);
    assert_eq!(produced[0].artifact, "clean_sample.csv");
    assert_eq!(produced[0].digest, report.output.digest);
    assert_eq!(report.output.created_by, Some(run.id()));
}

#[test]
fn unparseable_review_date_fails_without_publishing() {
    let dir = tempdir().unwrap();
    let content = "price,last_review\n10,2020-01-05\n9999,2020-02-01\n50,not-a-date\n";
    let mut store = seeded_store(dir.path(), content);

    let err = run_step(&mut store, config(10.0, 100.0), &StepOptions::default()).unwrap_err();

    match &err {
        StepError::Transform(TransformError::Parse { row, value, .. }) => {
            assert_eq!(*row, 3);
            assert_eq!(value, "not-a-date");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    assert_eq!(err.kind(), "ParseError");
    assert!(store.versions("clean_sample.csv").is_empty());

    let run = &store.finished_runs()[0];
    assert_eq!(run.state(), StepState::Failed);
    assert!(run.failure().unwrap().contains("not-a-date"));
    assert_eq!(run.edges(LineageDirection::Used).count(), 1);
    assert_eq!(run.edges(LineageDirection::Produced).count(), 0);
}

#[test]
fn inverted_bounds_fail_before_resolving() {
    let dir = tempdir().unwrap();
    let mut store = seeded_store(dir.path(), LISTINGS);

    let err = run_step(&mut store, config(100.0, 10.0), &StepOptions::default()).unwrap_err();

    assert_eq!(err.kind(), "FilterPrecondition");
    let run = &store.finished_runs()[0];
    assert_eq!(run.state(), StepState::Failed);
    assert!(run.lineage().is_empty());
    assert!(store.versions("clean_sample.csv").is_empty());
}

#[test]
fn header_only_input_publishes_header_only_output() {
    let dir = tempdir().unwrap();
    let mut store = seeded_store(dir.path(), "id,price,last_review\n");

    let report = run_step(&mut store, config(10.0, 350.0), &StepOptions::default()).unwrap();

    assert_eq!(report.input_rows, 0);
    assert_eq!(report.output_rows, 0);
    assert_eq!(published_csv(&store, 0), "id,price,last_review\n");
}

#[test]
fn missing_input_artifact_is_a_resolution_error() {
    let dir = tempdir().unwrap();
    let mut store = InMemoryArtifactStore::new(dir.path());

    let err = run_step(&mut store, config(10.0, 350.0), &StepOptions::default()).unwrap_err();

    assert_eq!(err.kind(), "ResolutionError");
    assert_eq!(store.finished_runs()[0].state(), StepState::Failed);
}

#[test]
fn invalid_output_name_is_rejected_up_front() {
    let dir = tempdir().unwrap();
    let mut store = seeded_store(dir.path(), LISTINGS);
    let mut bad = config(10.0, 100.0);
    bad.output_artifact = "../escape.csv".to_string();

    let err = run_step(&mut store, bad, &StepOptions::default()).unwrap_err();

    assert_eq!(err.kind(), "ConfigError");
    assert!(store.finished_runs()[0].lineage().is_empty());
}

#[test]
fn rerun_is_byte_identical_and_reuses_version() {
    let dir = tempdir().unwrap();
    let mut store = seeded_store(dir.path(), LISTINGS);

    let first = run_step(&mut store, config(10.0, 100.0), &StepOptions::default()).unwrap();
    let second = run_step(&mut store, config(10.0, 100.0), &StepOptions::default()).unwrap();

    assert_eq!(first.output.digest, second.output.digest);
    assert_eq!(second.output.version, first.output.version);
    assert_eq!(store.versions("clean_sample.csv").len(), 1);
    assert_eq!(store.finished_runs().len(), 2);
}

#[test]
fn work_dir_keeps_cleaned_file() {
    let dir = tempdir().unwrap();
    let mut store = seeded_store(dir.path(), LISTINGS);
    let options = StepOptions {
        work_dir: Some(dir.path().join("work")),
        ..StepOptions::default()
    };

    let report = run_step(&mut store, config(10.0, 100.0), &options).unwrap();

    let path = report.output_path.unwrap();
    assert_eq!(path, dir.path().join("work").join("clean_sample.csv"));
    assert_eq!(fs::read_to_string(path).unwrap(), published_csv(&store, 0));
}

#[test]
fn local_store_end_to_end() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("sample.csv");
    fs::write(&raw, LISTINGS).unwrap();
    let root = dir.path().join("store");
    let mut store = LocalArtifactStore::open(&root);
    let descriptor = ArtifactDescriptor::new("sample.csv", "raw_data", "Raw listings").unwrap();
    store.import(&raw, &descriptor).unwrap();

    let report = run_step(&mut store, config(10.0, 100.0), &StepOptions::default()).unwrap();

    assert!(root.join("runs").join(format!("{}.json", report.run_id)).is_file());
    let resolved = store
        .resolve(
            &mut clean_model::RunContext::new("check", config(10.0, 100.0)),
            &ArtifactRef::latest("clean_sample.csv"),
        )
        .unwrap();
    let text = fs::read_to_string(resolved.path).unwrap();
    assert!(text.starts_with("id,name,price,last_review\n1,Cozy room,10,2020-01-05\n"));
}
