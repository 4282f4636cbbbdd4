//! Tests for the run context and lineage bookkeeping.

use chrono::Utc;
use clean_model::{
    ArtifactHandle, DEFAULT_JOB_TYPE, LineageDirection, ModelError, RunConfig, RunContext,
    StepState,
};

fn config() -> RunConfig {
    RunConfig {
        input_artifact: "sample.csv:latest".to_string(),
        output_artifact: "clean_sample.csv".to_string(),
        output_type: "clean_sample".to_string(),
        output_description: "Data with outliers and null values removed".to_string(),
        min_price: 10.0,
        max_price: 350.0,
    }
}

fn handle(name: &str, version: u32) -> ArtifactHandle {
    ArtifactHandle {
        name: name.to_string(),
        artifact_type: "raw_data".to_string(),
        version,
        description: String::new(),
        file_name: name.to_string(),
        digest: "abc123".to_string(),
        size: 42,
        created_by: None,
        created_at: Utc::now(),
    }
}

#[test]
fn new_run_starts_clean() {
    let run = RunContext::new(DEFAULT_JOB_TYPE, config());
    assert_eq!(run.state(), StepState::Start);
    assert_eq!(run.job_type(), "basic_cleaning");
    assert!(run.lineage().is_empty());
    assert!(run.finished_at().is_none());
}

#[test]
fn lineage_edges_are_append_only_and_ordered() {
    let mut run = RunContext::new(DEFAULT_JOB_TYPE, config());
    run.record_used(&handle("sample.csv", 0));
    run.record_produced(&handle("clean_sample.csv", 3));

    let used: Vec<_> = run.edges(LineageDirection::Used).collect();
    let produced: Vec<_> = run.edges(LineageDirection::Produced).collect();
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].artifact, "sample.csv");
    assert_eq!(produced.len(), 1);
    assert_eq!(produced[0].version, 3);
    assert_eq!(run.lineage()[0].direction, LineageDirection::Used);
}

#[test]
fn advance_walks_the_success_path() {
    let mut run = RunContext::new(DEFAULT_JOB_TYPE, config());
    for state in [
        StepState::Resolved,
        StepState::Transformed,
        StepState::Published,
        StepState::Done,
    ] {
        run.advance(state).unwrap();
    }
    assert_eq!(run.state(), StepState::Done);
    assert!(run.finished_at().is_some());
}

#[test]
fn advance_rejects_skipped_phase() {
    let mut run = RunContext::new(DEFAULT_JOB_TYPE, config());
    let err = run.advance(StepState::Published).unwrap_err();
    assert!(matches!(
        err,
        ModelError::InvalidTransition {
            from: StepState::Start,
            to: StepState::Published
        }
    ));
    assert_eq!(run.state(), StepState::Start);
}

#[test]
fn fail_records_reason_once() {
    let mut run = RunContext::new(DEFAULT_JOB_TYPE, config());
    run.advance(StepState::Resolved).unwrap();
    run.fail("bad date");
    run.fail("second failure is ignored");
    assert_eq!(run.state(), StepState::Failed);
    assert_eq!(run.failure(), Some("bad date"));
}

#[test]
fn run_serializes_with_config_snapshot() {
    let mut run = RunContext::new(DEFAULT_JOB_TYPE, config());
    run.record_used(&handle("sample.csv", 1));
    let json = serde_json::to_value(&run).expect("serialize run");
    assert_eq!(json["job_type"], "basic_cleaning");
    assert_eq!(json["state"], "start");
    assert_eq!(json["config"]["min_price"], 10.0);
    assert_eq!(json["lineage"][0]["direction"], "used");
    assert!(json.get("failure").is_none());
}
