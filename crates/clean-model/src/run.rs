//! Run context for one execution of the cleaning step.
//!
//! The context is built once at the entry point and passed by reference to
//! every phase. The config snapshot is written once; lineage edges are
//! append-only; the state only moves forward (see [`StepState`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::ArtifactHandle;
use crate::error::{ModelError, Result};
use crate::lineage::{LineageDirection, LineageEdge};
use crate::state::StepState;

/// Job type recorded for runs of this step.
pub const DEFAULT_JOB_TYPE: &str = "basic_cleaning";

/// Configuration snapshot attached to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub input_artifact: String,
    pub output_artifact: String,
    pub output_type: String,
    pub output_description: String,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    id: Uuid,
    job_type: String,
    config: RunConfig,
    state: StepState,
    lineage: Vec<LineageEdge>,
    started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

impl RunContext {
    pub fn new(job_type: impl Into<String>, config: RunConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job_type.into(),
            config,
            state: StepState::Start,
            lineage: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn lineage(&self) -> &[LineageEdge] {
        &self.lineage
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Edges in the given direction, in recording order.
    pub fn edges(&self, direction: LineageDirection) -> impl Iterator<Item = &LineageEdge> {
        self.lineage
            .iter()
            .filter(move |edge| edge.direction == direction)
    }

    pub fn record_used(&mut self, handle: &ArtifactHandle) {
        self.lineage
            .push(LineageEdge::new(LineageDirection::Used, handle));
    }

    pub fn record_produced(&mut self, handle: &ArtifactHandle) {
        self.lineage
            .push(LineageEdge::new(LineageDirection::Produced, handle));
    }

    /// Move the step to `to`, rejecting out-of-order transitions.
    pub fn advance(&mut self, to: StepState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(ModelError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        if to.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Mark the run failed. A run that already finished is left untouched.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        self.failure = Some(reason.into());
        self.state = StepState::Failed;
        self.finished_at = Some(Utc::now());
    }
}
