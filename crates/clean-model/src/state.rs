//! Step lifecycle state machine.
//!
//! The step only ever moves forward:
//!
//! ```text
//! Start -> Resolved -> Transformed -> Published -> Done
//!   \________\_____________\______________\______-> Failed
//! ```
//!
//! `Done` and `Failed` are terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase reached by one execution of the cleaning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Start,
    Resolved,
    Transformed,
    Published,
    Done,
    Failed,
}

impl StepState {
    /// Returns true when no further transition is allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, StepState::Done | StepState::Failed)
    }

    /// The state that follows `self` on the success path.
    pub fn next(self) -> Option<StepState> {
        match self {
            StepState::Start => Some(StepState::Resolved),
            StepState::Resolved => Some(StepState::Transformed),
            StepState::Transformed => Some(StepState::Published),
            StepState::Published => Some(StepState::Done),
            StepState::Done | StepState::Failed => None,
        }
    }

    /// Whether moving from `self` to `to` is legal.
    pub fn can_transition_to(self, to: StepState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == StepState::Failed || self.next() == Some(to)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepState::Start => "start",
            StepState::Resolved => "resolved",
            StepState::Transformed => "transformed",
            StepState::Published => "published",
            StepState::Done => "done",
            StepState::Failed => "failed",
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
