//! Lineage edges between a run and the artifacts it touches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactHandle;

/// Direction of a lineage edge relative to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineageDirection {
    /// The run consumed the artifact.
    Used,
    /// The run produced the artifact.
    Produced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEdge {
    pub direction: LineageDirection,
    pub artifact: String,
    pub version: u32,
    pub digest: String,
    pub recorded_at: DateTime<Utc>,
}

impl LineageEdge {
    pub fn new(direction: LineageDirection, handle: &ArtifactHandle) -> Self {
        Self {
            direction,
            artifact: handle.name.clone(),
            version: handle.version,
            digest: handle.digest.clone(),
            recorded_at: Utc::now(),
        }
    }
}
