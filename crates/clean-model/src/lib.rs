//! Data model for the basic cleaning step.
//!
//! Defines the values that flow between the resolver, the transform pipeline,
//! and the publisher: artifact references and handles, lineage edges, and the
//! explicit run context that replaces process-wide tracking state.

pub mod artifact;
pub mod error;
pub mod lineage;
pub mod run;
pub mod state;

pub use artifact::{ArtifactAlias, ArtifactDescriptor, ArtifactHandle, ArtifactRef, LATEST_ALIAS};
pub use error::{ModelError, Result};
pub use lineage::{LineageDirection, LineageEdge};
pub use run::{DEFAULT_JOB_TYPE, RunConfig, RunContext};
pub use state::StepState;
