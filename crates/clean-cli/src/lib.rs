//! Library components of the `basic-cleaning` step.

pub mod argfile;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use error::StepError;
pub use pipeline::{StepOptions, StepReport, run_step};
