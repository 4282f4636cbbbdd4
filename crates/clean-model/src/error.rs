//! Error types for the cleaning model.

use thiserror::Error;

use crate::state::StepState;

/// Errors raised while building or mutating model values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact reference could not be parsed.
    #[error("invalid artifact reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// Artifact descriptor field failed validation.
    #[error("invalid artifact {field} '{value}': {reason}")]
    InvalidDescriptor {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Step state machine rejected a transition.
    #[error("illegal step transition {from} -> {to}")]
    InvalidTransition { from: StepState, to: StepState },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::InvalidTransition {
            from: StepState::Start,
            to: StepState::Published,
        };
        assert_eq!(err.to_string(), "illegal step transition start -> published");
    }
}
