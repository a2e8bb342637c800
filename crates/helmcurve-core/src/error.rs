//! Core error types.
//!
//! Every failure here is fatal for the task or model being processed. Callers
//! surface them to the user; nothing in the core retries or falls back.

use thiserror::Error;

/// Errors raised by the difficulty and accuracy computations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A response violates the benchmark data contract (reference or
    /// completion count is not exactly one).
    #[error("data integrity violation for instance {instance_id}: {message}")]
    DataIntegrity {
        instance_id: String,
        message: String,
    },

    /// An expected answer does not contain the marker its evaluator extracts.
    #[error("failed to parse expected answer {expected:?}: missing {marker}")]
    Parse { expected: String, marker: &'static str },

    /// A mean or fit was requested over zero elements.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The logistic fit did not converge or the data is degenerate.
    #[error("logistic fit failed: {0}")]
    Convergence(String),

    /// The caller passed an argument outside the supported range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CoreError {
    pub(crate) fn integrity(instance_id: &str, message: impl Into<String>) -> Self {
        CoreError::DataIntegrity {
            instance_id: instance_id.to_string(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, CoreError>;
