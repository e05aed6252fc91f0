//! Errors surfaced by plan validation and execution

use thiserror::Error;

/// Fatal provisioning errors
///
/// Failures of ignore-and-continue steps never become a `ProvisionError`;
/// they are recorded in the report instead.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A step declaration can never apply cleanly
    #[error("step {position} '{step}' is invalid: {reason}")]
    InvalidStep {
        /// 1-based position in the plan
        position: usize,
        step: String,
        reason: String,
    },

    /// A fail-fast step's action failed; the rest of the plan was not run
    #[error("step {position} '{step}' failed")]
    StepFailed {
        /// 1-based position in the plan
        position: usize,
        step: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ProvisionError {
    /// Name of the step the error is about
    pub fn step(&self) -> &str {
        match self {
            Self::InvalidStep { step, .. } | Self::StepFailed { step, .. } => step,
        }
    }
}
