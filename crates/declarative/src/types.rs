//! Core types for declarative provisioning

use serde::{Deserialize, Serialize};
use std::process::Output;

/// What to do when a step's action fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the remaining plan and surface the error
    #[default]
    FailFast,
    /// Record the failure and continue with the next step
    IgnoreAndContinue,
}

impl FailurePolicy {
    /// Whether failures under this policy are non-fatal
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::IgnoreAndContinue)
    }
}

/// Current or desired state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
    /// Resource exists but differs from desired
    Modified { from: String, to: String },
    /// State cannot be determined
    Unknown,
}

impl ResourceState {
    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Apply was skipped
    Skipped { reason: String },
}

/// Lifecycle of a single step during execution
///
/// Pending → Resolved → Applied | Skipped | Failed. There are no retries
/// and no rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// Not yet looked at
    Pending,
    /// Active for this platform, target resolved
    Resolved,
    /// Action ran to completion
    Applied(ApplyResult),
    /// Inactive for this platform
    Skipped { reason: String },
    /// Action failed; `ignored` is set when the plan continued anyway
    Failed { error: String, ignored: bool },
}

impl StepStatus {
    /// Whether the step reached a final state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Resolved)
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub no_change: usize,
    /// Inactive steps and dry-run steps
    pub skipped: usize,
    /// Failures absorbed by an ignore-and-continue policy
    pub ignored: usize,
    pub failed: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified
    }

    /// Check if execution was fully successful (no fatal failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of steps processed
    pub fn total(&self) -> usize {
        self.created + self.modified + self.no_change + self.skipped + self.ignored + self.failed
    }

    /// Add a final step status to the summary
    pub fn add_status(&mut self, status: &StepStatus) {
        match status {
            StepStatus::Applied(ApplyResult::NoChange) => self.no_change += 1,
            StepStatus::Applied(ApplyResult::Created) => self.created += 1,
            StepStatus::Applied(ApplyResult::Modified) => self.modified += 1,
            StepStatus::Applied(ApplyResult::Skipped { .. }) | StepStatus::Skipped { .. } => {
                self.skipped += 1;
            }
            StepStatus::Failed { ignored: true, .. } => self.ignored += 1,
            StepStatus::Failed { ignored: false, .. } => self.failed += 1,
            StepStatus::Pending | StepStatus::Resolved => {}
        }
    }
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Resolve and inspect every step but change nothing
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Output from a command run on the host
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
    /// Exit code, absent when the process was killed by a signal
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}
