//! Diff computation for plans

use crate::context::Host;
use crate::planner::ExecutionPlan;
use crate::platform::PlatformDescriptor;
use crate::types::ResourceState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A step whose current state differs from its desired state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDiff {
    /// 0-based index in the plan
    pub index: usize,
    pub name: String,
    pub step_type: String,
    /// Resolved target
    pub target: String,
    /// Human-readable description
    pub description: String,
    pub current: ResourceState,
    pub desired: ResourceState,
    /// Failures of this step will not abort the plan
    pub ignore_failure: bool,
}

impl StepDiff {
    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    /// Check if this diff represents a modification
    pub fn is_modification(&self) -> bool {
        matches!(self.current, ResourceState::Modified { .. })
    }

    /// State could not be determined; the step runs unconditionally
    pub fn is_unconditional(&self) -> bool {
        matches!(self.current, ResourceState::Unknown)
    }
}

/// Compute diffs for the active steps of a plan
///
/// State queries that fail (a missing bundle artifact, a package manager
/// that cannot be reached) are reported as `Unknown` rather than dropped.
pub fn compute_diffs(
    plan: &ExecutionPlan,
    platform: &PlatformDescriptor,
    host: &dyn Host,
) -> Vec<StepDiff> {
    let mut diffs = Vec::new();

    for (index, step) in plan.iter().enumerate() {
        let Some(resolved) = step.resolve(platform) else {
            continue;
        };
        let resource = resolved.resource.as_ref();

        let current = match resource.needs_apply(host) {
            Ok(false) => continue,
            Ok(true) => resource.current_state(host).unwrap_or(ResourceState::Unknown),
            Err(e) => {
                log::debug!("Could not query state of '{}': {:#}", step.name, e);
                ResourceState::Unknown
            }
        };

        diffs.push(StepDiff {
            index,
            name: step.name.clone(),
            step_type: resource.resource_type().to_string(),
            target: resource.id(),
            description: resource.description(),
            current,
            desired: resource.desired_state(),
            ignore_failure: resolved.failure.is_ignored(),
        });
    }

    diffs
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources to change
    pub modifications: usize,
    /// Commands and steps whose state is unknown
    pub unconditional: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[StepDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_unconditional() {
                summary.unconditional += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.unconditional
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by step type, in type-name order
pub fn group_by_type(diffs: &[StepDiff]) -> BTreeMap<&str, Vec<&StepDiff>> {
    let mut groups: BTreeMap<&str, Vec<&StepDiff>> = BTreeMap::new();
    for diff in diffs {
        groups.entry(diff.step_type.as_str()).or_default().push(diff);
    }
    groups
}
