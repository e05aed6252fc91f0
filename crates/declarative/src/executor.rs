//! Execution engine - applies a plan step by step
//!
//! Execution is sequential and blocking: each step's action completes
//! before the next step is looked at.

use crate::context::{ApplyContext, Host, NoProgress, ProgressCallback};
use crate::error::ProvisionError;
use crate::planner::ExecutionPlan;
use crate::platform::PlatformDescriptor;
use crate::types::{ExecuteOptions, ExecuteSummary, StepStatus};
use serde::{Deserialize, Serialize};

/// Final status of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// 0-based index in the plan
    pub index: usize,
    pub name: String,
    pub step_type: String,
    /// Resolved target, absent for inactive steps
    pub target: Option<String>,
    pub status: StepStatus,
}

/// Outcome of applying a whole plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub steps: Vec<StepReport>,
    pub summary: ExecuteSummary,
}

impl ApplyReport {
    fn record<P: ProgressCallback>(&mut self, progress: &mut P, report: StepReport) {
        progress.on_step_status(report.index, &report.name, &report.status);
        self.summary.add_status(&report.status);
        self.steps.push(report);
    }

    /// Steps whose failure was absorbed by their policy
    pub fn ignored_failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed { ignored: true, .. }))
    }
}

/// Apply a plan to a host
///
/// Each step is resolved for `platform`; inactive steps are skipped with no
/// side effect. A failing ignore-and-continue step is logged and recorded,
/// any other failure aborts the remaining plan and is returned. Nothing
/// is retried or rolled back.
pub fn apply<P: ProgressCallback>(
    plan: &ExecutionPlan,
    platform: &PlatformDescriptor,
    host: &dyn Host,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<ApplyReport, ProvisionError> {
    plan.validate()?;

    let mut report = ApplyReport::default();
    progress.on_plan_start(plan.len());

    for (index, step) in plan.iter().enumerate() {
        progress.on_step_status(index, &step.name, &StepStatus::Pending);

        let Some(resolved) = step.resolve(platform) else {
            log::debug!("Skipping '{}': {}", step.name, step.activation);
            report.record(
                progress,
                StepReport {
                    index,
                    name: step.name.clone(),
                    step_type: step.step_type().to_string(),
                    target: None,
                    status: StepStatus::Skipped {
                        reason: format!("not active on {platform}"),
                    },
                },
            );
            continue;
        };

        progress.on_step_status(index, &step.name, &StepStatus::Resolved);
        let target = resolved.resource.id();
        log::debug!("Applying '{}' ({})", step.name, resolved.resource.description());

        let mut ctx = ApplyContext::new(host, opts.dry_run, opts.verbose);
        let outcome = resolved.resource.apply(&mut ctx);

        let mut step_report = StepReport {
            index,
            name: step.name.clone(),
            step_type: step.step_type().to_string(),
            target: Some(target),
            status: StepStatus::Pending,
        };

        match outcome {
            Ok(result) => {
                step_report.status = StepStatus::Applied(result);
                report.record(progress, step_report);
            }
            Err(e) if resolved.failure.is_ignored() => {
                log::warn!("Ignoring failure of '{}': {:#}", step.name, e);
                step_report.status = StepStatus::Failed {
                    error: format!("{e:#}"),
                    ignored: true,
                };
                report.record(progress, step_report);
            }
            Err(e) => {
                log::error!("'{}' failed: {:#}", step.name, e);
                step_report.status = StepStatus::Failed {
                    error: format!("{e:#}"),
                    ignored: false,
                };
                report.record(progress, step_report);
                progress.on_plan_complete(&report.summary);
                return Err(ProvisionError::StepFailed {
                    position: index + 1,
                    step: step.name.clone(),
                    source: e,
                });
            }
        }
    }

    progress.on_plan_complete(&report.summary);
    Ok(report)
}

/// Simple execution without progress reporting
pub fn apply_simple(
    plan: &ExecutionPlan,
    platform: &PlatformDescriptor,
    host: &dyn Host,
) -> Result<ApplyReport, ProvisionError> {
    apply(plan, platform, host, &ExecuteOptions::default(), &mut NoProgress)
}
