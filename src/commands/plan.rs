use anyhow::Result;
use colored::Colorize;
use declarative::resources::format_mode;
use declarative::{ExecutionPlan, PlatformDescriptor, StepKind};
use serde::Serialize;

use crate::Context;
use crate::cli::PlanArgs;
use crate::config::ProvisionConfig;
use crate::ui;

/// One step as it resolves on a platform
#[derive(Debug, Serialize)]
pub struct PlannedStep {
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: &'static str,
    pub active: bool,
    /// Resolved target; `None` when the step is inactive
    pub target: Option<String>,
    pub ignore_failure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    platform: &'a PlatformDescriptor,
    kernel_release: &'a str,
    steps: Vec<PlannedStep>,
}

/// Resolve every step of a plan without touching the host
pub fn planned_steps(plan: &ExecutionPlan, platform: &PlatformDescriptor) -> Vec<PlannedStep> {
    plan.iter()
        .enumerate()
        .map(|(index, step)| {
            let active = step.is_active(platform);
            let (user, mode, source) = match &step.kind {
                StepKind::RunCommand { user } => (user.clone(), None, None),
                StepKind::EnsureDirectory { mode, .. } => (None, mode.map(format_mode), None),
                StepKind::PlaceFile { source, mode } => {
                    (None, mode.map(format_mode), Some(source.clone()))
                }
                StepKind::EnsurePackage | StepKind::LoadKernelModule => (None, None, None),
            };
            PlannedStep {
                index,
                name: step.name.clone(),
                step_type: step.step_type(),
                active,
                target: active.then(|| step.resolve_target(platform)),
                ignore_failure: step.failure.is_ignored(),
                user,
                mode,
                source,
            }
        })
        .collect()
}

pub fn run(_ctx: &Context, args: &PlanArgs) -> Result<()> {
    let config = ProvisionConfig::load()?;
    let resolved = super::resolve(&args.target, &config)?;
    let steps = planned_steps(&resolved.plan, &resolved.platform);

    if args.json {
        let output = PlanOutput {
            platform: &resolved.platform,
            kernel_release: &resolved.kernel_release,
            steps,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    ui::header(&format!(
        "Plan for {} (kernel {})",
        resolved.platform, resolved.kernel_release
    ));

    for step in &steps {
        let number = format!("{:>3}.", step.index + 1);
        let Some(target) = &step.target else {
            println!(
                "  {} {}",
                number.dimmed(),
                format!("{} {} (inactive)", step.step_type, step.name).dimmed()
            );
            continue;
        };

        let mut flags = Vec::new();
        if let Some(user) = &step.user {
            flags.push(format!("as {user}"));
        }
        if let Some(mode) = &step.mode {
            flags.push(format!("mode {mode}"));
        }
        if let Some(source) = &step.source {
            flags.push(format!("from {source}"));
        }
        if step.ignore_failure {
            flags.push("ignore failure".to_string());
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!("[{}]", flags.join(", "))
        };

        println!(
            "  {} {:<14} {} {}",
            number.bold(),
            step.step_type.cyan(),
            target,
            flags.dimmed()
        );
    }

    let active = steps.iter().filter(|s| s.active).count();
    println!();
    ui::dim(&format!(
        "{active} of {} steps active on {}",
        steps.len(),
        resolved.platform
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe;
    use declarative::PlatformFamily;

    #[test]
    fn test_planned_steps_on_ubuntu() {
        let plan = recipe::system_probe("5.15.0-91-generic");
        let platform = PlatformDescriptor::new(PlatformFamily::Ubuntu, "22.04");
        let steps = planned_steps(&plan, &platform);

        assert_eq!(steps.len(), plan.len());
        let yum = steps.iter().find(|s| s.name == "update yum repositories").unwrap();
        assert!(!yum.active);
        assert_eq!(yum.target, None);

        let headers = steps.iter().find(|s| s.name == "kernel headers").unwrap();
        assert_eq!(
            headers.target.as_deref(),
            Some("linux-headers-5.15.0-91-generic")
        );

        let gotestsum = steps.iter().find(|s| s.name == "/go/bin/gotestsum").unwrap();
        assert_eq!(gotestsum.mode.as_deref(), Some("0744"));
        assert_eq!(gotestsum.source.as_deref(), Some("gotestsum"));
    }

    #[test]
    fn test_json_shape() {
        let plan = recipe::system_probe("6.1.0");
        let platform = PlatformDescriptor::new(PlatformFamily::Redhat, "9");
        let steps = planned_steps(&plan, &platform);
        let json = serde_json::to_value(&steps[14]).unwrap();

        assert_eq!(json["name"], "disable firewalld on redhat");
        assert_eq!(json["type"], "command");
        assert_eq!(json["active"], true);
        assert_eq!(json["user"], "root");
        assert_eq!(json["ignore_failure"], true);
        assert!(json.get("mode").is_none());
    }
}
