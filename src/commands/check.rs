use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{ExecutionPlan, StepKind};
use std::collections::BTreeSet;

use crate::Context;
use crate::bundle::Bundle;
use crate::cli::TargetArgs;
use crate::config::ProvisionConfig;
use crate::ui;

/// Distinct artifacts a plan places, and those a fail-fast step needs
fn artifact_sources(plan: &ExecutionPlan) -> (BTreeSet<&str>, BTreeSet<&str>) {
    let mut all = BTreeSet::new();
    let mut required = BTreeSet::new();
    for step in plan.iter() {
        if let StepKind::PlaceFile { source, .. } = &step.kind {
            all.insert(source.as_str());
            if !step.failure.is_ignored() {
                required.insert(source.as_str());
            }
        }
    }
    (all, required)
}

pub fn run(ctx: &Context, args: &TargetArgs) -> Result<()> {
    let config = ProvisionConfig::load()?;
    let resolved = super::resolve(args, &config)?;
    let bundle = Bundle::new(&resolved.files_dir);

    ui::header(&format!("Bundle {}", bundle.root().display()));

    let active = resolved
        .plan
        .clone()
        .filter(|step| step.is_active(&resolved.platform));
    let (sources, required) = artifact_sources(&active);
    let sources: Vec<&str> = sources.into_iter().collect();

    let missing = bundle.missing(&sources);
    for source in &sources {
        if missing.contains(source) {
            println!("  {} {}", "✗".red(), source);
        } else {
            println!("  {} {}", "✓".green(), source);
        }
    }

    if ctx.verbose > 0 {
        let unused: Vec<String> = bundle
            .list()?
            .into_iter()
            .filter(|name| !sources.contains(&name.as_str()))
            .collect();
        if !unused.is_empty() {
            ui::section("Not referenced by the plan");
            for name in unused {
                ui::dim(&name);
            }
        }
    }

    println!();
    if !missing.is_empty() {
        if missing.iter().all(|source| !required.contains(source)) {
            ui::warn(&format!(
                "{} artifacts missing, all on steps that ignore failure",
                missing.len()
            ));
            return Ok(());
        }
        bail!("{} artifacts missing from {}", missing.len(), bundle.root().display());
    }

    ui::success(&format!("All {} artifacts present", sources.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe;
    use declarative::Step;

    #[test]
    fn test_recipe_artifacts() {
        let plan = recipe::system_probe("6.1.0");
        let (all, required) = artifact_sources(&plan);

        assert_eq!(all.len(), 7);
        assert!(required.contains("gotestsum"));
        assert!(!required.contains("job_url.txt"));
        assert!(!required.contains("tags.txt"));
    }

    #[test]
    fn test_repeated_artifact_counted_once() {
        let plan = ExecutionPlan::new()
            .step(Step::file("/tmp/junit/tags.txt", "tags.txt").ignore_failure())
            .step(Step::directory("/tmp/other"))
            .step(Step::file("/tmp/other/tags.txt", "tags.txt").ignore_failure());
        let (all, required) = artifact_sources(&plan);

        assert_eq!(all.into_iter().collect::<Vec<_>>(), vec!["tags.txt"]);
        assert!(required.is_empty());
    }

    #[test]
    fn test_artifact_required_by_any_fail_fast_step() {
        let plan = ExecutionPlan::new()
            .step(Step::file("/tmp/junit/tags.txt", "tags.txt").ignore_failure())
            .step(Step::file("/srv/tags.txt", "tags.txt"));
        let (_, required) = artifact_sources(&plan);

        assert!(required.contains("tags.txt"));
    }
}
