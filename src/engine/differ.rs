//! Diff display

use colored::Colorize;
use declarative::{DiffSummary, ResourceState, StepDiff, group_by_type};

fn type_heading(step_type: &str) -> &str {
    match step_type {
        "command" => "Commands",
        "package" => "Packages",
        "directory" => "Directories",
        "file" => "Files",
        "kernel_module" => "Kernel modules",
        other => other,
    }
}

/// Short description of the transition a diff represents
pub fn describe_change(diff: &StepDiff) -> String {
    match (&diff.current, &diff.desired) {
        (ResourceState::Absent, ResourceState::Present { details }) => format!(
            "(missing){}",
            details
                .as_ref()
                .map(|d| format!(" → {d}"))
                .unwrap_or_default()
        ),
        (ResourceState::Modified { from, to }, _) => format!("{from} → {to}"),
        (ResourceState::Unknown, _) => "(runs every time)".to_string(),
        (ResourceState::Present { details: from }, ResourceState::Present { details: to }) => {
            format!(
                "{} → {}",
                from.as_deref().unwrap_or("current"),
                to.as_deref().unwrap_or("desired")
            )
        }
        _ => String::new(),
    }
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[StepDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Provisioning Diff".bold()
    );
    println!("│");

    for (step_type, type_diffs) in group_by_type(diffs) {
        println!("│ {}", type_heading(step_type).bold());

        for diff in type_diffs {
            let symbol = if diff.is_addition() {
                "+".green()
            } else if diff.is_unconditional() {
                "»".cyan()
            } else if diff.is_modification() {
                "~".yellow()
            } else {
                "?".dimmed()
            };

            let ignore_indicator = if diff.ignore_failure {
                " [may fail]".yellow().to_string()
            } else {
                String::new()
            };

            println!(
                "│   {} {:<40} {}{}",
                symbol,
                diff.target,
                describe_change(diff).dimmed(),
                ignore_indicator
            );
        }
        println!("│");
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} to create, {} to modify, {} commands)",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.unconditional.to_string().cyan()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(current: ResourceState, desired: ResourceState) -> StepDiff {
        StepDiff {
            index: 0,
            name: "curl".into(),
            step_type: "package".into(),
            target: "curl-minimal".into(),
            description: "Package curl-minimal".into(),
            current,
            desired,
            ignore_failure: false,
        }
    }

    #[test]
    fn test_describe_addition() {
        let d = diff(
            ResourceState::Absent,
            ResourceState::Present {
                details: Some("mode 0744".into()),
            },
        );
        assert_eq!(describe_change(&d), "(missing) → mode 0744");
    }

    #[test]
    fn test_describe_modification_and_unknown() {
        let d = diff(
            ResourceState::Modified {
                from: "mode 0644".into(),
                to: "mode 0744".into(),
            },
            ResourceState::Present { details: None },
        );
        assert_eq!(describe_change(&d), "mode 0644 → mode 0744");

        let d = diff(ResourceState::Unknown, ResourceState::Present { details: None });
        assert_eq!(describe_change(&d), "(runs every time)");
    }

    #[test]
    fn test_type_heading() {
        assert_eq!(type_heading("kernel_module"), "Kernel modules");
        assert_eq!(type_heading("other"), "other");
    }
}
