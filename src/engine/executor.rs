//! Execution engine - provision's executor with UI integration

use anyhow::Result;
use colored::Colorize;
use declarative::{
    ApplyReport, ExecuteOptions, ExecuteSummary, ExecutionPlan, Host, PlatformDescriptor,
    compute_diffs,
};

use super::differ::display_diff;
use crate::progress::BarProgress;
use crate::ui;

/// Options for a run (adds `yes` for confirmation skip)
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Skip confirmation prompts
    pub yes: bool,
    /// Verbose output
    pub verbose: bool,
    /// Hide the progress bar
    pub quiet: bool,
}

/// Show the diff, confirm, and apply the plan
///
/// Returns `None` when there was nothing to do or the user declined.
pub fn execute(
    plan: &ExecutionPlan,
    platform: &PlatformDescriptor,
    host: &dyn Host,
    opts: &RunOptions,
) -> Result<Option<ApplyReport>> {
    // 1. Compute and display what will change
    let diffs = compute_diffs(plan, platform, host);
    display_diff(&diffs);

    if diffs.is_empty() {
        return Ok(None);
    }

    // 2. Confirm (unless --yes)
    if !opts.yes && !opts.dry_run && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(None);
    }

    if opts.dry_run {
        println!();
        ui::info("Dry run - no changes will be made");
    }

    // 3. Apply in order
    println!();
    println!(
        "  {} Applying {} steps on {}...",
        "→".cyan(),
        plan.len(),
        platform
    );

    let mut progress = BarProgress::new(opts.verbose, opts.quiet);
    let exec_opts = ExecuteOptions {
        dry_run: opts.dry_run,
        verbose: opts.verbose,
    };
    let report = declarative::apply(plan, platform, host, &exec_opts, &mut progress)?;

    // 4. Summary
    print_summary(&report, opts.dry_run);

    Ok(Some(report))
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Lines of the final summary, without styling
pub fn summary_lines(summary: &ExecuteSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.created > 0 {
        lines.push(format!("{} steps created", summary.created));
    }
    if summary.modified > 0 {
        lines.push(format!("{} steps modified", summary.modified));
    }
    if summary.no_change > 0 {
        lines.push(format!("{} steps already in place", summary.no_change));
    }
    if summary.skipped > 0 {
        lines.push(format!("{} steps skipped", summary.skipped));
    }
    if summary.ignored > 0 {
        lines.push(format!("{} failures ignored", summary.ignored));
    }
    if summary.failed > 0 {
        lines.push(format!("{} steps failed", summary.failed));
    }
    lines
}

/// First line of the final summary, without styling
pub fn summary_headline(summary: &ExecuteSummary, dry_run: bool) -> &'static str {
    if dry_run {
        "Dry run complete, nothing was changed"
    } else if summary.ignored == 0 {
        "Plan applied successfully!"
    } else {
        "Plan applied with ignored failures"
    }
}

/// Print final summary
fn print_summary(report: &ApplyReport, dry_run: bool) {
    println!();
    let headline = summary_headline(&report.summary, dry_run);
    if dry_run {
        println!("  {} {headline}", "○".dimmed());
    } else if report.summary.ignored == 0 {
        println!("  {} {headline}", "✓".green().bold());
    } else {
        println!("  {} {headline}", "⚠".yellow().bold());
    }

    for line in summary_lines(&report.summary) {
        println!("    • {line}");
    }

    for step in report.ignored_failures() {
        ui::warn(&format!("'{}' failed and was ignored", step.name));
    }
}
