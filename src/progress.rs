//! Progress bar for plan execution

use colored::Colorize;
use declarative::{ApplyResult, ExecuteSummary, ProgressCallback, StepStatus};
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui;

const TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Drives an indicatif bar from step status transitions
pub struct BarProgress {
    pb: ProgressBar,
    verbose: bool,
}

impl BarProgress {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { pb, verbose }
    }
}

/// One-character marker for a final step status
pub fn status_symbol(status: &StepStatus) -> String {
    match status {
        StepStatus::Applied(ApplyResult::NoChange) => "○".dimmed().to_string(),
        StepStatus::Applied(ApplyResult::Skipped { .. }) | StepStatus::Skipped { .. } => {
            "⊘".dimmed().to_string()
        }
        StepStatus::Applied(_) => "✓".green().to_string(),
        StepStatus::Failed { ignored: true, .. } => "!".yellow().to_string(),
        StepStatus::Failed { .. } => "✗".red().to_string(),
        StepStatus::Pending | StepStatus::Resolved => "·".dimmed().to_string(),
    }
}

impl ProgressCallback for BarProgress {
    fn on_plan_start(&mut self, total: usize) {
        self.pb.set_length(total as u64);
    }

    fn on_step_status(&mut self, index: usize, name: &str, status: &StepStatus) {
        if !status.is_terminal() {
            if matches!(status, StepStatus::Resolved) {
                self.pb.set_message(ui::truncate_path(name, 50));
            }
            return;
        }

        match status {
            StepStatus::Failed {
                error,
                ignored: true,
            } => self.pb.suspend(|| {
                println!(
                    "  {} [{}] {} {}",
                    status_symbol(status),
                    index + 1,
                    name,
                    format!("(ignored: {error})").yellow()
                );
            }),
            StepStatus::Skipped { .. } if !self.verbose => {}
            _ if self.verbose => self.pb.suspend(|| {
                println!("  {} [{}] {}", status_symbol(status), index + 1, name);
            }),
            _ => {}
        }
        self.pb.inc(1);
    }

    fn on_plan_complete(&mut self, _summary: &ExecuteSummary) {
        self.pb.finish_and_clear();
    }
}
