//! Execution planner - ordered step plans

use crate::error::ProvisionError;
use crate::platform::PlatformDescriptor;
use crate::step::{Step, StepKind};
use std::path::Path;

/// An ordered sequence of steps
///
/// Order is significant: directories are declared before the files placed
/// into them, and packages before the commands that use them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    steps: Vec<Step>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Append a step, builder style
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Total number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps that run on a platform, with their 0-based plan index
    pub fn active_steps<'a>(
        &'a self,
        platform: &'a PlatformDescriptor,
    ) -> impl Iterator<Item = (usize, &'a Step)> + 'a {
        self.steps
            .iter()
            .enumerate()
            .filter(move |(_, step)| step.is_active(platform))
    }

    /// Bundled artifact names referenced by file steps, in plan order
    pub fn file_sources(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match &step.kind {
                StepKind::PlaceFile { source, .. } => Some(source.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Check every step can be applied before anything runs
    ///
    /// Names and targets must be non-empty, directory and file targets must
    /// be absolute on every platform, and file steps need a source.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        for (index, step) in self.steps.iter().enumerate() {
            let invalid = |reason: String| ProvisionError::InvalidStep {
                position: index + 1,
                step: step.name.clone(),
                reason,
            };

            if step.name.trim().is_empty() {
                return Err(invalid("empty name".to_string()));
            }

            let targets = std::iter::once(&step.target)
                .chain(step.overrides.entries().map(|(_, target)| target))
                .chain(step.overrides.default_value());

            for target in targets {
                if target.trim().is_empty() {
                    return Err(invalid("empty target".to_string()));
                }
                let needs_absolute = matches!(
                    step.kind,
                    StepKind::EnsureDirectory { .. } | StepKind::PlaceFile { .. }
                );
                if needs_absolute && !Path::new(target).is_absolute() {
                    return Err(invalid(format!("path '{target}' is not absolute")));
                }
            }

            if let StepKind::PlaceFile { source, .. } = &step.kind
                && source.trim().is_empty()
            {
                return Err(invalid("empty file source".to_string()));
            }
        }
        Ok(())
    }

    /// Filter plan to only include steps matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&Step) -> bool,
    {
        Self {
            steps: self.steps.into_iter().filter(|s| predicate(s)).collect(),
        }
    }

    /// Filter plan to only include steps matching a target pattern
    ///
    /// Target format: "type", "type.name" or "name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (step_type, name) = parse_target(t);
                self.filter(|s| matches_filter(s, step_type, name.as_deref()))
            }
        }
    }
}

impl FromIterator<Step> for ExecutionPlan {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Map a type name or common alias to the step type
fn step_type_alias(name: &str) -> Option<&'static str> {
    match name {
        "command" | "commands" => Some("command"),
        "package" | "packages" => Some("package"),
        "directory" | "directories" | "dirs" => Some("directory"),
        "file" | "files" => Some("file"),
        "kernel_module" | "modules" => Some("kernel_module"),
        _ => None,
    }
}

/// Parse a target string like "type.name" into (type, name)
///
/// Names may contain dots (`tags.txt`), so only a known type prefix splits.
fn parse_target(target: &str) -> (Option<&'static str>, Option<String>) {
    if let Some(step_type) = step_type_alias(target) {
        return (Some(step_type), None);
    }
    match target.split_once('.') {
        Some((prefix, name)) => match step_type_alias(prefix) {
            Some(step_type) => (Some(step_type), Some(name.to_string())),
            None => (None, Some(target.to_string())),
        },
        None => (None, Some(target.to_string())),
    }
}

/// Check if a step matches the filter criteria
fn matches_filter(step: &Step, step_type: Option<&str>, name: Option<&str>) -> bool {
    if let Some(t) = step_type
        && step.step_type() != t
    {
        return false;
    }

    if let Some(n) = name
        && !step.name.contains(n)
        && !step.target.contains(n)
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformFamily;

    fn sample() -> ExecutionPlan {
        ExecutionPlan::new()
            .step(Step::package("socat"))
            .step(Step::directory("/tmp/junit"))
            .step(Step::file("/tmp/junit/tags.txt", "tags.txt").mode(0o444))
            .step(Step::command("systemctl disable --now firewalld").only_on(&[PlatformFamily::Redhat]))
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("packages"), (Some("package"), None));
        assert_eq!(
            parse_target("package.curl"),
            (Some("package"), Some("curl".to_string()))
        );
        assert_eq!(parse_target("tags.txt"), (None, Some("tags.txt".to_string())));
    }

    #[test]
    fn test_filter_by_type_and_name() {
        let plan = sample().filter_by_target(Some("files"));
        assert_eq!(plan.len(), 1);

        let plan = sample().filter_by_target(Some("junit"));
        assert_eq!(plan.len(), 2);

        let plan = sample().filter_by_target(None);
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn test_active_steps_keep_plan_index() {
        let plan = sample();
        let debian = PlatformDescriptor::new(PlatformFamily::Debian, "12");
        let active: Vec<usize> = plan.active_steps(&debian).map(|(i, _)| i).collect();
        assert_eq!(active, vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
        assert_eq!(sample().file_sources(), vec!["tags.txt"]);
    }

    #[test]
    fn test_validate_rejects_relative_override() {
        let plan = ExecutionPlan::new()
            .step(Step::directory("/go/bin").on(PlatformFamily::Fedora, "go/bin"));
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidStep { position: 1, .. }));
        assert!(err.to_string().contains("not absolute"));
    }

    #[test]
    fn test_validate_rejects_empty_target() {
        let plan = ExecutionPlan::new()
            .step(Step::package("wget"))
            .step(Step::package("curl").otherwise(""));
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidStep { position: 2, .. }));
    }
}
