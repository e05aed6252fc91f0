//! Step declarations and their resolution against a platform

use crate::platform::{PlatformDescriptor, PlatformFamily};
use crate::resolve::{Activation, ResolutionTable, Selector};
use crate::resource::BoxedResource;
use crate::resources::{Directory, KernelModule, ManagedFile, Package, ShellCommand};
use crate::types::FailurePolicy;
use serde::{Deserialize, Serialize};

/// What a step does, with the data specific to each action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    RunCommand { user: Option<String> },
    EnsurePackage,
    EnsureDirectory { recursive: bool, mode: Option<u32> },
    PlaceFile { source: String, mode: Option<u32> },
    LoadKernelModule,
}

impl StepKind {
    /// Type name shared with the resource the step resolves to
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunCommand { .. } => "command",
            Self::EnsurePackage => "package",
            Self::EnsureDirectory { .. } => "directory",
            Self::PlaceFile { .. } => "file",
            Self::LoadKernelModule => "kernel_module",
        }
    }
}

/// One declaration in an execution plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Display name, also used for filtering and error reports
    pub name: String,
    pub kind: StepKind,
    /// Literal target used when no override matches
    pub target: String,
    pub overrides: ResolutionTable<String>,
    pub failure: FailurePolicy,
    pub activation: Activation,
}

/// An active step with its target resolved
#[derive(Debug)]
pub struct ResolvedStep {
    pub name: String,
    pub failure: FailurePolicy,
    pub resource: BoxedResource,
}

impl Step {
    fn new(name: impl Into<String>, kind: StepKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            overrides: ResolutionTable::new(),
            failure: FailurePolicy::FailFast,
            activation: Activation::Always,
        }
    }

    /// Run a shell command; the command doubles as the step name
    pub fn command(command: impl Into<String>) -> Self {
        let command = command.into();
        Self::new(command.clone(), StepKind::RunCommand { user: None }, command)
    }

    /// Ensure a package is installed
    pub fn package(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), StepKind::EnsurePackage, name)
    }

    /// Ensure a directory exists, creating parents
    pub fn directory(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            path.clone(),
            StepKind::EnsureDirectory {
                recursive: true,
                mode: None,
            },
            path,
        )
    }

    /// Place the bundled artifact `source` at `path`
    pub fn file(path: impl Into<String>, source: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            path.clone(),
            StepKind::PlaceFile {
                source: source.into(),
                mode: None,
            },
            path,
        )
    }

    /// Ensure a kernel module is loaded
    pub fn kernel_module(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), StepKind::LoadKernelModule, name)
    }

    /// Rename the step without touching its target
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the target for one family
    pub fn on(mut self, family: PlatformFamily, target: impl Into<String>) -> Self {
        self.overrides.insert(Selector::Family(family), target.into());
        self
    }

    /// Override the target for several families
    pub fn on_families(mut self, families: &[PlatformFamily], target: impl Into<String>) -> Self {
        let target = target.into();
        for family in families {
            self.overrides.insert(Selector::Family(*family), target.clone());
        }
        self
    }

    /// Override the target for one family at one version
    pub fn on_version(
        mut self,
        family: PlatformFamily,
        version: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.overrides
            .insert(Selector::FamilyVersion(family, version.into()), target.into());
        self
    }

    /// Target used when no override matches, instead of the literal
    pub fn otherwise(mut self, target: impl Into<String>) -> Self {
        self.overrides.set_default(target.into());
        self
    }

    /// Only run on the given families
    pub fn only_on(mut self, families: &[PlatformFamily]) -> Self {
        self.activation = Activation::families(families);
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Record failures and continue with the next step
    pub fn ignore_failure(mut self) -> Self {
        self.failure = FailurePolicy::IgnoreAndContinue;
        self
    }

    /// Permission bits for directory and file steps; ignored elsewhere
    pub fn mode(mut self, bits: u32) -> Self {
        match &mut self.kind {
            StepKind::EnsureDirectory { mode, .. } | StepKind::PlaceFile { mode, .. } => {
                *mode = Some(bits);
            }
            _ => log::debug!("mode ignored on {} step '{}'", self.kind.type_name(), self.name),
        }
        self
    }

    /// Run a command step as `user`; ignored elsewhere
    pub fn run_as(mut self, user: impl Into<String>) -> Self {
        if let StepKind::RunCommand { user: slot } = &mut self.kind {
            *slot = Some(user.into());
        }
        self
    }

    /// Create only the final directory component
    pub fn non_recursive(mut self) -> Self {
        if let StepKind::EnsureDirectory { recursive, .. } = &mut self.kind {
            *recursive = false;
        }
        self
    }

    pub fn step_type(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn is_active(&self, platform: &PlatformDescriptor) -> bool {
        self.activation.is_active(platform)
    }

    /// Target for a platform: override, then default, then the literal
    pub fn resolve_target(&self, platform: &PlatformDescriptor) -> String {
        self.overrides
            .resolve(platform)
            .cloned()
            .unwrap_or_else(|| self.target.clone())
    }

    /// Resolve into a resource, or `None` when inactive on this platform
    pub fn resolve(&self, platform: &PlatformDescriptor) -> Option<ResolvedStep> {
        if !self.is_active(platform) {
            return None;
        }

        let target = self.resolve_target(platform);
        let resource: BoxedResource = match &self.kind {
            StepKind::RunCommand { user } => Box::new(ShellCommand::new(target, user.clone())),
            StepKind::EnsurePackage => Box::new(Package::new(target)),
            StepKind::EnsureDirectory { recursive, mode } => Box::new(Directory {
                path: target.into(),
                recursive: *recursive,
                mode: *mode,
            }),
            StepKind::PlaceFile { source, mode } => {
                Box::new(ManagedFile::new(target, source.clone(), *mode))
            }
            StepKind::LoadKernelModule => Box::new(KernelModule::new(target)),
        };

        Some(ResolvedStep {
            name: self.name.clone(),
            failure: self.failure,
            resource,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformFamily::*;

    fn platform(family: PlatformFamily, version: &str) -> PlatformDescriptor {
        PlatformDescriptor::new(family, version)
    }

    #[test]
    fn test_literal_target_without_overrides() {
        let step = Step::package("socat");
        for family in PlatformFamily::ALL {
            assert_eq!(step.resolve_target(&platform(family, "1")), "socat");
        }
    }

    #[test]
    fn test_unmatched_family_resolves_to_literal() {
        let step = Step::package("kernel headers")
            .on_families(&[Redhat, Centos], "kernel-devel-5.14.0");
        assert_eq!(
            step.resolve_target(&platform(Centos, "7")),
            "kernel-devel-5.14.0"
        );
        assert_eq!(step.resolve_target(&platform(Ubuntu, "22.04")), "kernel headers");
    }

    #[test]
    fn test_inactive_step_resolves_to_none() {
        let step = Step::command("systemctl disable --now firewalld").only_on(&[Redhat]);
        assert!(step.resolve(&platform(Centos, "8")).is_none());
        assert!(step.resolve(&platform(Redhat, "8")).is_some());
    }

    #[test]
    fn test_resolved_resource_carries_kind_data() {
        let step = Step::file("/go/bin/test2json", "test2json").mode(0o744);
        let resolved = step.resolve(&platform(Fedora, "39")).unwrap();

        assert_eq!(resolved.resource.resource_type(), "file");
        assert_eq!(resolved.resource.id(), "/go/bin/test2json");
        assert!(resolved.resource.description().contains("0744"));
        assert_eq!(resolved.failure, FailurePolicy::FailFast);
    }

    #[test]
    fn test_builders_only_touch_matching_kinds() {
        let step = Step::package("wget").mode(0o755).run_as("root").non_recursive();
        assert_eq!(step.kind, StepKind::EnsurePackage);

        let step = Step::command("yum -y update").run_as("root").ignore_failure();
        assert_eq!(
            step.kind,
            StepKind::RunCommand {
                user: Some("root".into())
            }
        );
        assert!(step.failure.is_ignored());
    }

    #[test]
    fn test_named_keeps_target() {
        let step = Step::package("netcat").named("nc tools").otherwise("netcat-openbsd");
        assert_eq!(step.name, "nc tools");
        assert_eq!(step.resolve_target(&platform(Debian, "12")), "netcat-openbsd");
    }
}
