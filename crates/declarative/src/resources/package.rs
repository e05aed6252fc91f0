//! Package resource - ensure an OS package is installed

use anyhow::Result;

use crate::context::{ApplyContext, Host};
use crate::resource::Resource;
use crate::types::{ApplyResult, ResourceState};

/// An OS package that must be installed
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for Package {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Install package {}", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "package"
    }

    fn current_state(&self, host: &dyn Host) -> Result<ResourceState> {
        match host.package_version(&self.name)? {
            Some(version) => Ok(ResourceState::Present {
                details: Some(version),
            }),
            None => Ok(ResourceState::Absent),
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    // Any installed version satisfies the resource
    fn needs_apply(&self, host: &dyn Host) -> Result<bool> {
        Ok(!self.current_state(host)?.is_present())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "dry run".to_string(),
            });
        }

        if ctx.host.package_version(&self.name)?.is_some() {
            return Ok(ApplyResult::NoChange);
        }

        ctx.host.install_package(&self.name)?;
        Ok(ApplyResult::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;

    #[test]
    fn test_installs_missing_package() {
        let host = MockHost::new();
        let mut ctx = ApplyContext::new(&host, false, false);

        assert_eq!(Package::new("socat").apply(&mut ctx).unwrap(), ApplyResult::Created);
        assert!(host.has_package("socat"));
    }

    #[test]
    fn test_installed_package_is_no_change() {
        let host = MockHost::new().with_package("wget", "1.21");
        let mut ctx = ApplyContext::new(&host, false, false);

        assert_eq!(Package::new("wget").apply(&mut ctx).unwrap(), ApplyResult::NoChange);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_installed_version_is_reported() {
        let host = MockHost::new().with_package("wget", "1.21");
        let package = Package::new("wget");

        assert_eq!(
            package.current_state(&host).unwrap(),
            ResourceState::Present {
                details: Some("1.21".to_string())
            }
        );
        assert!(!package.needs_apply(&host).unwrap());
    }

    #[test]
    fn test_install_failure_propagates() {
        let host = MockHost::new().failing_package("kernel-devel-5.10.0");
        let mut ctx = ApplyContext::new(&host, false, false);

        assert!(Package::new("kernel-devel-5.10.0").apply(&mut ctx).is_err());
    }
}
