//! Kernel module resource - ensure a module is loaded

use anyhow::Result;

use crate::context::{ApplyContext, Host};
use crate::resource::Resource;
use crate::types::{ApplyResult, ResourceState};

#[derive(Debug, Clone)]
pub struct KernelModule {
    pub name: String,
}

impl KernelModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for KernelModule {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Load kernel module {}", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "kernel_module"
    }

    fn current_state(&self, host: &dyn Host) -> Result<ResourceState> {
        if host.module_loaded(&self.name)? {
            Ok(ResourceState::Present { details: None })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "dry run".to_string(),
            });
        }

        if ctx.host.module_loaded(&self.name)? {
            return Ok(ApplyResult::NoChange);
        }

        ctx.host.load_module(&self.name)?;
        Ok(ApplyResult::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;

    #[test]
    fn test_loads_module_once() {
        let host = MockHost::new();
        let module = KernelModule::new("ipv6");
        let mut ctx = ApplyContext::new(&host, false, false);

        assert_eq!(module.apply(&mut ctx).unwrap(), ApplyResult::Created);
        assert_eq!(module.apply(&mut ctx).unwrap(), ApplyResult::NoChange);
        assert_eq!(host.calls(), vec!["modprobe: ipv6"]);
    }
}
