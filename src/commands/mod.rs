pub mod apply;
pub mod check;
pub mod detect;
pub mod diff;
pub mod plan;

use anyhow::Result;
use declarative::{ExecutionPlan, PlatformDescriptor};
use std::path::PathBuf;

use crate::cli::TargetArgs;
use crate::config::ProvisionConfig;
use crate::host;
use crate::paths;
use crate::platform;
use crate::recipe;
use crate::schema::{PlanFile, Placeholders};

/// Everything a command needs once flags, config and the host are read
pub struct Resolved {
    pub platform: PlatformDescriptor,
    pub kernel_release: String,
    pub plan: ExecutionPlan,
    pub files_dir: PathBuf,
}

/// Read the kernel release once, unless given on the command line
pub fn kernel_release(flag: Option<&str>) -> Result<String> {
    match flag {
        Some(release) => Ok(release.to_string()),
        None => host::kernel_release(),
    }
}

/// Build the plan from a plan file, or the built-in recipe when none is set
pub fn build_plan(
    plan_file: Option<&str>,
    kernel_release: &str,
    only: Option<&str>,
) -> Result<ExecutionPlan> {
    let plan = match plan_file {
        Some(path) => {
            let path = paths::expand(path);
            log::info!("Loading plan from {}", path.display());
            PlanFile::load(&path)?.to_plan(&Placeholders::new(kernel_release)?)?
        }
        None => recipe::system_probe(kernel_release),
    };
    Ok(plan.filter_by_target(only))
}

pub fn resolve(args: &TargetArgs, config: &ProvisionConfig) -> Result<Resolved> {
    let platform = platform::resolve(
        args.family,
        args.platform_version.as_deref(),
        &config.platform,
    )?;
    let kernel_release = kernel_release(args.kernel_release.as_deref())?;
    let plan_file = args.plan.as_deref().or(config.plan.as_deref());
    let plan = build_plan(plan_file, &kernel_release, args.only.as_deref())?;
    let files_dir = paths::files_dir(args.files_dir.as_deref(), config.files_dir.as_deref());

    log::debug!(
        "Resolved {} steps for {platform} (kernel {kernel_release})",
        plan.len()
    );
    Ok(Resolved {
        platform,
        kernel_release,
        plan,
        files_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flag_kernel_release_skips_host() {
        assert_eq!(kernel_release(Some("4.14.0")).unwrap(), "4.14.0");
    }

    #[test]
    fn test_builtin_recipe_filtered() {
        let plan = build_plan(None, "5.10.0", Some("modules")).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps()[0].name, "ipv6");
    }

    #[test]
    fn test_plan_file_replaces_recipe() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.toml");
        fs::write(
            &path,
            "[[step]]\nname = \"headers\"\ntype = \"package\"\ntarget = \"linux-headers-{{kernel_release}}\"\n",
        )
        .unwrap();

        let plan = build_plan(path.to_str(), "6.8.0-31-generic", None).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps()[0].target, "linux-headers-6.8.0-31-generic");
    }

    #[test]
    fn test_full_resolution_from_flags() {
        let args = TargetArgs {
            family: Some(declarative::PlatformFamily::Redhat),
            platform_version: Some("9".into()),
            kernel_release: Some("5.14.0".into()),
            files_dir: Some("/srv/files".into()),
            only: Some("commands".into()),
            ..Default::default()
        };
        let resolved = resolve(&args, &ProvisionConfig::default()).unwrap();

        assert_eq!(resolved.platform.to_string(), "redhat 9");
        assert_eq!(resolved.files_dir, PathBuf::from("/srv/files"));
        assert!(resolved.plan.iter().all(|s| s.step_type() == "command"));
        assert_eq!(resolved.kernel_release, "5.14.0");
    }
}
