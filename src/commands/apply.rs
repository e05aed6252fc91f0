use anyhow::{Result, bail};

use crate::Context;
use crate::bundle::Bundle;
use crate::cli::ApplyArgs;
use crate::config::ProvisionConfig;
use crate::engine::{self, RunOptions};
use crate::host::SystemHost;
use crate::runner;
use crate::ui;

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let config = ProvisionConfig::load()?;
    let resolved = super::resolve(&args.target, &config)?;

    if !args.dry_run && !runner::is_root() {
        bail!("apply changes system state and must run as root; use --dry-run to preview");
    }

    ui::header(&format!("Provisioning {}", resolved.platform));
    ui::kv("kernel", &resolved.kernel_release);
    ui::kv("files", &resolved.files_dir.display().to_string());
    ui::kv("steps", &resolved.plan.len().to_string());

    let host = SystemHost::new(resolved.platform.family, Bundle::new(&resolved.files_dir))?;
    ui::kv("packages", &host.package_manager().to_string());
    let opts = RunOptions {
        dry_run: args.dry_run,
        yes: args.yes || !config.confirm,
        verbose: ctx.verbose > 0,
        quiet: ctx.quiet,
    };

    if engine::execute(&resolved.plan, &resolved.platform, &host, &opts)?.is_none() {
        ui::dim("Nothing applied");
    }
    Ok(())
}
