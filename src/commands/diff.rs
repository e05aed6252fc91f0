use anyhow::Result;
use declarative::compute_diffs;

use crate::Context;
use crate::bundle::Bundle;
use crate::cli::TargetArgs;
use crate::config::ProvisionConfig;
use crate::engine::display_diff;
use crate::host::SystemHost;
use crate::ui;

pub fn run(_ctx: &Context, args: &TargetArgs) -> Result<()> {
    let config = ProvisionConfig::load()?;
    let resolved = super::resolve(args, &config)?;

    ui::header(&format!("Diff for {}", resolved.platform));
    let host = SystemHost::new(resolved.platform.family, Bundle::new(&resolved.files_dir))?;
    let diffs = compute_diffs(&resolved.plan, &resolved.platform, &host);
    display_diff(&diffs);
    Ok(())
}
