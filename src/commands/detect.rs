use anyhow::Result;
use pkgkit::Client;

use crate::Context;
use crate::config::ProvisionConfig;
use crate::host;
use crate::paths;
use crate::platform;
use crate::runner;
use crate::ui;

pub fn run(_ctx: &Context) -> Result<()> {
    ui::header("Host Detection");

    let detected = platform::detect()?;
    ui::kv("platform", &detected.to_string());
    ui::kv("kernel", &host::kernel_release()?);

    let manager = host::package_manager_for(detected.family, runner::command_exists("dnf"));
    let available = if Client::new(manager)?.is_available() {
        "available"
    } else {
        "not found"
    };
    ui::kv("package manager", &format!("{manager} ({available})"));
    ui::kv("running as root", if runner::is_root() { "yes" } else { "no" });

    let config_path = paths::config_file()?;
    let config = ProvisionConfig::load_from(&config_path)?;
    ui::kv("config", &config_path.display().to_string());
    let configured =
        platform::resolve_with(None, None, &config.platform, || Ok(detected.clone()))?;
    if configured != detected {
        ui::warn(&format!("config overrides the platform to {configured}"));
    }

    Ok(())
}
