//! Centralized path resolution for provision
//!
//! # Environment Variables
//!
//! - `PROVISION_CONFIG_DIR` - Override config directory
//! - `PROVISION_FILES_DIR` - Override the artifact bundle directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `PROVISION_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/provision` (if set)
//! 3. `~/.config/provision`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "PROVISION_CONFIG_DIR";

/// Environment variable for bundle directory override
pub const ENV_FILES_DIR: &str = "PROVISION_FILES_DIR";

/// Bundle directory used when neither flag, env nor config name one
pub const DEFAULT_FILES_DIR: &str = "/opt/provision/files";

/// Get the provision config directory path
///
/// Priority:
/// 1. `PROVISION_CONFIG_DIR` env var
/// 2. `XDG_CONFIG_HOME/provision`
/// 3. `~/.config/provision`
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let path = PathBuf::from(xdg_config).join("provision");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("provision");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Path of the config file inside the config directory
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Resolve the artifact bundle directory
///
/// Priority: explicit flag, `PROVISION_FILES_DIR`, config file, default.
pub fn files_dir(flag: Option<&str>, configured: Option<&str>) -> PathBuf {
    if let Some(dir) = flag {
        return expand(dir);
    }
    if let Ok(dir) = std::env::var(ENV_FILES_DIR) {
        log::debug!("Using files dir from {ENV_FILES_DIR}: {dir}");
        return expand(&dir);
    }
    configured.map_or_else(|| PathBuf::from(DEFAULT_FILES_DIR), expand)
}

/// Expand ~ and environment variables in a path string.
///
/// # Examples
///
/// ```ignore
/// let home_path = paths::expand("~/bundle");
/// let var_path = paths::expand("$HOME/bundle");
/// ```
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
