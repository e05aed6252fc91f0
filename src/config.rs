//! User configuration: `~/.config/provision/config.toml`

use anyhow::{Context, Result};
use declarative::PlatformFamily;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::paths;

/// Persistent defaults for every command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Artifact bundle directory
    #[serde(default)]
    pub files_dir: Option<String>,

    /// Plan file used instead of the built-in recipe
    #[serde(default)]
    pub plan: Option<String>,

    /// Ask before applying changes
    #[serde(default = "default_true")]
    pub confirm: bool,

    /// Platform override, for hosts whose os-release is not recognised
    #[serde(default)]
    pub platform: PlatformOverride,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformOverride {
    #[serde(default)]
    pub family: Option<PlatformFamily>,
    #[serde(default)]
    pub version: Option<String>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            files_dir: None,
            plan: None,
            confirm: true,
            platform: PlatformOverride::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl ProvisionConfig {
    /// Load the config from the config directory, or defaults when missing
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }
}
