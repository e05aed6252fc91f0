//! Backend abstraction for package manager operations.
//!
//! The [`Backend`] trait defines the interface for interacting with a
//! distribution's package manager, allowing for different implementations
//! (apt, rpm-based, mock for testing).

pub mod apt;
pub mod rpm;

use crate::error::Result;
use crate::types::{InstalledPackage, PackageManager};

/// Backend trait for package manager operations.
pub trait Backend: Send + Sync {
    /// Which package manager this backend drives.
    fn manager(&self) -> PackageManager;

    /// Check if the package manager can be executed.
    fn is_available(&self) -> bool;

    /// Look up a package in the installed package database.
    fn query(&self, name: &str) -> Result<Option<InstalledPackage>>;

    /// Install a package non-interactively.
    fn install(&self, name: &str) -> Result<()>;
}

/// Run a command and capture its output, mapping spawn failures.
pub(crate) fn run(program: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<std::process::Output> {
    log::debug!("Running {} {}", program, args.join(" "));
    std::process::Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .output()
        .map_err(|e| crate::error::Error::CommandFailed {
            message: format!("failed to execute {program}"),
            stderr: e.to_string(),
        })
}
