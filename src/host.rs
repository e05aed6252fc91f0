//! `Host` implementation against the live machine

use anyhow::{Context, Result, bail};
use declarative::{CommandOutput, FileInfo, Host, PlatformFamily};
use pkgkit::{Client, PackageManager};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::bundle::{Bundle, hash_file};
use crate::runner;

const PROC_MODULES: &str = "/proc/modules";
const SYS_MODULE: &str = "/sys/module";
const OSRELEASE: &str = "/proc/sys/kernel/osrelease";

/// Package manager for a family; rpm hosts prefer dnf when it is installed
pub fn package_manager_for(family: PlatformFamily, dnf_available: bool) -> PackageManager {
    if family.is_debian_like() {
        PackageManager::Apt
    } else if dnf_available {
        PackageManager::Dnf
    } else {
        PackageManager::Yum
    }
}

/// Running kernel release, as `uname -r` prints it
pub fn kernel_release() -> Result<String> {
    match fs::read_to_string(OSRELEASE) {
        Ok(release) if !release.trim().is_empty() => Ok(release.trim().to_string()),
        _ => {
            log::debug!("{OSRELEASE} unreadable, falling back to uname -r");
            runner::run_capture("uname", &["-r"]).context("Could not determine kernel release")
        }
    }
}

pub struct SystemHost {
    packages: Client,
    bundle: Bundle,
    proc_modules: PathBuf,
    sys_module: PathBuf,
}

impl SystemHost {
    pub fn new(family: PlatformFamily, bundle: Bundle) -> Result<Self> {
        let manager = package_manager_for(family, runner::command_exists("dnf"));
        log::debug!("Using {manager} for {family}");
        Ok(Self {
            packages: Client::new(manager)?,
            bundle,
            proc_modules: PathBuf::from(PROC_MODULES),
            sys_module: PathBuf::from(SYS_MODULE),
        })
    }

    pub fn package_manager(&self) -> PackageManager {
        self.packages.manager()
    }

    #[cfg(test)]
    fn with_module_paths(mut self, proc_modules: PathBuf, sys_module: PathBuf) -> Self {
        self.proc_modules = proc_modules;
        self.sys_module = sys_module;
        self
    }
}

/// Whether `/proc/modules` content lists `name`
///
/// The kernel reports dashes in module names as underscores.
fn modules_list_contains(content: &str, name: &str) -> bool {
    let wanted = name.replace('-', "_");
    content
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .any(|loaded| loaded == wanted)
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set mode {mode:o} on {}", path.display()))
}

/// Write `staging` with `write`, set its mode and rename it to `path`
///
/// The staging file is removed when any part fails, including a write that
/// stopped halfway.
fn install_staged(
    staging: &Path,
    path: &Path,
    mode: Option<u32>,
    write: impl FnOnce(&Path) -> Result<()>,
) -> Result<()> {
    let result = write(staging)
        .and_then(|()| mode.map_or(Ok(()), |mode| set_mode(staging, mode)))
        .and_then(|()| {
            fs::rename(staging, path)
                .with_context(|| format!("Failed to move {} into place", path.display()))
        });
    if result.is_err() {
        let _ = fs::remove_file(staging);
    }
    result
}

impl Host for SystemHost {
    fn run_command(&self, command: &str, user: Option<&str>) -> Result<CommandOutput> {
        runner::run_shell(command, user)
    }

    fn package_version(&self, name: &str) -> Result<Option<String>> {
        self.packages
            .installed_version(name)
            .with_context(|| format!("Failed to query package {name}"))
    }

    fn install_package(&self, name: &str) -> Result<()> {
        if let Err(e) = self.packages.install(name) {
            let category = e.category();
            log::info!("{}: {}", category.description(), category.advice());
            return Err(e).with_context(|| format!("Failed to install {name}"));
        }
        Ok(())
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&self, path: &Path, recursive: bool, mode: Option<u32>) -> Result<()> {
        if recursive {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        }
        .with_context(|| format!("Failed to create directory {}", path.display()))?;

        if let Some(mode) = mode {
            set_mode(path, mode)?;
        }
        Ok(())
    }

    fn file_info(&self, path: &Path) -> Result<Option<FileInfo>> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat {}", path.display()));
            }
        };
        if !metadata.is_file() {
            bail!("{} exists and is not a regular file", path.display());
        }

        Ok(Some(FileInfo {
            digest: hash_file(path)?,
            mode: metadata.permissions().mode() & 0o7777,
        }))
    }

    fn source_digest(&self, source: &str) -> Result<String> {
        self.bundle.digest(source)
    }

    /// Copy next to the destination, then rename over it
    fn place_file(&self, path: &Path, source: &str, mode: Option<u32>) -> Result<()> {
        let from = self.bundle.resolve(source)?;
        let file_name = path
            .file_name()
            .with_context(|| format!("{} has no file name", path.display()))?;
        let staging = path.with_file_name(format!(
            ".{}.provision-{}",
            file_name.to_string_lossy(),
            std::process::id()
        ));

        install_staged(&staging, path, mode, |staging| {
            fs::copy(&from, staging).map(drop).with_context(|| {
                format!("Failed to copy {} to {}", from.display(), staging.display())
            })
        })
    }

    fn module_loaded(&self, name: &str) -> Result<bool> {
        match fs::read_to_string(&self.proc_modules) {
            Ok(content) if modules_list_contains(&content, name) => return Ok(true),
            Ok(_) => {}
            Err(e) => log::debug!("Cannot read {}: {e}", self.proc_modules.display()),
        }
        // Built-in modules only show up under /sys/module
        Ok(self.sys_module.join(name.replace('-', "_")).is_dir())
    }

    fn load_module(&self, name: &str) -> Result<()> {
        let output = runner::run_output("modprobe", &[name])?;
        if !output.success {
            bail!("modprobe {name} failed: {}", output.stderr_str().trim());
        }
        Ok(())
    }
}
