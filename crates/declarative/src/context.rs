//! Apply context and provider traits
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific host, package manager, or progress UI.

use crate::types::{CommandOutput, ExecuteSummary, StepStatus};
use anyhow::Result;
use std::path::Path;

/// Content fingerprint and permission bits of a file on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Hex-encoded content hash
    pub digest: String,
    /// Permission bits (e.g. `0o744`)
    pub mode: u32,
}

/// The machine a plan is applied to
///
/// Every side effect a step can have goes through this trait. Implement it
/// against the live system for real runs and in memory for tests.
pub trait Host: Send + Sync {
    /// Run a shell command, optionally as another user
    fn run_command(&self, command: &str, user: Option<&str>) -> Result<CommandOutput>;

    /// Installed version of a package, `None` when not installed
    fn package_version(&self, name: &str) -> Result<Option<String>>;

    /// Install a package through the platform's package manager
    fn install_package(&self, name: &str) -> Result<()>;

    /// Check whether anything exists at a path
    fn path_exists(&self, path: &Path) -> bool;

    /// Check whether a directory exists at a path
    fn is_directory(&self, path: &Path) -> bool;

    /// Create a directory, with parents when `recursive` is set
    fn create_directory(&self, path: &Path, recursive: bool, mode: Option<u32>) -> Result<()>;

    /// Fingerprint of a file already on the host, `None` when missing
    fn file_info(&self, path: &Path) -> Result<Option<FileInfo>>;

    /// Content hash of a bundled artifact, looked up by logical name
    fn source_digest(&self, source: &str) -> Result<String>;

    /// Copy a bundled artifact to `path`, setting `mode` when given
    fn place_file(&self, path: &Path, source: &str, mode: Option<u32>) -> Result<()>;

    /// Check whether a kernel module is loaded or built in
    fn module_loaded(&self, name: &str) -> Result<bool>;

    /// Load a kernel module
    fn load_module(&self, name: &str) -> Result<()>;
}

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called once before the first step
    fn on_plan_start(&mut self, total: usize);

    /// Called on every step status transition
    fn on_step_status(&mut self, index: usize, name: &str, status: &StepStatus);

    /// Called once after the last step, including after a fatal failure
    fn on_plan_complete(&mut self, summary: &ExecuteSummary);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_plan_start(&mut self, _total: usize) {}
    fn on_step_status(&mut self, _index: usize, _name: &str, _status: &StepStatus) {}
    fn on_plan_complete(&mut self, _summary: &ExecuteSummary) {}
}

/// Context passed to resource apply operations
pub struct ApplyContext<'a> {
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
    /// Whether to output verbose information
    pub verbose: bool,
    /// Host the resource converges
    pub host: &'a dyn Host,
}

impl<'a> ApplyContext<'a> {
    /// Create a new apply context
    pub fn new(host: &'a dyn Host, dry_run: bool, verbose: bool) -> Self {
        Self {
            dry_run,
            verbose,
            host,
        }
    }
}
