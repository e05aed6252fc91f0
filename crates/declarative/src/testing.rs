//! In-memory host for tests

use crate::context::{FileInfo, Host};
use crate::types::CommandOutput;
use anyhow::{Result, anyhow, bail};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    packages: HashMap<String, String>,
    directories: HashSet<PathBuf>,
    files: HashMap<PathBuf, FileInfo>,
    modules: HashSet<String>,
    calls: Vec<String>,
}

/// Host double that records every side effect
#[derive(Debug, Default)]
pub struct MockHost {
    state: Mutex<State>,
    artifacts: HashMap<String, String>,
    failing_commands: HashSet<String>,
    failing_packages: HashSet<String>,
}

fn digest(content: &str) -> String {
    format!("digest-of-{content}")
}

impl MockHost {
    pub fn new() -> Self {
        Self::default().with_directory("/")
    }

    pub fn with_package(self, name: &str, version: &str) -> Self {
        self.lock()
            .packages
            .insert(name.to_string(), version.to_string());
        self
    }

    pub fn with_directory(self, path: &str) -> Self {
        self.lock().directories.insert(PathBuf::from(path));
        self
    }

    pub fn with_file(self, path: &str, content: &str, mode: u32) -> Self {
        self.lock().files.insert(
            PathBuf::from(path),
            FileInfo {
                digest: digest(content),
                mode,
            },
        );
        self
    }

    pub fn with_artifact(mut self, name: &str, content: &str) -> Self {
        self.artifacts.insert(name.to_string(), content.to_string());
        self
    }

    pub fn failing_command(mut self, command: &str) -> Self {
        self.failing_commands.insert(command.to_string());
        self
    }

    pub fn failing_package(mut self, name: &str) -> Self {
        self.failing_packages.insert(name.to_string());
        self
    }

    /// Side effects in the order they happened
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.lock().packages.contains_key(name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Host for MockHost {
    fn run_command(&self, command: &str, user: Option<&str>) -> Result<CommandOutput> {
        let call = match user {
            Some(user) => format!("run[{user}]: {command}"),
            None => format!("run: {command}"),
        };
        self.lock().calls.push(call);

        let failed = self.failing_commands.contains(command);
        Ok(CommandOutput {
            stdout: Vec::new(),
            stderr: if failed {
                b"mock failure".to_vec()
            } else {
                Vec::new()
            },
            success: !failed,
            code: Some(i32::from(failed)),
        })
    }

    fn package_version(&self, name: &str) -> Result<Option<String>> {
        Ok(self.lock().packages.get(name).cloned())
    }

    fn install_package(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(format!("install: {name}"));
        if self.failing_packages.contains(name) {
            bail!("package not found: {name}");
        }
        state.packages.insert(name.to_string(), "1.0".to_string());
        Ok(())
    }

    fn path_exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.directories.contains(path) || state.files.contains_key(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.lock().directories.contains(path)
    }

    fn create_directory(&self, path: &Path, recursive: bool, _mode: Option<u32>) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(format!("mkdir: {}", path.display()));
        if recursive {
            for ancestor in path.ancestors() {
                state.directories.insert(ancestor.to_path_buf());
            }
        } else {
            let parent = path
                .parent()
                .ok_or_else(|| anyhow!("no parent for {}", path.display()))?;
            if !state.directories.contains(parent) {
                bail!("parent of {} does not exist", path.display());
            }
            state.directories.insert(path.to_path_buf());
        }
        Ok(())
    }

    fn file_info(&self, path: &Path) -> Result<Option<FileInfo>> {
        Ok(self.lock().files.get(path).cloned())
    }

    fn source_digest(&self, source: &str) -> Result<String> {
        self.artifacts
            .get(source)
            .map(|content| digest(content))
            .ok_or_else(|| anyhow!("artifact not found in bundle: {source}"))
    }

    fn place_file(&self, path: &Path, source: &str, mode: Option<u32>) -> Result<()> {
        let digest = self.source_digest(source)?;
        let mut state = self.lock();
        state.calls.push(format!("place: {}", path.display()));
        state.files.insert(
            path.to_path_buf(),
            FileInfo {
                digest,
                mode: mode.unwrap_or(0o644),
            },
        );
        Ok(())
    }

    fn module_loaded(&self, name: &str) -> Result<bool> {
        Ok(self.lock().modules.contains(name))
    }

    fn load_module(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(format!("modprobe: {name}"));
        state.modules.insert(name.to_string());
        Ok(())
    }
}
