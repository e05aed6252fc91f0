//! Directory resource - ensure a directory exists

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use super::format_mode;
use crate::context::{ApplyContext, Host};
use crate::resource::Resource;
use crate::types::{ApplyResult, ResourceState};

/// A directory that must exist
///
/// `mode` is applied when the directory is created; an existing directory
/// is left as it is.
#[derive(Debug, Clone)]
pub struct Directory {
    pub path: PathBuf,
    /// Create missing parents too
    pub recursive: bool,
    pub mode: Option<u32>,
}

impl Directory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            recursive: true,
            mode: None,
        }
    }
}

impl Resource for Directory {
    fn id(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn description(&self) -> String {
        match self.mode {
            Some(mode) => format!("Directory {} ({})", self.path.display(), format_mode(mode)),
            None => format!("Directory {}", self.path.display()),
        }
    }

    fn resource_type(&self) -> &'static str {
        "directory"
    }

    fn current_state(&self, host: &dyn Host) -> Result<ResourceState> {
        if host.is_directory(&self.path) {
            Ok(ResourceState::Present { details: None })
        } else if host.path_exists(&self.path) {
            Ok(ResourceState::Modified {
                from: "non-directory".to_string(),
                to: "directory".to_string(),
            })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "dry run".to_string(),
            });
        }

        match self.current_state(ctx.host)? {
            ResourceState::Present { .. } => Ok(ApplyResult::NoChange),
            ResourceState::Absent => {
                ctx.host.create_directory(&self.path, self.recursive, self.mode)?;
                Ok(ApplyResult::Created)
            }
            // Don't replace existing files with a directory
            _ => bail!("{} exists and is not a directory", self.path.display()),
        }
    }
}
