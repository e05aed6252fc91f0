//! File resource - place a bundled artifact at a fixed path

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use super::format_mode;
use crate::context::{ApplyContext, Host};
use crate::resource::Resource;
use crate::types::{ApplyResult, ResourceState};

/// A bundled artifact copied to `path`
#[derive(Debug, Clone)]
pub struct ManagedFile {
    pub path: PathBuf,
    /// Logical name of the artifact in the bundle
    pub source: String,
    pub mode: Option<u32>,
}

impl ManagedFile {
    pub fn new(path: impl AsRef<Path>, source: impl Into<String>, mode: Option<u32>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
            mode,
        }
    }

    fn details(&self) -> String {
        match self.mode {
            Some(mode) => format!("{} ({})", self.source, format_mode(mode)),
            None => self.source.clone(),
        }
    }
}

fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

impl Resource for ManagedFile {
    fn id(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn description(&self) -> String {
        format!("Place {} at {}", self.details(), self.path.display())
    }

    fn resource_type(&self) -> &'static str {
        "file"
    }

    fn current_state(&self, host: &dyn Host) -> Result<ResourceState> {
        let Some(current) = host.file_info(&self.path)? else {
            return Ok(ResourceState::Absent);
        };

        let wanted = host.source_digest(&self.source)?;
        if current.digest != wanted {
            return Ok(ResourceState::Modified {
                from: format!("content {}", short(&current.digest)),
                to: format!("content {}", short(&wanted)),
            });
        }

        if let Some(mode) = self.mode
            && current.mode & 0o7777 != mode
        {
            return Ok(ResourceState::Modified {
                from: format_mode(current.mode),
                to: format_mode(mode),
            });
        }

        Ok(self.desired_state())
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some(self.details()),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "dry run".to_string(),
            });
        }

        if let Some(parent) = self.path.parent()
            && !ctx.host.is_directory(parent)
        {
            bail!("parent directory {} does not exist", parent.display());
        }

        let result = match self.current_state(ctx.host)? {
            ResourceState::Present { .. } => return Ok(ApplyResult::NoChange),
            ResourceState::Absent => ApplyResult::Created,
            _ => ApplyResult::Modified,
        };

        ctx.host.place_file(&self.path, &self.source, self.mode)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;

    fn host() -> MockHost {
        MockHost::new()
            .with_directory("/go/bin")
            .with_artifact("gotestsum", "gotestsum-binary")
    }

    #[test]
    fn test_places_missing_file() {
        let host = host();
        let file = ManagedFile::new("/go/bin/gotestsum", "gotestsum", Some(0o744));
        let mut ctx = ApplyContext::new(&host, false, false);

        assert_eq!(file.apply(&mut ctx).unwrap(), ApplyResult::Created);
        assert_eq!(file.apply(&mut ctx).unwrap(), ApplyResult::NoChange);
    }

    #[test]
    fn test_wrong_mode_is_modified() {
        let host = host().with_file("/go/bin/gotestsum", "gotestsum-binary", 0o644);
        let file = ManagedFile::new("/go/bin/gotestsum", "gotestsum", Some(0o744));

        assert_eq!(
            file.current_state(&host).unwrap(),
            ResourceState::Modified {
                from: "0644".to_string(),
                to: "0744".to_string()
            }
        );
        let mut ctx = ApplyContext::new(&host, false, false);
        assert_eq!(file.apply(&mut ctx).unwrap(), ApplyResult::Modified);
        assert_eq!(file.current_state(&host).unwrap(), file.desired_state());
    }

    #[test]
    fn test_no_mode_ignores_permissions() {
        let host = host().with_file("/go/bin/gotestsum", "gotestsum-binary", 0o600);
        let file = ManagedFile::new("/go/bin/gotestsum", "gotestsum", None);
        assert!(!file.needs_apply(&host).unwrap());
    }

    #[test]
    fn test_changed_content_is_modified() {
        let host = host().with_file("/go/bin/gotestsum", "old", 0o744);
        let file = ManagedFile::new("/go/bin/gotestsum", "gotestsum", Some(0o744));
        assert!(matches!(
            file.current_state(&host).unwrap(),
            ResourceState::Modified { .. }
        ));
    }

    #[test]
    fn test_missing_parent_fails() {
        let host = MockHost::new().with_artifact("tags.txt", "tags");
        let file = ManagedFile::new("/tmp/junit/tags.txt", "tags.txt", None);
        let mut ctx = ApplyContext::new(&host, false, false);

        let err = file.apply(&mut ctx).unwrap_err().to_string();
        assert!(err.contains("/tmp/junit"));
    }

    #[test]
    fn test_missing_artifact_fails() {
        let host = MockHost::new().with_directory("/tmp/junit");
        let file = ManagedFile::new("/tmp/junit/job_url.txt", "job_url.txt", None);
        let mut ctx = ApplyContext::new(&host, false, false);

        assert!(file.apply(&mut ctx).is_err());
    }
}
