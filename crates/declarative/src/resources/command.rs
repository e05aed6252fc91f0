//! Command resource - run a shell command on every apply

use anyhow::{Result, bail};

use crate::context::{ApplyContext, Host};
use crate::resource::Resource;
use crate::types::{ApplyResult, ResourceState};

/// A shell command, run through `sh -c`
///
/// Commands carry no guard: the current state is always unknown, so every
/// apply runs them again.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    pub command: String,
    /// Run as this user instead of the invoking one
    pub user: Option<String>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>, user: Option<String>) -> Self {
        Self {
            command: command.into(),
            user,
        }
    }
}

impl Resource for ShellCommand {
    fn id(&self) -> String {
        self.command.clone()
    }

    fn description(&self) -> String {
        match &self.user {
            Some(user) => format!("Run `{}` as {}", self.command, user),
            None => format!("Run `{}`", self.command),
        }
    }

    fn resource_type(&self) -> &'static str {
        "command"
    }

    fn current_state(&self, _host: &dyn Host) -> Result<ResourceState> {
        Ok(ResourceState::Unknown)
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some("ran".to_string()),
        }
    }

    fn needs_apply(&self, _host: &dyn Host) -> Result<bool> {
        Ok(true)
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "dry run".to_string(),
            });
        }

        let output = ctx.host.run_command(&self.command, self.user.as_deref())?;
        if ctx.verbose {
            let stdout = output.stdout_str();
            if !stdout.trim().is_empty() {
                log::info!("{}: {}", self.command, stdout.trim());
            }
        }

        if !output.success {
            let code = output
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            bail!(
                "`{}` exited with {}: {}",
                self.command,
                code,
                output.stderr_str().trim()
            );
        }

        Ok(ApplyResult::Modified)
    }
}
