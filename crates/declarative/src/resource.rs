//! Resource trait for declarative state management
//!
//! A Resource is a resolved step: something on the host that can be in a
//! certain state, and can be changed to reach a desired state.

use crate::context::{ApplyContext, Host};
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Every resolved step implements this trait, which provides:
/// - Identity (id, description, type)
/// - State detection (current vs desired)
/// - State convergence (apply)
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, ApplyResult, Host, Resource, ResourceState};
///
/// #[derive(Debug)]
/// struct Marker { path: std::path::PathBuf }
///
/// impl Resource for Marker {
///     fn id(&self) -> String { self.path.display().to_string() }
///     fn description(&self) -> String { format!("Marker at {}", self.path.display()) }
///     fn resource_type(&self) -> &'static str { "marker" }
///
///     fn current_state(&self, host: &dyn Host) -> anyhow::Result<ResourceState> {
///         Ok(if host.path_exists(&self.path) {
///             ResourceState::Present { details: None }
///         } else {
///             ResourceState::Absent
///         })
///     }
///
///     fn desired_state(&self) -> ResourceState {
///         ResourceState::Present { details: None }
///     }
///
///     fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
///         if ctx.dry_run {
///             return Ok(ApplyResult::Skipped { reason: "dry run".into() });
///         }
///         ctx.host.create_directory(&self.path, true, None)?;
///         Ok(ApplyResult::Created)
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Resolved target of this resource
    ///
    /// Examples:
    /// - "curl-minimal" for a package
    /// - "/go/bin" for a directory
    /// - "ipv6" for a kernel module
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category
    ///
    /// Used for grouping and filtering: "command", "package", "directory",
    /// "file", "kernel_module".
    fn resource_type(&self) -> &'static str;

    /// Detect the current state of this resource on the host
    fn current_state(&self, host: &dyn Host) -> Result<ResourceState>;

    /// Get the desired state for this resource
    fn desired_state(&self) -> ResourceState;

    /// Check if the resource needs changes to reach desired state
    ///
    /// Default implementation compares current and desired states.
    fn needs_apply(&self, host: &dyn Host) -> Result<bool> {
        let current = self.current_state(host)?;
        let desired = self.desired_state();
        Ok(current != desired)
    }

    /// Apply changes to reach the desired state
    ///
    /// This method should:
    /// 1. Respect ctx.dry_run (return Skipped if true)
    /// 2. Check if already in desired state (return NoChange)
    /// 3. Make the necessary changes
    /// 4. Return the appropriate ApplyResult
    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult>;
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
