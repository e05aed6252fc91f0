//! # Declarative
//!
//! A framework for declarative host provisioning.
//!
//! This crate provides the core abstractions for declaring an ordered plan
//! of steps, resolving each step against the target platform, detecting
//! current state, and converging the host to match.
//!
//! ## Core Concepts
//!
//! - **PlatformDescriptor**: OS family and version of the target host
//! - **Step**: a command, package, directory, file or kernel module
//!   declaration with a platform resolution table, a failure policy and an
//!   activation policy
//! - **Resource**: a resolved step that can detect and converge its state
//! - **ExecutionPlan**: an ordered sequence of steps
//! - **Executor**: applies a plan sequentially, honoring failure policies
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     ExecutionPlan, PlatformDescriptor, PlatformFamily, Step, apply_simple,
//! };
//!
//! let plan = ExecutionPlan::new()
//!     .step(
//!         Step::package("netcat")
//!             .on(PlatformFamily::Amazon, "nmap-ncat")
//!             .on_families(&[PlatformFamily::Redhat, PlatformFamily::Centos], "nc"),
//!     )
//!     .step(Step::directory("/tmp/junit"))
//!     .step(Step::file("/tmp/junit/tags.txt", "tags.txt").mode(0o444).ignore_failure());
//!
//! let platform = PlatformDescriptor::new(PlatformFamily::Amazon, "2022");
//! let report = apply_simple(&plan, &platform, &host)?;
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`Host`]: performs every side effect (commands, packages, files, modules)
//! - [`ProgressCallback`]: receives step status transitions
//!
//! This allows the crate to be used without hard dependencies on a live
//! machine, a package manager, or a UI framework.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod planner;
pub mod platform;
pub mod resolve;
pub mod resource;
pub mod resources;
pub mod step;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types at crate root
pub use context::{ApplyContext, FileInfo, Host, NoProgress, ProgressCallback};
pub use diff::{DiffSummary, StepDiff, compute_diffs, group_by_type};
pub use error::ProvisionError;
pub use executor::{ApplyReport, StepReport, apply, apply_simple};
pub use planner::ExecutionPlan;
pub use platform::{PlatformDescriptor, PlatformFamily, UnknownFamily};
pub use resolve::{Activation, ResolutionTable, Selector};
pub use resource::{BoxedResource, Resource};
pub use step::{ResolvedStep, Step, StepKind};
pub use types::{
    ApplyResult, CommandOutput, ExecuteOptions, ExecuteSummary, FailurePolicy, ResourceState,
    StepStatus,
};
