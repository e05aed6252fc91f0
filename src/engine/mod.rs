//! Execution engine for provision
//!
//! The engine orchestrates:
//! 1. Diffing - Compute current vs desired state for every active step
//! 2. Confirming - Show the diff and ask before touching the host
//! 3. Executing - Apply the plan in order with progress reporting

pub mod differ;
pub mod executor;

pub use differ::display_diff;
pub use executor::{RunOptions, execute};
