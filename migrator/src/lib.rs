//! Sequential schema migration for persisted application state.
//!
//! A state blob is tagged with the schema version it was written at. On
//! startup it is folded through every registered step above that version, in
//! ascending order, until it matches [`core::version::CURRENT_VERSION`].
//!
//! - **[`core`]**: Pure, deterministic logic (registry, runner, steps, template
//!   merge). No I/O.
//! - **[`io`]**: Side-effecting operations (state files, config).
//!
//! [`migrate`] coordinates core logic with I/O to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod migrate;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::registry::Registry;
pub use crate::core::runner::run_migrations;
pub use crate::core::types::State;
pub use crate::core::version::{BASELINE_VERSION, CURRENT_VERSION, Version};
