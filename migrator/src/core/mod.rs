//! Deterministic, pure migration logic.
//!
//! Core modules are free of I/O. They operate on in-memory state and return
//! deterministic outputs suitable for tests.

pub mod defaults;
pub mod registry;
pub mod runner;
pub mod steps;
pub mod types;
pub mod version;
