//! I/O helpers for migrator commands.

pub mod config;
pub mod store;
