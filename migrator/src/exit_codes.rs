//! Stable exit codes for migrator CLI commands.

/// Command succeeded; the state file is (now) current.
pub const OK: i32 = 0;
/// Command failed due to unreadable config/state or other errors.
pub const INVALID: i32 = 1;
/// `migrator status` found pending migrations.
pub const PENDING: i32 = 2;
/// The state file is tagged with a version newer than this build.
pub const AHEAD: i32 = 3;
