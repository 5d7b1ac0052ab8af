//! Shared types for the migration core.
//!
//! The state is deliberately untyped: the runner treats it as an opaque JSON
//! object and each step only inspects the fields it rewrites.

use serde_json::{Map, Value};

use super::version::Version;

/// Entire persisted application state, keyed by top-level field name.
pub type State = Map<String, Value>;

/// Pure transformation from the shape of `to_version - 1` to `to_version`.
pub type StepFn = fn(State) -> State;

/// One registry entry.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Version the step migrates *to*.
    pub to_version: Version,
    /// Stable identifier used in logs and `migrator versions` output.
    pub name: &'static str,
    pub apply: StepFn,
}

/// What happens to a state at one pending version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanEntry {
    /// A registered step runs.
    Step {
        version: Version,
        name: &'static str,
    },
    /// No registered step: the state passes through unchanged.
    Noop { version: Version },
}

impl PlanEntry {
    pub fn version(&self) -> Version {
        match self {
            PlanEntry::Step { version, .. } | PlanEntry::Noop { version } => *version,
        }
    }
}

/// Ordered list of versions a stored state still has to pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub from: Version,
    pub to: Version,
    pub entries: Vec<PlanEntry>,
}

impl MigrationPlan {
    /// True when the stored version is already current (or ahead of it).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the stored version is newer than this build understands.
    pub fn is_ahead(&self) -> bool {
        self.from > self.to
    }

    /// Versions with a registered step, ascending.
    pub fn step_versions(&self) -> Vec<Version> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, PlanEntry::Step { .. }))
            .map(PlanEntry::version)
            .collect()
    }
}

/// Summary of a completed run.
///
/// `applied` and `skipped` are both ascending; together they cover
/// `(from, to]` exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: Version,
    pub to: Version,
    /// Versions whose registered step ran.
    pub applied: Vec<Version>,
    /// Versions passed through without a registered step.
    pub skipped: Vec<Version>,
}
