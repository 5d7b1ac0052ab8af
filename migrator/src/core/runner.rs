//! Sequential migration runner.
//!
//! Folds a state through every pending version in ascending order. The runner
//! never fails: registered steps are total and unregistered versions pass the
//! state through unchanged.

use tracing::{debug, info};

use super::registry::Registry;
use super::types::{MigrationPlan, MigrationReport, PlanEntry, State};
use super::version::{Version, pending_versions};

impl Registry<'_> {
    /// Versions `(stored, current]` and what happens at each.
    pub fn plan(&self, stored: Version) -> MigrationPlan {
        let entries = pending_versions(stored, self.current_version())
            .map(|version| match self.step_for(version) {
                Some(step) => PlanEntry::Step {
                    version,
                    name: step.name,
                },
                None => PlanEntry::Noop { version },
            })
            .collect();
        MigrationPlan {
            from: stored,
            to: self.current_version(),
            entries,
        }
    }

    /// Bring `state` from `stored` up to the current version.
    pub fn run(&self, state: State, stored: Version) -> State {
        self.run_with_report(state, stored).0
    }

    /// Like [`Registry::run`], also reporting which versions ran a step.
    pub fn run_with_report(&self, mut state: State, stored: Version) -> (State, MigrationReport) {
        let current = self.current_version();
        if stored > current {
            debug!(stored, current, "stored version ahead of current; nothing to run");
        }

        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        for version in pending_versions(stored, current) {
            match self.step_for(version) {
                Some(step) => {
                    info!(version, step = step.name, "running migration");
                    state = (step.apply)(state);
                    applied.push(version);
                }
                None => {
                    debug!(version, "no migration registered");
                    skipped.push(version);
                }
            }
        }

        let report = MigrationReport {
            from: stored,
            to: current,
            applied,
            skipped,
        };
        (state, report)
    }
}

/// Run the built-in registry over `state` persisted at `stored`.
pub fn run_migrations(state: State, stored: Version) -> State {
    Registry::builtin().run(state, stored)
}
