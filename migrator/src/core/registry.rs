//! Migration registry: ordered table of steps keyed by target version.

use anyhow::{Result, bail};

use super::steps;
use super::types::Migration;
use super::version::{CURRENT_VERSION, Version};

/// Built-in steps, ascending by target version.
///
/// Versions 6, 7 and 10 through 13 changed no structure and have no entry.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        to_version: 2,
        name: "remove_legacy_services",
        apply: steps::remove_legacy_services,
    },
    Migration {
        to_version: 3,
        name: "introduce_roles",
        apply: steps::introduce_roles,
    },
    Migration {
        to_version: 4,
        name: "rename_admin_users",
        apply: steps::rename_admin_users,
    },
    Migration {
        to_version: 5,
        name: "reset_users",
        apply: steps::reset_users,
    },
    Migration {
        to_version: 8,
        name: "default_event_tasks",
        apply: steps::default_event_tasks,
    },
    Migration {
        to_version: 9,
        name: "default_rfq_items",
        apply: steps::default_rfq_items,
    },
];

/// Immutable view over a step table and the version it migrates up to.
#[derive(Debug, Clone, Copy)]
pub struct Registry<'a> {
    current_version: Version,
    steps: &'a [Migration],
}

impl Registry<'static> {
    /// The application's registry, migrating up to [`CURRENT_VERSION`].
    pub const fn builtin() -> Self {
        Registry {
            current_version: CURRENT_VERSION,
            steps: MIGRATIONS,
        }
    }
}

impl<'a> Registry<'a> {
    /// Build a registry over a custom step table, rejecting invalid tables.
    pub fn new(current_version: Version, steps: &'a [Migration]) -> Result<Self> {
        let registry = Registry {
            current_version,
            steps,
        };
        let errors = registry.validate();
        if !errors.is_empty() {
            bail!("invalid migration registry:\n- {}", errors.join("\n- "));
        }
        Ok(registry)
    }

    /// Check table invariants:
    /// - target versions are > 0 and <= the current version
    /// - target versions are unique and strictly ascending
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for step in self.steps {
            if step.to_version == 0 || step.to_version > self.current_version {
                errors.push(format!(
                    "{}: to_version {} outside 1..={}",
                    step.name, step.to_version, self.current_version
                ));
            }
        }
        for pair in self.steps.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            if left.to_version == right.to_version {
                errors.push(format!(
                    "duplicate to_version {} ({}, {})",
                    left.to_version, left.name, right.name
                ));
            } else if left.to_version > right.to_version {
                errors.push(format!(
                    "{} (v{}) must come before {} (v{})",
                    right.name, right.to_version, left.name, left.to_version
                ));
            }
        }
        errors
    }

    pub fn current_version(&self) -> Version {
        self.current_version
    }

    pub fn steps(&self) -> &'a [Migration] {
        self.steps
    }

    /// Registered target versions, ascending.
    pub fn registered_versions(&self) -> Vec<Version> {
        self.steps.iter().map(|step| step.to_version).collect()
    }

    /// Step migrating to `version`, if one is registered.
    pub fn step_for(&self, version: Version) -> Option<&'a Migration> {
        self.steps
            .binary_search_by_key(&version, |step| step.to_version)
            .ok()
            .map(|index| &self.steps[index])
    }
}
