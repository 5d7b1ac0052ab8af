//! Orchestration for `migrator migrate` and `migrator status`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::defaults::merge_defaults;
use crate::core::registry::Registry;
use crate::core::types::{MigrationPlan, MigrationReport, State};
use crate::core::version::Version;
use crate::io::config::MigratorConfig;
use crate::io::store::{Envelope, load_envelope, load_template, write_envelope};

/// Options for [`migrate_file`].
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// Compute the result without rewriting the file.
    pub dry_run: bool,
}

/// Structured outcome of migrating one state file.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrateOutcome {
    /// Stored version already equals the current version; file untouched.
    UpToDate { version: Version },
    /// Migrations ran. `written` is false for dry runs.
    Migrated {
        report: MigrationReport,
        written: bool,
    },
    /// Stored version is newer than this build understands; file untouched.
    Ahead { stored: Version, current: Version },
}

/// Migrate an in-memory envelope, merging `template` into the result.
///
/// The result is tagged with the current version unless the input was
/// already ahead of it.
pub fn migrate_envelope(
    registry: &Registry<'_>,
    envelope: Envelope,
    template: Option<&State>,
) -> (Envelope, MigrationReport) {
    let (mut state, report) = registry.run_with_report(envelope.state, envelope.version);
    if let Some(template) = template {
        state = merge_defaults(state, template);
    }
    let migrated = Envelope {
        version: report.to.max(report.from),
        state,
    };
    (migrated, report)
}

/// Load a state file, bring it to the current version and write it back.
pub fn migrate_file(
    registry: &Registry<'_>,
    path: &Path,
    config: &MigratorConfig,
    options: &MigrateOptions,
) -> Result<MigrateOutcome> {
    let envelope = load_envelope(path, config.baseline_version)?;
    let current = registry.current_version();
    if envelope.version > current {
        warn!(
            path = %path.display(),
            stored = envelope.version,
            current,
            "state is newer than this build; leaving it untouched"
        );
        return Ok(MigrateOutcome::Ahead {
            stored: envelope.version,
            current,
        });
    }
    if envelope.version == current {
        debug!(path = %path.display(), version = current, "state already current");
        return Ok(MigrateOutcome::UpToDate { version: current });
    }

    let template = config
        .defaults_path
        .as_deref()
        .map(load_template)
        .transpose()
        .context("load default-state template")?;
    let (migrated, report) = migrate_envelope(registry, envelope, template.as_ref());

    if options.dry_run {
        info!(path = %path.display(), from = report.from, to = report.to, "dry run; not writing");
        return Ok(MigrateOutcome::Migrated {
            report,
            written: false,
        });
    }
    write_envelope(path, &migrated, config.backup)
        .with_context(|| format!("write migrated state {}", path.display()))?;
    info!(path = %path.display(), from = report.from, to = report.to, "state migrated");
    Ok(MigrateOutcome::Migrated {
        report,
        written: true,
    })
}

/// Plan pending migrations for a state file without touching it.
pub fn plan_file(
    registry: &Registry<'_>,
    path: &Path,
    config: &MigratorConfig,
) -> Result<MigrationPlan> {
    let envelope = load_envelope(path, config.baseline_version)?;
    Ok(registry.plan(envelope.version))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::core::version::{BASELINE_VERSION, CURRENT_VERSION};
    use crate::io::store::backup_path;
    use crate::test_support::{TestStore, state};

    #[test]
    fn migrates_file_and_tags_current_version() {
        let store = TestStore::new().expect("store");
        let path = store
            .write_envelope(Some(7), json!({"rfqs": [{"id": "r1"}]}))
            .expect("seed");

        let outcome = migrate_file(
            &Registry::builtin(),
            &path,
            &MigratorConfig::default(),
            &MigrateOptions::default(),
        )
        .expect("migrate");

        let MigrateOutcome::Migrated { report, written } = outcome else {
            panic!("expected migration");
        };
        assert!(written);
        assert_eq!(report.applied, vec![8, 9]);

        let loaded = load_envelope(&path, BASELINE_VERSION).expect("load");
        assert_eq!(loaded.version, CURRENT_VERSION);
        assert_eq!(loaded.state["rfqs"][0]["items"], json!([]));
        assert!(backup_path(&path).exists());
    }

    #[test]
    fn missing_version_starts_at_configured_baseline() {
        let store = TestStore::new().expect("store");
        let path = store
            .write_envelope(None, json!({"users": [{"userId": "u1", "permissions": {}}]}))
            .expect("seed");
        let config = MigratorConfig {
            baseline_version: 4,
            backup: false,
            ..MigratorConfig::default()
        };

        let plan = plan_file(&Registry::builtin(), &path, &config).expect("plan");
        assert_eq!(plan.from, 4);
        assert_eq!(plan.step_versions(), vec![5, 8, 9]);

        migrate_file(&Registry::builtin(), &path, &config, &MigrateOptions::default())
            .expect("migrate");
        assert!(!backup_path(&path).exists());
        let loaded = load_envelope(&path, 1).expect("load");
        // v3 never ran, so `roles` was not introduced.
        assert!(!loaded.state.contains_key("roles"));
        assert_eq!(loaded.state["currentUserId"], json!("u_sales"));
    }

    #[test]
    fn bare_state_file_is_rejected_not_rewritten() {
        let store = TestStore::new().expect("store");
        let path = store.path().join("legacy.json");
        let blob = "{\"services\": [{\"id\": \"s-keep\"}], \"rfqs\": [{\"id\": \"r1\"}]}\n";
        fs::write(&path, blob).expect("seed");
        let config = MigratorConfig {
            backup: false,
            ..MigratorConfig::default()
        };

        let err = migrate_file(&Registry::builtin(), &path, &config, &MigrateOptions::default())
            .expect_err("not an envelope");
        assert!(format!("{err:#}").contains("unknown field"), "{err:#}");
        assert_eq!(fs::read_to_string(&path).expect("read"), blob);
    }

    #[test]
    fn rewrite_keeps_key_order() {
        let store = TestStore::new().expect("store");
        let path = store
            .write_envelope(
                Some(1),
                json!({"zeta": 1, "services": [{"name": "Print", "id": "s-keep"}], "alpha": 2}),
            )
            .expect("seed");

        migrate_file(&Registry::builtin(), &path, &MigratorConfig::default(), &MigrateOptions::default())
            .expect("migrate");

        let written = fs::read_to_string(&path).expect("read");
        let position = |needle: &str| written.find(needle).expect(needle);
        assert!(position("\"zeta\"") < position("\"services\""));
        assert!(position("\"services\"") < position("\"alpha\""));
        assert!(position("\"name\"") < position("\"id\""));
    }

    #[test]
    fn dry_run_leaves_file_untouched() {
        let store = TestStore::new().expect("store");
        let path = store
            .write_envelope(Some(1), json!({"services": [{"id": "s-print-1"}]}))
            .expect("seed");
        let before = fs::read_to_string(&path).expect("read");

        let outcome = migrate_file(
            &Registry::builtin(),
            &path,
            &MigratorConfig::default(),
            &MigrateOptions { dry_run: true },
        )
        .expect("migrate");

        assert!(matches!(
            outcome,
            MigrateOutcome::Migrated { written: false, .. }
        ));
        assert_eq!(fs::read_to_string(&path).expect("read"), before);
    }

    #[test]
    fn ahead_and_current_files_are_untouched() {
        let store = TestStore::new().expect("store");
        let ahead = store
            .write_envelope(Some(CURRENT_VERSION + 1), json!({"x": 1}))
            .expect("seed");
        let outcome = migrate_file(
            &Registry::builtin(),
            &ahead,
            &MigratorConfig::default(),
            &MigrateOptions::default(),
        )
        .expect("migrate");
        assert_eq!(
            outcome,
            MigrateOutcome::Ahead {
                stored: CURRENT_VERSION + 1,
                current: CURRENT_VERSION,
            }
        );
        assert_eq!(load_envelope(&ahead, 1).expect("load").version, CURRENT_VERSION + 1);

        let current = store
            .write_envelope(Some(CURRENT_VERSION), json!({"x": 1}))
            .expect("seed");
        let outcome = migrate_file(
            &Registry::builtin(),
            &current,
            &MigratorConfig::default(),
            &MigrateOptions::default(),
        )
        .expect("migrate");
        assert_eq!(
            outcome,
            MigrateOutcome::UpToDate {
                version: CURRENT_VERSION
            }
        );
        assert!(!backup_path(&current).exists());
    }

    #[test]
    fn template_fills_fields_after_migration() {
        let registry = Registry::builtin();
        let template = state(json!({"settings": {"themeMode": "dark"}, "events": ["ignored"]}));
        let envelope = Envelope {
            version: 7,
            state: State::new(),
        };

        let (migrated, _) = migrate_envelope(&registry, envelope, Some(&template));
        assert_eq!(migrated.version, CURRENT_VERSION);
        assert_eq!(migrated.state["settings"], json!({"themeMode": "dark"}));
        // v8 created `events`, so the template does not override it.
        assert_eq!(migrated.state["events"], json!([]));
    }

    #[test]
    fn template_path_from_config_is_loaded() {
        let store = TestStore::new().expect("store");
        let path = store.write_envelope(Some(12), json!({})).expect("seed");
        let template_path = store.path().join("defaults.json");
        fs::write(&template_path, r#"{"adminPin": "1234"}"#).expect("template");
        let config = MigratorConfig {
            defaults_path: Some(template_path),
            ..MigratorConfig::default()
        };

        migrate_file(&Registry::builtin(), &path, &config, &MigrateOptions::default())
            .expect("migrate");
        let loaded = load_envelope(&path, 1).expect("load");
        assert_eq!(loaded.state["adminPin"], json!("1234"));
    }
}
