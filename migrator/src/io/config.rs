//! Migrator configuration stored in `migrator.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::version::{BASELINE_VERSION, CURRENT_VERSION, Version};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "migrator.toml";

/// Migrator configuration (TOML).
///
/// Missing fields default to values that match data written by the earliest
/// releases.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MigratorConfig {
    /// Version assumed when a state file carries no `version` field.
    pub baseline_version: Version,

    /// JSON default-state template merged into migrated state.
    pub defaults_path: Option<PathBuf>,

    /// Keep a `.bak` copy of the previous state file when rewriting it.
    pub backup: bool,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            baseline_version: BASELINE_VERSION,
            defaults_path: None,
            backup: true,
        }
    }
}

impl MigratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.baseline_version == 0 {
            return Err(anyhow!("baseline_version must be > 0"));
        }
        if self.baseline_version > CURRENT_VERSION {
            return Err(anyhow!(
                "baseline_version {} exceeds current version {}",
                self.baseline_version,
                CURRENT_VERSION
            ));
        }
        if let Some(path) = &self.defaults_path
            && path.as_os_str().is_empty()
        {
            return Err(anyhow!("defaults_path must not be empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MigratorConfig::default()`.
pub fn load_config(path: &Path) -> Result<MigratorConfig> {
    if !path.exists() {
        let cfg = MigratorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MigratorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
