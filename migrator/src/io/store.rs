//! Versioned state file storage.
//!
//! A state file is a JSON envelope `{"version": <u32>, "state": {...}}`. Files
//! written before versions were recorded may lack `version`; the caller
//! supplies the baseline to assume. Any other top-level key means the file is
//! not an envelope and loading fails.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::types::State;
use crate::core::version::Version;

/// Persisted state tagged with the schema version it conforms to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope {
    pub version: Version,
    pub state: State,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnvelope {
    #[serde(default)]
    version: Option<Version>,
    #[serde(default)]
    state: Option<Value>,
}

/// Load a state envelope from disk.
///
/// A missing or `null` `version` becomes `baseline`; a missing or `null`
/// `state` becomes an empty object.
pub fn load_envelope(path: &Path, baseline: Version) -> Result<Envelope> {
    debug!(path = %path.display(), "loading state envelope");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read state {}", path.display()))?;
    let envelope = parse_envelope(&contents, baseline)
        .with_context(|| format!("parse state {}", path.display()))?;
    debug!(version = envelope.version, fields = envelope.state.len(), "state envelope loaded");
    Ok(envelope)
}

fn parse_envelope(contents: &str, baseline: Version) -> Result<Envelope> {
    let raw: RawEnvelope = serde_json::from_str(contents)?;
    let state = match raw.state {
        None | Some(Value::Null) => State::new(),
        Some(Value::Object(fields)) => fields,
        Some(other) => bail!("state must be a JSON object, found {}", kind(&other)),
    };
    Ok(Envelope {
        version: raw.version.unwrap_or(baseline),
        state,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Atomically write an envelope to disk (temp file + rename).
///
/// With `backup`, an existing file is first copied to `<path>.bak`.
pub fn write_envelope(path: &Path, envelope: &Envelope, backup: bool) -> Result<()> {
    debug!(path = %path.display(), version = envelope.version, backup, "writing state envelope");
    if backup && path.exists() {
        let copy = backup_path(path);
        fs::copy(path, &copy).with_context(|| format!("back up state to {}", copy.display()))?;
    }
    let mut buf = serde_json::to_string_pretty(envelope)?;
    buf.push('\n');
    write_atomic(path, &buf)
}

/// Location of the backup copy kept by [`write_envelope`].
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    name.into()
}

/// Load a default-state template (a JSON object).
pub fn load_template(path: &Path) -> Result<State> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read template {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse template {}", path.display()))?;
    match value {
        Value::Object(fields) => Ok(fields),
        other => bail!(
            "template {} must be a JSON object, found {}",
            path.display(),
            kind(&other)
        ),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("state path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp state {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace state {}", path.display()))?;
    Ok(())
}
