//! Test-only helpers for building states, recording step order and seeding
//! state files.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tempfile::TempDir;

use crate::core::types::State;
use crate::core::version::Version;

thread_local! {
    static STEP_LOG: RefCell<Vec<Version>> = const { RefCell::new(Vec::new()) };
}

/// Convert a `json!` object literal into a [`State`].
///
/// Panics on non-object values.
pub fn state(value: Value) -> State {
    match value {
        Value::Object(fields) => fields,
        other => panic!("state must be a JSON object, got {other}"),
    }
}

/// Dummy step that records `V` in the thread-local step log and appends it to
/// the state's `trail` list.
pub fn recording_step<const V: Version>(mut state: State) -> State {
    STEP_LOG.with(|log| log.borrow_mut().push(V));
    let trail = state
        .entry("trail")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = trail {
        items.push(Value::from(V));
    }
    state
}

/// Versions recorded by [`recording_step`] on this thread, in call order.
pub fn recorded_steps() -> Vec<Version> {
    STEP_LOG.with(|log| log.borrow().clone())
}

pub fn clear_recorded_steps() {
    STEP_LOG.with(|log| log.borrow_mut().clear());
}

/// Temporary directory for state-file fixtures.
pub struct TestStore {
    dir: TempDir,
    next_id: Cell<usize>,
}

impl TestStore {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        Ok(Self {
            dir,
            next_id: Cell::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a fresh state envelope and return its path.
    ///
    /// `version: None` omits the field, as in files from before versions were
    /// recorded.
    pub fn write_envelope(&self, version: Option<Version>, state: Value) -> Result<PathBuf> {
        if !state.is_object() {
            bail!("fixture state must be a JSON object");
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let path = self.dir.path().join(format!("state-{id}.json"));

        let mut envelope = Map::new();
        if let Some(version) = version {
            envelope.insert("version".to_string(), Value::from(version));
        }
        envelope.insert("state".to_string(), state);
        let mut buf = serde_json::to_string_pretty(&envelope).context("serialize fixture")?;
        buf.push('\n');
        fs::write(&path, buf).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
