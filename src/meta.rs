//! MetaStore (C12): persists the working-copy state under a hidden control
//! directory at the working-copy root (§4.12, §6.2).

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::EngineError;
use crate::types::{BranchRef, LastRun, ValRef, WorkingCopyState};

/// Hidden control directory name at the working-copy root.
pub const META_DIR: &str = ".vt";

pub struct MetaStore {
    root: PathBuf,
}

impl MetaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn control_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.control_dir().join("state.json")
    }

    pub fn ignore_file_path(&self) -> PathBuf {
        self.control_dir().join("ignore")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.control_dir().join("lock")
    }

    pub fn local_ignore_file(&self) -> PathBuf {
        self.root.join(".vtignore")
    }

    /// Working-copy-level config override (§9 "two-tier configuration").
    pub fn local_config_path(&self) -> PathBuf {
        self.control_dir().join("config.toml")
    }

    /// Returns the current state, transparently migrating and rewriting a
    /// legacy schema (a `project` object instead of `val`) on read.
    pub fn load_state(&self) -> Result<WorkingCopyState, EngineError> {
        let raw = std::fs::read_to_string(self.state_path())?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| EngineError::InvalidSchema { message: e.to_string() })?;

        let (state, migrated) = parse_or_migrate(value)?;
        if migrated {
            self.save_state(&state)?;
        }
        Ok(state)
    }

    /// Atomically replaces `state.json` (write-to-temp then rename).
    pub fn save_state(&self, state: &WorkingCopyState) -> Result<(), EngineError> {
        std::fs::create_dir_all(self.control_dir())?;
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| EngineError::programmer(e.to_string()))?;

        let tmp_path = self.control_dir().join("state.json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, self.state_path())?;
        Ok(())
    }

    /// Loads state, passes a mutable reference to `f`, and persists on
    /// success.
    pub fn do_with_state(
        &self,
        f: impl FnOnce(&mut WorkingCopyState) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        let mut state = self.load_state()?;
        f(&mut state)?;
        self.save_state(&state)
    }

    pub fn init_state(&self, val_id: uuid::Uuid, branch_id: uuid::Uuid, version: u64) -> Result<(), EngineError> {
        self.save_state(&WorkingCopyState {
            val: ValRef { id: val_id },
            branch: BranchRef { id: branch_id, version },
            last_run: None,
        })
    }

    pub fn exists(&self) -> bool {
        self.state_path().is_file()
    }
}

/// Schema migration rule (mandatory, §4.12): a state file containing a
/// `project` object is rewritten to rename that object to `val`, dropping
/// `project`.
fn parse_or_migrate(mut value: Value) -> Result<(WorkingCopyState, bool), EngineError> {
    let migrated = if let Some(obj) = value.as_object_mut() {
        if let Some(project) = obj.remove("project") {
            obj.insert("val".to_string(), project);
            true
        } else {
            false
        }
    } else {
        false
    };

    let state: WorkingCopyState = serde_json::from_value(value)
        .map_err(|e| EngineError::InvalidSchema { message: e.to_string() })?;
    Ok((state, migrated))
}

/// Best-effort send of a termination signal to a previously recorded
/// watcher PID. "No such process" outcomes are ignored (§4.11 step 1).
#[cfg(unix)]
pub fn terminate_previous_watcher(last_run: Option<&LastRun>) {
    let Some(last_run) = last_run else { return };
    let pid = nix::unistd::Pid::from_raw(last_run.pid as i32);
    let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
}

#[cfg(not(unix))]
pub fn terminate_previous_watcher(_last_run: Option<&LastRun>) {}

pub fn global_ignore_file_for(root: &Path) -> PathBuf {
    MetaStore::new(root).ignore_file_path()
}
