//! Saved node state files.
//!
//! A render can persist its template and inputs as pretty-printed JSON with
//! sorted keys:
//!
//! ```json
//! {
//!   "inputs": {
//!     "name": "Ann"
//!   },
//!   "template": "Hello {name}",
//!   "template_type": "Simple"
//! }
//! ```
//!
//! Saving and loading are best-effort. Neither ever fails the caller; the
//! outcome enums say what happened.

use crate::error::StateError;
use crate::template::TemplateType;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The document written to disk after a render.
///
/// Field order is alphabetical so the serialized keys come out sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    pub inputs: BTreeMap<String, String>,
    pub template: String,
    pub template_type: TemplateType,
}

impl SavedState {
    /// Builds the state for a render, keeping only the template's variables.
    ///
    /// Variables without a supplied value are recorded as empty strings.
    pub fn new(
        template_type: TemplateType,
        template: impl Into<String>,
        variables: &[String],
        values: &BTreeMap<String, String>,
    ) -> Self {
        let inputs = variables
            .iter()
            .map(|name| (name.clone(), values.get(name).cloned().unwrap_or_default()))
            .collect();
        Self {
            inputs,
            template: template.into(),
            template_type,
        }
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What happened to the optional save step of a render.
#[derive(Debug)]
pub enum SaveOutcome {
    /// The state was written to this path.
    Saved(PathBuf),
    /// No save path was given.
    Skipped,
    /// Writing failed; the render itself still succeeded.
    Failed { path: PathBuf, error: StateError },
}

impl SaveOutcome {
    /// The path reported on the node's `saved_file_path` output; empty unless saved.
    pub fn saved_file_path(&self) -> String {
        match self {
            SaveOutcome::Saved(path) => path.display().to_string(),
            SaveOutcome::Skipped | SaveOutcome::Failed { .. } => String::new(),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// Writes `state` to `path`, creating missing parent directories.
pub fn write_state(path: &Path, state: &SavedState) -> Result<(), StateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, state.to_json()?)?;
    Ok(())
}

/// Saves `state` under `output_dir` when `save_path` is non-empty.
///
/// Relative save paths are resolved against `output_dir`; absolute ones are used as-is.
pub fn save_state(output_dir: &Path, save_path: &str, state: &SavedState) -> SaveOutcome {
    if save_path.is_empty() {
        debug!("No save_path provided, node state not saved");
        return SaveOutcome::Skipped;
    }

    let path = output_dir.join(save_path);
    match write_state(&path, state) {
        Ok(()) => {
            info!("Node state saved to: {}", path.display());
            SaveOutcome::Saved(path)
        }
        Err(error) => {
            warn!("Error saving node state to {}: {}", path.display(), error);
            SaveOutcome::Failed { path, error }
        }
    }
}

/// What happened when loading a state file.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(SavedState),
    /// The file does not exist. Not an error.
    NotFound,
    Failed(StateError),
}

impl LoadOutcome {
    pub fn state(&self) -> Option<&SavedState> {
        match self {
            LoadOutcome::Loaded(state) => Some(state),
            _ => None,
        }
    }

    /// The JSON document returned to the editor: the state, or `{}`.
    pub fn into_document(self) -> serde_json::Value {
        match self {
            LoadOutcome::Loaded(state) => serde_json::to_value(state)
                .unwrap_or_else(|_| serde_json::Value::Object(Default::default())),
            LoadOutcome::NotFound | LoadOutcome::Failed(_) => {
                serde_json::Value::Object(Default::default())
            }
        }
    }
}

fn read_state(path: &Path) -> Result<SavedState, StateError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Loads a state file previously written by [`save_state`].
pub fn load_state(path: impl AsRef<Path>) -> LoadOutcome {
    let path = path.as_ref();
    match read_state(path) {
        Ok(state) => LoadOutcome::Loaded(state),
        Err(e) if e.is_not_found() => {
            debug!("No node state at {}", path.display());
            LoadOutcome::NotFound
        }
        Err(e) => {
            warn!("Error loading node state from {}: {}", path.display(), e);
            LoadOutcome::Failed(e)
        }
    }
}
