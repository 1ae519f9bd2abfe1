//! Error types for template rendering and saved node state.

use thiserror::Error;

/// Errors that can occur while rendering a template.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A `{name}` placeholder in a simple template had no supplied value.
    #[error("Missing value for placeholder '{0}'")]
    MissingKey(String),

    /// The template type selector was not one of the supported dialects.
    #[error("Unknown template type: '{0}' (expected 'Simple' or 'Jinja2')")]
    UnknownTemplateType(String),

    /// The sandboxed engine failed while evaluating an otherwise valid template.
    #[error("Template rendering failed: {0}")]
    Render(#[from] minijinja::Error),
}

/// Errors that can occur while reading or writing a saved state file.
#[derive(Debug, Error)]
pub enum StateError {
    /// I/O error while touching the state file or its parent directories.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file could not be serialized or parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StateError {
    /// Check if this error means the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StateError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
