//! Template dialects and rendering.
//!
//! Two dialects are supported:
//!
//! - [`TemplateType::Simple`]: `{name}` placeholders substituted from the supplied values.
//! - [`TemplateType::Jinja2`]: a sandboxed Jinja-style template rendered by `minijinja`,
//!   with the helpers in [`builtins`] available as globals.

pub mod builtins;
pub mod sandbox;
pub mod simple;

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use sandbox::SandboxRenderer;
pub use simple::render_simple;

/// The template dialect selected on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemplateType {
    #[default]
    Simple,
    Jinja2,
}

impl TemplateType {
    /// All dialects, in the order the node offers them.
    pub const ALL: [TemplateType; 2] = [TemplateType::Simple, TemplateType::Jinja2];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Simple => "Simple",
            TemplateType::Jinja2 => "Jinja2",
        }
    }

    /// The choice list exposed as the `template_type` input.
    pub fn choices() -> Vec<String> {
        Self::ALL.iter().map(|t| t.as_str().to_string()).collect()
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Simple" => Ok(TemplateType::Simple),
            "Jinja2" => Ok(TemplateType::Jinja2),
            other => Err(FormatError::UnknownTemplateType(other.to_string())),
        }
    }
}

/// Renders `template` in the selected dialect.
///
/// Simple templates fail on missing keys. Jinja2 syntax errors are reported
/// inside the returned string; other Jinja2 failures are returned as errors.
pub fn render(
    renderer: &SandboxRenderer,
    template_type: TemplateType,
    template: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, FormatError> {
    match template_type {
        TemplateType::Simple => render_simple(template, values),
        TemplateType::Jinja2 => renderer.render(template, values),
    }
}
