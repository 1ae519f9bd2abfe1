//! Sandboxed Jinja-style rendering backed by `minijinja`.

use super::builtins;
use crate::error::FormatError;
use log::{debug, warn};
use minijinja::{Environment, ErrorKind};
use std::collections::BTreeMap;

/// Prefix of the output produced when a template fails to parse.
pub const SYNTAX_ERROR_PREFIX: &str = "Error in Jinja2 template: ";

/// Renders Jinja-style templates with the built-in helpers available.
///
/// `minijinja` has no access to the host beyond the values it is given, so a
/// template can only read the caller's values and the helpers in [`builtins`].
/// Caller values shadow helpers of the same name.
#[derive(Debug)]
pub struct SandboxRenderer {
    env: Environment<'static>,
}

impl Default for SandboxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that Jinja reports as template syntax problems rather than runtime failures.
fn is_syntax_error(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::SyntaxError | ErrorKind::UnknownFilter | ErrorKind::UnknownTest
    )
}

impl SandboxRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        builtins::register(&mut env);
        Self { env }
    }

    /// Renders `template` against `values`.
    ///
    /// Syntax errors are not returned as errors: the rendered output becomes a
    /// message starting with [`SYNTAX_ERROR_PREFIX`]. Any other failure is
    /// returned as [`FormatError::Render`].
    pub fn render(
        &self,
        template: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<String, FormatError> {
        debug!("Rendering sandboxed template with {} values", values.len());
        match self.env.render_str(template, values) {
            Ok(rendered) => Ok(rendered),
            Err(e) if is_syntax_error(e.kind()) => {
                warn!("Template syntax error: {}", e);
                Ok(format!("{SYNTAX_ERROR_PREFIX}{e}"))
            }
            Err(e) => Err(FormatError::Render(e)),
        }
    }
}
