//! Extraction of the variable names a template refers to.
//!
//! Three surface syntaxes are recognised, scanned in this order:
//!
//! - double-brace expressions: `{{ name }}`, `{{ name|upper }}`, `{{ user.name.title() }}`
//! - single-brace placeholders: `{name}`
//! - control blocks: `{% for item in items|sort %}` (only `word|` tokens are harvested)
//!
//! Only the root identifier before any `|` or `.` is kept. Names are unique,
//! ordered by first appearance, and never include a [`BUILTIN_NAMES`] entry.
//!
//! ```rust
//! use format_string::variables::extract_variables;
//!
//! let vars = extract_variables("Hello {name}, it is {{ now() }} and {{ user.email }}");
//! assert_eq!(vars, vec!["user", "name"]);
//! ```

use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Names injected into every sandboxed render. Never reported as variables.
pub const BUILTIN_NAMES: [&str; 4] = ["datetime", "now", "random", "math"];

const CONTROL_KEYWORDS: [&str; 5] = ["if", "else", "elif", "for", "in"];

#[allow(clippy::expect_used)]
static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([\w.]+)(?:\|[\w\s]+)?(?:\.[^()]+\(\))?\s*\}\}")
        .expect("expression pattern must compile")
});

#[allow(clippy::expect_used)]
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern must compile"));

#[allow(clippy::expect_used)]
static CONTROL_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%.*?%\}").expect("control block pattern must compile"));

#[allow(clippy::expect_used)]
static PIPED_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\|\b").expect("piped token pattern must compile"));

/// Returns true when `name` is provided by the sandboxed built-in context.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Reduces a reference such as `user.name|upper` to its root identifier.
fn root_name(reference: &str) -> &str {
    let before_filter = reference.split('|').next().unwrap_or(reference);
    before_filter
        .split('.')
        .next()
        .unwrap_or(before_filter)
        .trim()
}

/// Ordered, de-duplicating accumulator for discovered names.
#[derive(Debug, Default)]
struct VariableSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl VariableSet {
    fn add(&mut self, reference: &str) {
        let name = root_name(reference);
        if name.is_empty() || is_builtin(name) || self.seen.contains(name) {
            return;
        }
        self.seen.insert(name.to_string());
        self.ordered.push(name.to_string());
    }
}

/// Extracts the unique variable names referenced by `template`, in discovery order.
///
/// Malformed or unbalanced brace syntax simply produces no match; this never fails.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut vars = VariableSet::default();

    for captures in EXPRESSION_RE.captures_iter(template) {
        if let Some(m) = captures.get(1) {
            vars.add(m.as_str());
        }
    }

    for captures in PLACEHOLDER_RE.captures_iter(template) {
        if let Some(m) = captures.get(1) {
            vars.add(m.as_str());
        }
    }

    for block in CONTROL_BLOCK_RE.find_iter(template) {
        for captures in PIPED_TOKEN_RE.captures_iter(block.as_str()) {
            let Some(m) = captures.get(1) else { continue };
            let token = m.as_str();
            if token.starts_with("end") || CONTROL_KEYWORDS.contains(&token) {
                continue;
            }
            vars.add(token);
        }
    }

    debug!("Extracted variables {:?}", vars.ordered);
    vars.ordered
}

/// Returns true when the template text mentions any built-in helper name.
///
/// This is a plain substring test, so `known` counts as mentioning `now`.
pub fn mentions_builtin(template: &str) -> bool {
    BUILTIN_NAMES.iter().any(|name| template.contains(name))
}
