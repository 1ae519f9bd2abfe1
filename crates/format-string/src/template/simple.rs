//! Simple `{name}` placeholder substitution.

use crate::error::FormatError;
use std::collections::BTreeMap;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Length of a `{{ ... }}` or `{% ... %}` span at the start of `text`, closing delimiter included.
fn verbatim_span(text: &str) -> Option<usize> {
    let close = if text.starts_with("{{") {
        "}}"
    } else if text.starts_with("{%") {
        "%}"
    } else {
        return None;
    };
    // Unterminated spans still count as their two opening characters.
    Some(text[2..].find(close).map_or(2, |end| 2 + end + close.len()))
}

/// Parses a `{name}` placeholder at the start of `text`, returning the name and span length.
fn placeholder(text: &str) -> Option<(&str, usize)> {
    let inner = text.strip_prefix('{')?;
    let name_len = inner
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(inner.len(), |(i, _)| i);
    if name_len == 0 || !inner[name_len..].starts_with('}') {
        return None;
    }
    Some((&inner[..name_len], name_len + 2))
}

/// Substitutes every `{name}` in `template` with its value.
///
/// `{{ ... }}` and `{% ... %}` spans are copied unchanged and any other brace
/// is literal text.
///
/// # Errors
///
/// Returns [`FormatError::MissingKey`] for the first placeholder without a value.
///
/// ```rust
/// use format_string::template::render_simple;
/// use std::collections::BTreeMap;
///
/// let values = BTreeMap::from([("name".to_string(), "Ann".to_string())]);
/// let out = render_simple("Hello {name}, today is {{ now() }}", &values).unwrap();
/// assert_eq!(out, "Hello Ann, today is {{ now() }}");
/// ```
pub fn render_simple(
    template: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(len) = verbatim_span(tail) {
            out.push_str(&tail[..len]);
            rest = &tail[len..];
        } else if let Some((name, len)) = placeholder(tail) {
            let value = values
                .get(name)
                .ok_or_else(|| FormatError::MissingKey(name.to_string()))?;
            out.push_str(value);
            rest = &tail[len..];
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_placeholders() {
        let out = render_simple("{a}-{b}-{a}", &values(&[("a", "1"), ("b", "2")])).unwrap();
        assert_eq!(out, "1-2-1");
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = render_simple("Hi {who}", &values(&[])).unwrap_err();
        assert!(matches!(err, FormatError::MissingKey(ref k) if k == "who"));
    }

    #[test]
    fn test_jinja_spans_are_untouched() {
        let template = "{% if x %}{{ x|upper }}{% endif %} {y}";
        let out = render_simple(template, &values(&[("y", "why")])).unwrap();
        assert_eq!(out, "{% if x %}{{ x|upper }}{% endif %} why");
    }

    #[test]
    fn test_non_placeholder_braces_are_literal() {
        let out = render_simple("{ a } {} {a-b} {", &values(&[])).unwrap();
        assert_eq!(out, "{ a } {} {a-b} {");
    }

    #[test]
    fn test_unterminated_double_brace() {
        let out = render_simple("{{ open {name}", &values(&[("name", "n")])).unwrap();
        assert_eq!(out, "{{ open n");
    }

    #[test]
    fn test_unicode_text_around_placeholders() {
        let out = render_simple("héllo {名前} ✓", &values(&[("名前", "Ann")])).unwrap();
        assert_eq!(out, "héllo Ann ✓");
    }

    #[test]
    fn test_supplied_values_are_not_rescanned() {
        let out = render_simple("{a}", &values(&[("a", "{b}")])).unwrap();
        assert_eq!(out, "{b}");
    }
}
