//! Path templates with `{}` / `{0}` / `{name}` placeholders.
//!
//! Templates are parsed once, when a call is constructed, so malformed
//! templates fail at setup time rather than on the first request.
//!
//! Syntax:
//!
//! - `{}` takes the next positional argument (auto-numbered)
//! - `{0}`, `{1}` take a positional argument by index
//! - `{name}` takes the named argument `name`
//! - `{{` and `}}` are literal braces
//!
//! Auto-numbered and indexed placeholders cannot be mixed in one template.
//! String values are substituted verbatim; other JSON values use their JSON
//! text (`2`, `true`, `null`).

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::types::CallArgs;
use crate::{MemogateError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Positional(usize),
    Named(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
    names: BTreeSet<String>,
}

impl PathTemplate {
    /// Parse a template string.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut names = BTreeSet::new();
        let mut literal = String::new();
        let mut next_auto = 0usize;
        let mut numbering: Option<bool> = None; // Some(true) = auto, Some(false) = manual
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(template_error(source, pos, "single '}' encountered"));
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((p, '{')) => {
                                return Err(template_error(source, p, "nested '{' in placeholder"));
                            }
                            Some((_, ch)) => field.push(ch),
                            None => {
                                return Err(template_error(source, pos, "unclosed placeholder"));
                            }
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }

                    let segment = if field.is_empty() {
                        if numbering == Some(false) {
                            return Err(template_error(
                                source,
                                pos,
                                "cannot mix automatic and manual positional numbering",
                            ));
                        }
                        numbering = Some(true);
                        next_auto += 1;
                        Segment::Positional(next_auto - 1)
                    } else if field.bytes().all(|b| b.is_ascii_digit()) {
                        if numbering == Some(true) {
                            return Err(template_error(
                                source,
                                pos,
                                "cannot mix automatic and manual positional numbering",
                            ));
                        }
                        numbering = Some(false);
                        let index = field
                            .parse()
                            .map_err(|_| template_error(source, pos, "positional index too large"))?;
                        Segment::Positional(index)
                    } else if is_identifier(&field) {
                        names.insert(field.clone());
                        Segment::Named(field)
                    } else {
                        return Err(template_error(
                            source,
                            pos,
                            &format!("unsupported placeholder '{{{field}}}'"),
                        ));
                    };
                    segments.push(segment);
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            names,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the `{name}` placeholders.
    ///
    /// Named arguments with these names are consumed by the path and never
    /// reach the payload.
    pub fn field_names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Whether the template has any placeholders.
    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s, Segment::Literal(_)))
    }

    /// Substitute arguments into the template.
    pub fn render(&self, args: &CallArgs) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Positional(index) => {
                    let value = args.positional().get(*index).ok_or_else(|| {
                        MemogateError::Template(format!(
                            "'{}' needs positional argument {index}, got {}",
                            self.source,
                            args.positional().len()
                        ))
                    })?;
                    push_value(&mut out, value);
                }
                Segment::Named(name) => {
                    let value = args.named_args().get(name).ok_or_else(|| {
                        MemogateError::Template(format!(
                            "'{}' needs named argument '{name}'",
                            self.source
                        ))
                    })?;
                    push_value(&mut out, value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

fn is_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn template_error(source: &str, pos: usize, reason: &str) -> MemogateError {
    MemogateError::Template(format!("'{source}' at byte {pos}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_template_renders_unchanged() {
        let t = PathTemplate::parse("status/404").unwrap();
        assert!(!t.has_placeholders());
        assert_eq!(t.render(&CallArgs::new()).unwrap(), "status/404");
    }

    #[test]
    fn named_placeholder() {
        let t = PathTemplate::parse("delay/{n}").unwrap();
        assert!(t.field_names().contains("n"));
        assert_eq!(t.render(&CallArgs::new().named("n", 2)).unwrap(), "delay/2");
    }

    #[test]
    fn indexed_placeholder_in_query_string() {
        let t = PathTemplate::parse("anything?thing={0}").unwrap();
        assert_eq!(
            t.render(&CallArgs::new().arg("flask")).unwrap(),
            "anything?thing=flask"
        );
    }

    #[test]
    fn auto_numbered_placeholders() {
        let t = PathTemplate::parse("repos/{}/{}").unwrap();
        let args = CallArgs::new().arg("rust-lang").arg("rust");
        assert_eq!(t.render(&args).unwrap(), "repos/rust-lang/rust");
    }

    #[test]
    fn escaped_braces() {
        let t = PathTemplate::parse("raw/{{literal}}/{id}").unwrap();
        assert_eq!(t.field_names().len(), 1);
        assert_eq!(
            t.render(&CallArgs::new().named("id", "x")).unwrap(),
            "raw/{literal}/x"
        );
    }

    #[test]
    fn mixed_numbering_rejected() {
        assert!(PathTemplate::parse("{}/{0}").is_err());
        assert!(PathTemplate::parse("{1}/{}").is_err());
    }

    #[test]
    fn malformed_templates_rejected() {
        assert!(PathTemplate::parse("items/{id").is_err());
        assert!(PathTemplate::parse("items/id}").is_err());
        assert!(PathTemplate::parse("items/{a.b}").is_err());
        assert!(PathTemplate::parse("items/{n:03}").is_err());
    }

    #[test]
    fn missing_arguments_are_errors() {
        let t = PathTemplate::parse("books/{category}/{0}").unwrap();
        let err = t.render(&CallArgs::new().arg("x")).unwrap_err();
        assert!(err.to_string().contains("category"));

        let err = t
            .render(&CallArgs::new().named("category", "novels"))
            .unwrap_err();
        assert!(err.to_string().contains("positional argument 0"));
    }

    #[test]
    fn non_string_values_use_json_text() {
        let t = PathTemplate::parse("flags/{on}/{off}").unwrap();
        let args = CallArgs::new().named("on", true).named("off", serde_json::Value::Null);
        assert_eq!(t.render(&args).unwrap(), "flags/true/null");
    }
}
