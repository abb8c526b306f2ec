//! Placeholder parsing and string interpolation
//!
//! Scans `{{ ... }}` spans. Text outside spans is copied verbatim; an
//! unterminated `{{` is literal text.

use crate::coerce::stringify;
use crate::error::TemplateError;
use crate::variable::{Scope, VariablePath};
use pagekit_block::TemplateString;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Verbatim text
    Literal(String),
    /// `{{ path }}` span
    Placeholder(VariablePath),
}

/// Parsed template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Parse raw template text
    ///
    /// Parsing never fails; malformed placeholders surface at resolution.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find(OPEN) {
            let after_open = &rest[open + OPEN.len()..];
            let Some(close) = after_open.find(CLOSE) else {
                break;
            };
            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            parts.push(Part::Placeholder(VariablePath::parse(&after_open[..close])));
            rest = &after_open[close + CLOSE.len()..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }
        Self { parts }
    }

    /// Parsed parts in order
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Check if template has no placeholder
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, Part::Literal(_)))
    }

    /// Placeholder paths in order of appearance
    #[must_use]
    pub fn references(&self) -> Vec<&VariablePath> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Placeholder(path) => Some(path),
                Part::Literal(_) => None,
            })
            .collect()
    }

    /// The only placeholder, if the template is exactly one span
    #[must_use]
    pub fn single_placeholder(&self) -> Option<&VariablePath> {
        match self.parts.as_slice() {
            [Part::Placeholder(path)] => Some(path),
            _ => None,
        }
    }

    /// Substitute every placeholder with its stringified value
    ///
    /// # Errors
    /// Returns the first reference or type error encountered
    pub fn render(&self, scope: &Scope) -> Result<String, TemplateError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Placeholder(path) => {
                    let value = scope.lookup(path)?;
                    out.push_str(&stringify(path, value)?);
                }
            }
        }
        Ok(out)
    }
}

/// Interpolate a template string against `scope`
///
/// A string without placeholders is returned unchanged whatever the scope.
///
/// # Errors
/// Returns the first reference or type error encountered
pub fn interpolate(template: &TemplateString, scope: &Scope) -> Result<String, TemplateError> {
    Template::parse(template.as_str())
        .render(scope)
        .map_err(|err| {
            tracing::debug!(template = %template, error = %err, "template resolution failed");
            err
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map, Value};

    fn scope() -> Scope {
        let Value::Object(query) = json!({
            "user": { "data": {
                "name": "Ada",
                "age": 36,
                "balance": 19.99,
                "active": true,
                "manager": null,
                "tags": ["a"],
                "address": { "city": "London" }
            }}
        }) else {
            unreachable!()
        };
        let mut this = Map::new();
        this.insert("email".to_string(), json!("ada@example.com"));
        Scope::empty().with_query(query).with_this(this)
    }

    #[test]
    fn parse_literal_only() {
        let template = Template::parse("plain text");
        assert!(template.is_literal());
        assert_eq!(template.parts(), &[Part::Literal("plain text".to_string())]);
    }

    #[test]
    fn parse_mixed() {
        let template = Template::parse("Hi {{query.user.data.name}}, you are {{ query.user.data.age }}");
        let refs: Vec<_> = template.references().iter().map(|p| p.as_str()).collect();
        assert_eq!(refs, vec!["query.user.data.name", "query.user.data.age"]);
        assert_eq!(template.parts().len(), 4);
    }

    #[test]
    fn parse_unterminated_is_literal() {
        let template = Template::parse("a {{query.x} b");
        assert!(template.is_literal());
        assert_eq!(template.render(&Scope::empty()).unwrap(), "a {{query.x} b");
    }

    #[test]
    fn single_placeholder() {
        let template = Template::parse("{{query.user.data.active}}");
        assert_eq!(
            template.single_placeholder().map(VariablePath::as_str),
            Some("query.user.data.active")
        );
        assert!(Template::parse("x{{query.a}}").single_placeholder().is_none());
    }

    #[test]
    fn interpolate_scalars() {
        let rendered = interpolate(
            &"{{query.user.data.name}} ({{query.user.data.age}}) {{query.user.data.balance}} {{query.user.data.active}} {{query.user.data.manager}}".into(),
            &scope(),
        )
        .unwrap();
        assert_eq!(rendered, "Ada (36) 19.99 true null");
    }

    #[test]
    fn interpolate_this_namespace() {
        let rendered = interpolate(&"to: {{this.email}}".into(), &scope()).unwrap();
        assert_eq!(rendered, "to: ada@example.com");
    }

    #[test]
    fn interpolate_array_fails() {
        let err = interpolate(&"{{query.user.data.tags}}".into(), &scope()).unwrap_err();
        assert!(matches!(err, TemplateError::NotStringifiable { .. }));
    }

    #[test]
    fn interpolate_object_fails() {
        let err = interpolate(&"city: {{query.user.data.address}}".into(), &scope()).unwrap_err();
        assert!(err.to_string().contains("can not be stringified"));
    }

    #[test]
    fn interpolate_missing_reference() {
        let err = interpolate(&"{{query.account.data}}".into(), &scope()).unwrap_err();
        assert_eq!(err, TemplateError::not_found("query.account.data"));
    }

    #[test]
    fn interpolate_empty_placeholder() {
        let err = interpolate(&"{{}}".into(), &scope()).unwrap_err();
        assert!(err.is_reference());
    }

    #[test]
    fn interpolate_reports_first_failure() {
        let err = interpolate(&"{{query.missing}} {{query.user.data.tags}}".into(), &scope())
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { .. }));
    }
}
