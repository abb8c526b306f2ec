//! Variable paths and namespaces
//!
//! A placeholder's dotted path selects a namespace with its first segment
//! (`query` or `this`) and walks the namespace value with the rest.

use crate::error::TemplateError;
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Namespace root selected by the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Settled query results, keyed by query id
    Query,
    /// Submitted form values, keyed by field id
    This,
}

impl Namespace {
    /// Root name used in placeholders
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::This => "this",
        }
    }

    fn from_root(root: &str) -> Option<Self> {
        match root {
            "query" => Some(Self::Query),
            "this" => Some(Self::This),
            _ => None,
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed dotted path such as `query.user.data.accountBalance`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariablePath {
    raw: String,
    namespace: Option<Namespace>,
    segments: Vec<String>,
}

impl VariablePath {
    /// Parse dotted path
    ///
    /// Surrounding `{{ }}` and whitespace are ignored, so both
    /// `query.user` and `{{ query.user }}` name the same variable.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut trimmed = raw.trim();
        if let Some(inner) = trimmed
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
        {
            trimmed = inner.trim();
        }

        let mut parts = trimmed.split('.');
        let namespace = parts.next().and_then(Namespace::from_root);
        Self {
            raw: trimmed.to_string(),
            namespace,
            segments: parts.map(|s| s.trim().to_string()).collect(),
        }
    }

    /// Path as written (without braces)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Namespace root, `None` for unknown roots
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<Namespace> {
        self.namespace
    }

    /// Segments after the namespace root
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Display for VariablePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Read-only namespaces visible at one point of the page
///
/// A namespace that is `None` is not available there; referencing it is a
/// reference error. Cloning is cheap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    query: Option<Arc<Value>>,
    this: Option<Arc<Value>>,
}

impl Scope {
    /// Scope with no namespace available
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// With `query` namespace
    #[inline]
    #[must_use]
    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = Some(Arc::new(Value::Object(query)));
        self
    }

    /// With `this` namespace
    #[inline]
    #[must_use]
    pub fn with_this(mut self, this: Map<String, Value>) -> Self {
        self.this = Some(Arc::new(Value::Object(this)));
        self
    }

    /// Scope whose `query` namespace also contains `entries`
    ///
    /// Used by nested query-providers: inner results shadow outer ones with
    /// the same id.
    #[must_use]
    pub fn extend_query(&self, entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut map = match self.query.as_deref() {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        map.extend(entries);
        Self {
            query: Some(Arc::new(Value::Object(map))),
            this: self.this.clone(),
        }
    }

    /// Check if namespace is available
    #[inline]
    #[must_use]
    pub fn has(&self, namespace: Namespace) -> bool {
        self.root(namespace).is_some()
    }

    /// Namespace value, if available
    #[must_use]
    pub fn root(&self, namespace: Namespace) -> Option<&Value> {
        match namespace {
            Namespace::Query => self.query.as_deref(),
            Namespace::This => self.this.as_deref(),
        }
    }

    /// Resolve a path to the value it points to
    ///
    /// Objects are indexed by key and arrays by decimal index.
    ///
    /// # Errors
    /// Returns a reference error if the namespace is unknown or unavailable
    /// or if any segment does not resolve
    pub fn lookup(&self, path: &VariablePath) -> Result<&Value, TemplateError> {
        let namespace = path
            .namespace()
            .ok_or_else(|| TemplateError::not_found(path.as_str()))?;
        let mut current =
            self.root(namespace)
                .ok_or_else(|| TemplateError::NamespaceUnavailable {
                    path: path.as_str().to_string(),
                    namespace,
                })?;

        for segment in path.segments() {
            current = match current {
                Value::Object(map) => map.get(segment.as_str()),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }
            .ok_or_else(|| TemplateError::not_found(path.as_str()))?;
        }
        Ok(current)
    }
}
