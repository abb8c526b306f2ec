//! Template strings stored in block properties

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// String that may embed `{{namespace.dotted.path}}` placeholders
///
/// Stored verbatim; placeholders are resolved at render or submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateString(String);

impl TemplateString {
    /// Wrap raw template text
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw template text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if template text is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for TemplateString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateString {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for TemplateString {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
