//! Error types for template resolution
//!
//! Two families:
//! - Reference errors: a placeholder does not resolve in the available scope
//! - Type errors: the resolved value does not fit the consuming property

use crate::variable::Namespace;

/// Template resolution failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Path does not resolve
    #[error("variable \"{path}\" could not be found")]
    NotFound { path: String },

    /// Namespace exists but is not available where the template is evaluated
    #[error("variable \"{path}\" uses namespace \"{namespace}\" which is not available here")]
    NamespaceUnavailable { path: String, namespace: Namespace },

    /// Boolean expected
    #[error("variable \"{path}\" is pointing to a value that is not a boolean")]
    NotBoolean { path: String },

    /// Finite number expected
    #[error("variable \"{path}\" is pointing to a value that is not a number")]
    NotNumber { path: String },

    /// Arrays and objects cannot be interpolated into text
    #[error(
        "variable \"{path}\" is pointing to a value that can not be stringified (arrays and objects are not supported)"
    )]
    NotStringifiable { path: String },

    /// Array of strings expected
    #[error("variable \"{path}\" is pointing to a value that is not an array of strings")]
    NotStringArray { path: String },

    /// ISO date expected
    #[error("value \"{value}\" is not an ISO date (YYYY-MM-DD)")]
    NotDate { value: String },
}

impl TemplateError {
    /// Create not found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Check if this is a reference error
    #[inline]
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NamespaceUnavailable { .. })
    }

    /// Check if this is a type error
    #[inline]
    #[must_use]
    pub fn is_type(&self) -> bool {
        !self.is_reference()
    }

    /// Placeholder path involved, if any
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path }
            | Self::NamespaceUnavailable { path, .. }
            | Self::NotBoolean { path }
            | Self::NotNumber { path }
            | Self::NotStringifiable { path }
            | Self::NotStringArray { path } => Some(path),
            Self::NotDate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_number_display() {
        let err = TemplateError::NotNumber {
            path: "query.user.data.accountBalance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "variable \"query.user.data.accountBalance\" is pointing to a value that is not a number"
        );
    }

    #[test]
    fn classification() {
        assert!(TemplateError::not_found("query.a").is_reference());
        assert!(TemplateError::NotBoolean { path: "this.a".into() }.is_type());
        assert_eq!(
            TemplateError::NotDate { value: "x".into() }.path(),
            None
        );
    }
}
