//! Error types for the page runtime
//!
//! Combines the failures of every layer and classifies them:
//! - Reference / Type: template resolution
//! - Validation: required fields missing, or the form already submitting
//! - Network: query or mutation calls
//! - Decoding: submitted names the form engine did not produce
//! - Edit: block paths that do not address a block, invalid documents

use crate::config::ConfigError;
use pagekit_block::{BlockPath, DocumentError, EditError};
use pagekit_form::FormError;
use pagekit_procedure::ProcedureError;
use pagekit_template::TemplateError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Classification of a runtime failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Reference,
    Type,
    Validation,
    Network,
    Decoding,
    Edit,
    Config,
    Cancelled,
}

impl ErrorKind {
    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Type => "type",
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Decoding => "decoding",
            Self::Edit => "edit",
            Self::Config => "config",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main runtime error type
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Template resolution failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Query or mutation failed
    #[error(transparent)]
    Procedure(#[from] ProcedureError),

    /// Submitted name could not be decoded
    #[error(transparent)]
    Form(#[from] FormError),

    /// Block path did not address a block
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Document has invalid or duplicate ids
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Required fields were left empty
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Block at path is not a form
    #[error("block at \"{0}\" is not a form")]
    NotAForm(BlockPath),

    /// A submission of the same form has not finished
    #[error("form is already submitting")]
    InFlight,

    /// Form was unmounted or the page closed before the mutation finished
    #[error("form unmounted before the mutation finished")]
    Cancelled,
}

impl RuntimeError {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Template(err) | Self::Procedure(ProcedureError::Template(err)) => {
                template_kind(err)
            }
            Self::Procedure(_) => ErrorKind::Network,
            Self::Form(_) => ErrorKind::Decoding,
            Self::Edit(_) | Self::Document(_) | Self::NotAForm(_) => ErrorKind::Edit,
            Self::Config(_) => ErrorKind::Config,
            Self::MissingFields(_) | Self::InFlight => ErrorKind::Validation,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

fn template_kind(err: &TemplateError) -> ErrorKind {
    if err.is_reference() {
        ErrorKind::Reference
    } else {
        ErrorKind::Type
    }
}
