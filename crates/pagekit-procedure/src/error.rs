//! Error types for procedure execution

use pagekit_template::TemplateError;

/// Why a network call did not produce a usable result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// Non-2xx response
    #[error("status {status} {text}")]
    Status { status: u16, text: String },

    /// Query body is not JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Transport could not complete the call
    #[error("{0}")]
    Transport(String),
}

/// Procedure failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcedureError {
    /// Descriptor did not resolve against the available namespaces
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Resolved URL could not be parsed or joined onto the base URL
    #[error("invalid url \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Query moved to `failed`
    #[error("query \"{id}\" failed for {url}: {reason}")]
    Query {
        id: String,
        url: String,
        reason: FailureReason,
    },

    /// Mutation moved to `error`
    #[error("mutation \"{id}\" failed: {reason}")]
    Mutation { id: String, reason: FailureReason },
}

impl ProcedureError {
    /// Create query failure
    pub fn query(id: impl Into<String>, url: impl Into<String>, reason: FailureReason) -> Self {
        Self::Query {
            id: id.into(),
            url: url.into(),
            reason,
        }
    }

    /// Create mutation failure
    pub fn mutation(id: impl Into<String>, reason: FailureReason) -> Self {
        Self::Mutation {
            id: id.into(),
            reason,
        }
    }

    /// Check if the failure happened on the network boundary
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Query { .. } | Self::Mutation { .. })
    }

    /// HTTP status of the failed response, if one was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Query {
                reason: FailureReason::Status { status, .. },
                ..
            }
            | Self::Mutation {
                reason: FailureReason::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Transport-level failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    /// Create transport error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}
