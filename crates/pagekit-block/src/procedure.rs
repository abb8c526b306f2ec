//! Query and mutation descriptors
//!
//! Declarative descriptions of network reads and writes. Turning them into
//! requests is the job of the procedure layer.

use crate::template::TemplateString;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Key with a templated value
///
/// Used identically for query parameters, request headers and request body
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Parameter, header or body key
    pub key: String,
    /// Templated value
    pub value: TemplateString,
}

impl KeyValue {
    /// Create key/value pair
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<TemplateString>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Network read declared by a query-provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Id under which the result is exposed in the `query` namespace
    pub id: String,
    /// URL template
    pub endpoint: TemplateString,
    /// Query string parameters, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<KeyValue>,
}

impl Query {
    /// Create query without parameters
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, endpoint: impl Into<TemplateString>) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            query_params: Vec::new(),
        }
    }

    /// With query parameters
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: Vec<KeyValue>) -> Self {
        self.query_params = params;
        self
    }
}

/// HTTP method of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network write triggered by a form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    /// Mutation id, used in messages and logs
    pub id: String,
    /// HTTP method
    pub method: HttpMethod,
    /// URL template
    pub url: TemplateString,
    /// Query string parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<KeyValue>,
    /// Request headers (repetition allowed)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_headers: Vec<KeyValue>,
    /// JSON body entries (last occurrence of a key wins)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_body: Vec<KeyValue>,
}

impl Mutation {
    /// Create mutation without parameters, headers or body
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, method: HttpMethod, url: impl Into<TemplateString>) -> Self {
        Self {
            id: id.into(),
            method,
            url: url.into(),
            query_params: Vec::new(),
            request_headers: Vec::new(),
            request_body: Vec::new(),
        }
    }

    /// With query parameters
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: Vec<KeyValue>) -> Self {
        self.query_params = params;
        self
    }

    /// With request headers
    #[inline]
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<KeyValue>) -> Self {
        self.request_headers = headers;
        self
    }

    /// With request body entries
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: Vec<KeyValue>) -> Self {
        self.request_body = body;
        self
    }
}
