//! Request building
//!
//! Turns query and mutation descriptors into concrete HTTP requests by
//! resolving their templates and key/value lists against a [`Scope`].

use crate::error::ProcedureError;
use pagekit_block::{HttpMethod, Mutation, Query};
use pagekit_template::{interpolate, resolve_key_values, ResolvedKeyValue, Scope};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use url::{form_urlencoded, Url};

/// HTTP method of an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Method name as sent on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Post => Self::Post,
            HttpMethod::Put => Self::Put,
            HttpMethod::Patch => Self::Patch,
            HttpMethod::Delete => Self::Delete,
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved outgoing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Header pairs in send order, repetition allowed
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create bodiless request without headers
    #[inline]
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// First value of header `name`, compared case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response as seen by the procedure layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, may be empty
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    /// Create response
    #[inline]
    #[must_use]
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Check for a 2xx status
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Append URL-encoded parameters to `endpoint`
///
/// Uses `&` when the endpoint already carries a query string. Order and
/// repeated keys are preserved.
#[must_use]
pub fn build_url(endpoint: &str, params: &[ResolvedKeyValue]) -> String {
    if params.is_empty() {
        return endpoint.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|p| (p.key.as_str(), p.value.as_str())))
        .finish();
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}{query}")
}

/// Collapse resolved body pairs into a JSON object, last key wins
#[must_use]
pub fn body_object(pairs: Vec<ResolvedKeyValue>) -> Map<String, Value> {
    let mut body = Map::new();
    for pair in pairs {
        body.insert(pair.key, Value::String(pair.value));
    }
    body
}

/// Settings shared by every request of a page session
#[derive(Debug, Clone, Default)]
pub struct RequestDefaults {
    /// Base for relative URLs
    pub base_url: Option<Url>,
    /// Headers sent before any descriptor-specific header
    pub headers: Vec<(String, String)>,
}

impl RequestDefaults {
    /// Create empty defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// With default headers
    #[inline]
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Make `raw` absolute against the base URL
    ///
    /// Absolute URLs are kept verbatim. Relative URLs stay relative when no
    /// base is configured.
    ///
    /// # Errors
    /// Returns [`ProcedureError::InvalidUrl`] if `raw` is malformed or cannot
    /// be joined onto the base
    pub fn absolutize(&self, raw: &str) -> Result<String, ProcedureError> {
        let invalid = |err: url::ParseError| ProcedureError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        };
        match Url::parse(raw) {
            Ok(_) => Ok(raw.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(raw).map(String::from).map_err(invalid),
                None => Ok(raw.to_string()),
            },
            Err(err) => Err(invalid(err)),
        }
    }

    /// Resolve a query into its GET request
    ///
    /// # Errors
    /// Returns template failures from the endpoint or parameters, or an
    /// invalid URL
    pub fn query_request(&self, query: &Query, scope: &Scope) -> Result<HttpRequest, ProcedureError> {
        let endpoint = interpolate(&query.endpoint, scope)?;
        let params = resolve_key_values(&query.query_params, scope)?;
        let url = self.absolutize(&build_url(&endpoint, &params))?;

        Ok(HttpRequest {
            method: Method::Get,
            url,
            headers: self.headers.clone(),
            body: None,
        })
    }

    /// Resolve a mutation into its request
    ///
    /// `scope` should carry the `this` namespace of the submitting form.
    /// Default headers come first. The body is omitted for an empty `DELETE`.
    ///
    /// # Errors
    /// Returns the first template failure, or an invalid URL
    pub fn mutation_request(
        &self,
        mutation: &Mutation,
        scope: &Scope,
    ) -> Result<HttpRequest, ProcedureError> {
        let url = interpolate(&mutation.url, scope)?;
        let params = resolve_key_values(&mutation.query_params, scope)?;
        let url = self.absolutize(&build_url(&url, &params))?;

        let mut headers = self.headers.clone();
        headers.extend(
            resolve_key_values(&mutation.request_headers, scope)?
                .into_iter()
                .map(|pair| (pair.key, pair.value)),
        );

        let body = body_object(resolve_key_values(&mutation.request_body, scope)?);
        let body = if body.is_empty() && mutation.method == HttpMethod::Delete {
            None
        } else {
            Some(Value::Object(body))
        };

        Ok(HttpRequest {
            method: mutation.method.into(),
            url,
            headers,
            body,
        })
    }
}
