//! Page session configuration

use pagekit_procedure::{ReqwestTransport, RequestDefaults};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// TOML is malformed or has wrong types
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `base_url` is not an absolute URL
    #[error("invalid base_url \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// HTTP client could not be built
    #[error("could not build http client: {0}")]
    Client(String),
}

/// Page session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Base for relative endpoints and mutation URLs
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum cached query results
    pub query_cache_capacity: u64,
    /// Headers sent with every request, before descriptor headers
    pub default_headers: Vec<(String, String)>,
    /// Bound on snapshot/settle passes of one render
    pub max_render_passes: usize,
}

impl PageConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With query cache capacity
    #[inline]
    #[must_use]
    pub fn with_query_cache_capacity(mut self, capacity: u64) -> Self {
        self.query_cache_capacity = capacity;
        self
    }

    /// With an additional default header
    #[inline]
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// With max render passes
    #[inline]
    #[must_use]
    pub fn with_max_render_passes(mut self, passes: usize) -> Self {
        self.max_render_passes = passes;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, or a parse
    /// error
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Request defaults for the procedure layer
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` does not parse
    pub fn request_defaults(&self) -> Result<RequestDefaults, ConfigError> {
        let mut defaults = RequestDefaults::new().with_headers(self.default_headers.clone());
        if let Some(raw) = &self.base_url {
            let url = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
                url: raw.clone(),
                reason: err.to_string(),
            })?;
            defaults = defaults.with_base_url(url);
        }
        Ok(defaults)
    }

    /// Production transport honoring the configured timeout
    ///
    /// # Errors
    /// Returns [`ConfigError::Client`] if the client cannot be built
    pub fn transport(&self) -> Result<ReqwestTransport, ConfigError> {
        ReqwestTransport::new(self.timeout()).map_err(|err| ConfigError::Client(err.message))
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: 30,
            query_cache_capacity: 1_000,
            default_headers: Vec::new(),
            max_render_passes: 16,
        }
    }
}
