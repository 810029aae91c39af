//! HTTP client shared by the catalog and chat calls.

use crate::config::{self, Config, ConfigError};

/// Client for the recommendation service at a fixed base URL.
///
/// Cheap to clone; clones share the underlying connection pool. The base URL
/// is fixed at construction and never revalidated per call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Client reusing an existing `reqwest::Client` (timeouts, proxies, TLS
    /// are whatever that client was built with).
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client for the base URL resolved from `cfg` and the environment.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config::resolve_base_url(cfg)?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `{base}/{path}`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
