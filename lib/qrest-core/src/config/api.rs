use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::Deserialize;

use super::TimeoutConfig;
use crate::{Authentication, ConfigurationError};

/// Settings shared by every resource of one API.
///
/// # Example
///
/// ```rust
/// use qrest_core::{ApiConfig, Authentication};
///
/// let config = ApiConfig::new("jsonplaceholder", "https://jsonplaceholder.typicode.com")
///     .with_description("Fake online REST API for testing and prototyping")
///     .with_default_header("Accept", "application/json")
///     .with_default_timeout(5000, 0)
///     .with_auth(Authentication::Bearer("token".into()));
///
/// assert!(config.verify_tls());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    name: String,
    base_url: String,
    #[serde(default)]
    default_headers: IndexMap<String, String>,
    #[serde(default)]
    default_timeout: Option<TimeoutConfig>,
    #[serde(default)]
    auth: Option<Authentication>,
    #[serde(default = "verify_tls_default")]
    verify_tls: bool,
    #[serde(default)]
    description: Option<String>,
}

fn verify_tls_default() -> bool {
    true
}

impl ApiConfig {
    /// Creates the settings of an API rooted at `base_url`.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            default_headers: IndexMap::new(),
            default_timeout: None,
            auth: None,
            verify_tls: true,
            description: None,
        }
    }

    /// Adds a header sent with every request, unless a resource overrides it.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Sets the `(connect, read)` timeouts in milliseconds used when a resource sets none.
    #[must_use]
    pub fn with_default_timeout(mut self, connect_ms: i64, read_ms: i64) -> Self {
        self.default_timeout = Some(TimeoutConfig::new(connect_ms, read_ms));
        self
    }

    /// Sets the credentials sent with every request.
    #[must_use]
    pub fn with_auth(mut self, auth: Authentication) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Enables or disables TLS certificate verification.
    #[must_use]
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Sets the help text of the API.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The API name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base URL, as configured.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request.
    pub fn default_headers(&self) -> &IndexMap<String, String> {
        &self.default_headers
    }

    /// The timeout used when a resource sets none.
    pub fn default_timeout(&self) -> Option<TimeoutConfig> {
        self.default_timeout
    }

    /// The credentials sent with every request.
    pub fn auth(&self) -> Option<&Authentication> {
        self.auth.as_ref()
    }

    /// Whether TLS certificates are verified.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// The help text, empty when none was configured.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Converts configured headers into an [`HeaderMap`], later entries replacing earlier ones.
///
/// Header names compare case-insensitively, so `x-test` overrides `X-Test`.
pub(crate) fn extend_headers(
    owner: &str,
    target: &mut HeaderMap,
    headers: &IndexMap<String, String>,
) -> Result<(), ConfigurationError> {
    for (name, value) in headers {
        let invalid = |message: String| ConfigurationError::InvalidHeader {
            owner: owner.to_string(),
            name: name.clone(),
            message,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| invalid(err.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|err| invalid(err.to_string()))?;
        target.insert(header_name, header_value);
    }
    Ok(())
}
