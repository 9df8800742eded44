//! The seam between request assembly and the network.
//!
//! A [`Transport`] turns an [`AssembledRequest`] into a [`RawResponse`]. The crate ships
//! [`ReqwestTransport`]; tests and embedders can provide their own, including a plain closure.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::AssembledRequest;

mod blocking;
pub use self::blocking::ReqwestTransport;

/// Number of body bytes quoted in error messages.
pub const BODY_SNIPPET_LIMIT: usize = 1024;

/// Failure of the transport before an HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum TransportError {
    /// The server did not answer within the configured timeout.
    #[display("Timeout while requesting {url}: {message}")]
    Timeout {
        /// The requested URL.
        url: String,
        /// The underlying error.
        message: String,
    },

    /// The request could not be sent or the response could not be read.
    #[display("Connection error while requesting {url}: {message}")]
    Connection {
        /// The requested URL.
        url: String,
        /// The underlying error.
        message: String,
    },
}

/// Executes assembled requests.
///
/// Implementations must map their timeout failures to [`TransportError::Timeout`]; every other
/// failure is a [`TransportError::Connection`]. HTTP error statuses are *not* failures here:
/// they are returned as a [`RawResponse`] and classified afterwards.
pub trait Transport: Send + Sync {
    /// Sends one request and reads the whole response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no response could be obtained.
    fn execute(&self, request: &AssembledRequest) -> Result<RawResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&AssembledRequest) -> Result<RawResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: &AssembledRequest) -> Result<RawResponse, TransportError> {
        self(request)
    }
}

/// Hands the request to the transport.
pub(crate) fn invoke(
    transport: &dyn Transport,
    request: &AssembledRequest,
) -> Result<RawResponse, TransportError> {
    debug!(resource = request.resource(), method = %request.method(), url = %request.url(), "sending...");
    let response = transport.execute(request)?;
    debug!(
        resource = request.resource(),
        status = response.status,
        bytes = response.content.len(),
        "...receiving"
    );
    Ok(response)
}

/// An HTTP response as received, before any status classification or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// The status code.
    pub status: u16,
    /// The reason phrase; [`ReqwestTransport`](crate::ReqwestTransport) fills in the canonical
    /// phrase of the status.
    pub reason: String,
    /// The final URL of the request.
    pub url: String,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body.
    pub content: Vec<u8>,
}

impl RawResponse {
    /// Creates an empty response; the reason is the canonical phrase of the status, if any.
    pub fn new(status: u16, url: impl Into<String>) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            reason,
            url: url.into(),
            headers: HeaderMap::new(),
            content: Vec::new(),
        }
    }

    /// Replaces the reason phrase.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    /// Replaces the body with a JSON document and sets `Content-Type: application/json`.
    #[must_use]
    pub fn with_json(self, value: &Value) -> Self {
        self.with_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
        .with_content(value.to_string())
    }

    /// The `Content-Type` header, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// The body as text, invalid UTF-8 being replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// The beginning of the body, as quoted in error messages.
    pub fn body_snippet(&self) -> String {
        let content = self
            .content
            .get(..BODY_SNIPPET_LIMIT)
            .unwrap_or(&self.content);
        String::from_utf8_lossy(content).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::{Api, ApiConfig, CallArgs, HttpMethod, ResourceConfig};

    #[test]
    fn test_new_uses_canonical_reason() {
        assert_eq!(RawResponse::new(404, "https://example.test").reason, "Not Found");
        assert_eq!(RawResponse::new(600, "https://example.test").reason, "");
    }

    #[test]
    fn test_body_snippet_is_truncated() {
        let response = RawResponse::new(500, "https://example.test").with_content(vec![b'a'; 2000]);

        assert_eq!(response.body_snippet().len(), BODY_SNIPPET_LIMIT);
        assert_eq!(response.text().len(), 2000);
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let response =
            RawResponse::new(200, "https://example.test").with_json(&json!({"id": 1}));

        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.text(), r#"{"id":1}"#);
    }

    #[test]
    fn test_closure_transport() -> anyhow::Result<()> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let transport = move |request: &AssembledRequest| -> Result<RawResponse, TransportError> {
            if let Ok(mut urls) = recorder.lock() {
                urls.push(request.full_url().to_string());
            }
            Ok(RawResponse::new(200, request.url().as_str()).with_json(&json!([])))
        };

        let api = Api::builder(ApiConfig::new("test", "https://example.test"))
            .resource(ResourceConfig::new("posts", HttpMethod::Get, "/posts"))
            .transport(transport)
            .build()?;
        api.call("posts", &CallArgs::new())?;

        let urls = seen.lock().map(|it| it.clone()).unwrap_or_default();
        assert_eq!(urls, vec!["https://example.test/posts".to_string()]);
        Ok(())
    }

    #[test]
    fn test_transport_errors_are_propagated() {
        let transport = |request: &AssembledRequest| -> Result<RawResponse, TransportError> {
            Err(TransportError::Timeout {
                url: request.url().to_string(),
                message: "operation timed out".to_string(),
            })
        };

        let api = Api::builder(ApiConfig::new("test", "https://example.test"))
            .resource(ResourceConfig::new("posts", HttpMethod::Get, "/posts"))
            .transport(transport)
            .build()
            .expect("valid api");
        let error = api.call("posts", &CallArgs::new()).expect_err("timeout");

        assert!(error.is_timeout());
        insta::assert_snapshot!(error, @"Timeout while requesting https://example.test/posts: operation timed out");
    }
}
