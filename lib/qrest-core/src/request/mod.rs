//! Requests assembled from a resource and call arguments, ready for a [`Transport`](crate::Transport).

use http::HeaderMap;
use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

use crate::{Authentication, FileUpload, HttpMethod, Timeout};

mod builder;

/// Body of an assembled request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body is sent.
    #[default]
    None,
    /// A JSON document.
    Json(Value),
    /// A multipart form, one part per file parameter, keyed by wire name.
    Multipart(Vec<(String, FileUpload)>),
}

/// Everything a transport needs to send one request.
///
/// Produced by [`Resource::build_request`](crate::Resource::build_request); all call arguments
/// have already been validated.
#[derive(Debug, Clone)]
pub struct AssembledRequest {
    resource: String,
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    query: IndexMap<String, Value>,
    body: RequestBody,
    timeout: Timeout,
    auth: Option<Authentication>,
    verify_tls: bool,
}

impl AssembledRequest {
    /// The name of the resource this request was built for.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The absolute URL, without the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// API default headers merged with the resource headers.
    ///
    /// Authentication is not included; see [`auth`](Self::auth).
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Query values by wire name, as supplied.
    pub fn query(&self) -> &IndexMap<String, Value> {
        &self.query
    }

    /// The query string pairs sent on the wire.
    ///
    /// Arrays expand to one pair per element and `null` values are left out.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.query.len());
        for (name, value) in &self.query {
            match value {
                Value::Array(values) => pairs.extend(
                    values
                        .iter()
                        .filter_map(query_text)
                        .map(|text| (name.clone(), text)),
                ),
                value => pairs.extend(query_text(value).map(|text| (name.clone(), text))),
            }
        }
        pairs
    }

    /// The absolute URL including the query string.
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        let pairs = self.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    /// The request body.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// The effective timeouts.
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// The credentials to send, if any.
    pub fn auth(&self) -> Option<&Authentication> {
        self.auth.as_ref()
    }

    /// Whether TLS certificates must be verified.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
