use http::HeaderMap;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::api::extend_headers;
use super::{ApiConfig, PathTemplate, Timeout, TimeoutConfig};
use crate::response::{ResponseHandler, SectionKey};
use crate::{ConfigurationError, Parameter, ParameterKind};

/// HTTP methods a resource can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, derive_more::Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    #[display("GET")]
    Get,
    /// `POST`
    #[display("POST")]
    Post,
    /// `PUT`
    #[display("PUT")]
    Put,
    /// `PATCH`
    #[display("PATCH")]
    Patch,
    /// `DELETE`
    #[display("DELETE")]
    Delete,
    /// `HEAD`
    #[display("HEAD")]
    Head,
    /// `OPTIONS`
    #[display("OPTIONS")]
    Options,
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
        }
    }
}

/// Path segments, written either as a list or as a single `/`-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum PathDocument {
    Template(String),
    Segments(Vec<String>),
}

impl From<PathDocument> for Vec<String> {
    fn from(document: PathDocument) -> Self {
        match document {
            PathDocument::Template(template) => split_template(&template),
            PathDocument::Segments(segments) => segments,
        }
    }
}

fn split_template(template: &str) -> Vec<String> {
    template
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// One endpoint of an API.
///
/// # Example
///
/// ```rust
/// use qrest_core::{HttpMethod, Parameter, ResourceConfig};
///
/// let comments = ResourceConfig::new("comments", HttpMethod::Get, "/posts/{post_id}/comments")
///     .with_description("Comments of a post")
///     .with_parameter("post_id", Parameter::path("post_id"))
///     .with_header("Accept", "application/json");
///
/// assert_eq!(comments.path(), ["posts", "{post_id}", "comments"]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    name: String,
    method: HttpMethod,
    #[serde(deserialize_with = "deserialize_path")]
    path: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    headers: IndexMap<String, String>,
    #[serde(default)]
    timeout: Option<TimeoutConfig>,
    #[serde(default)]
    parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    response: ResponseHandler,
}

fn deserialize_path<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    PathDocument::deserialize(deserializer).map(Into::into)
}

impl ResourceConfig {
    /// Creates a resource; the path is split on `/`.
    pub fn new(name: impl Into<String>, method: HttpMethod, path: &str) -> Self {
        Self::with_segments(name, method, split_template(path))
    }

    /// Creates a resource from explicit path segments.
    pub fn with_segments<I, S>(name: impl Into<String>, method: HttpMethod, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            method,
            path: segments.into_iter().map(Into::into).collect(),
            description: None,
            headers: IndexMap::new(),
            timeout: None,
            parameters: IndexMap::new(),
            response: ResponseHandler::default(),
        }
    }

    /// Declares a parameter under its call name. Declaration order is kept.
    #[must_use]
    pub fn with_parameter(mut self, call_name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(call_name.into(), parameter);
        self
    }

    /// Adds a header overriding the API default of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Overrides the API default `(connect, read)` timeouts, in milliseconds.
    #[must_use]
    pub fn with_timeout(mut self, connect_ms: i64, read_ms: i64) -> Self {
        self.timeout = Some(TimeoutConfig::new(connect_ms, read_ms));
        self
    }

    /// Decodes the response as JSON and returns the value found under `section`.
    #[must_use]
    pub fn with_extract_section<I, K>(mut self, section: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SectionKey>,
    {
        self.response = ResponseHandler::Json {
            extract_section: section.into_iter().map(Into::into).collect(),
        };
        self
    }

    /// Returns the response bytes without decoding.
    #[must_use]
    pub fn with_raw_response(mut self) -> Self {
        self.response = ResponseHandler::Raw;
        self
    }

    /// Sets the help text of the resource.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The path segments, placeholders included.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The help text, empty when none was configured.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Headers overriding the API defaults.
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// The timeout override, if any.
    pub fn timeout(&self) -> Option<TimeoutConfig> {
        self.timeout
    }

    /// Parameters keyed by call name, in declaration order.
    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    /// How the response is processed.
    pub fn response(&self) -> &ResponseHandler {
        &self.response
    }
}

/// A resource checked against its API, with everything known at registration precomputed.
#[derive(Debug, Clone)]
pub(crate) struct RegisteredResource {
    pub(crate) config: ResourceConfig,
    pub(crate) template: PathTemplate,
    pub(crate) headers: HeaderMap,
    pub(crate) timeout: Timeout,
}

impl RegisteredResource {
    pub(crate) fn register(api: &ApiConfig, config: ResourceConfig) -> Result<Self, ConfigurationError> {
        let name = config.name();
        let template = PathTemplate::parse(name, config.path())?;
        check_path_parameters(&config, &template)?;
        check_wire_names(&config)?;
        check_body(&config)?;

        let mut headers = HeaderMap::new();
        extend_headers(api.name(), &mut headers, api.default_headers())?;
        extend_headers(name, &mut headers, config.headers())?;

        let timeout = config
            .timeout()
            .or(api.default_timeout())
            .map(TimeoutConfig::resolve)
            .unwrap_or_default();

        debug!(api = api.name(), resource = name, method = %config.method(), "registered resource");
        Ok(Self {
            config,
            template,
            headers,
            timeout,
        })
    }
}

fn check_path_parameters(
    config: &ResourceConfig,
    template: &PathTemplate,
) -> Result<(), ConfigurationError> {
    let placeholders = template.placeholders();
    let mut targeted = Vec::new();
    for (call_name, parameter) in config.parameters() {
        if parameter.kind() != ParameterKind::Path {
            continue;
        }
        let placeholder = parameter.effective_wire_name(call_name).unwrap_or(call_name);
        if !placeholders.contains(&placeholder) {
            return Err(ConfigurationError::OrphanPathParameter {
                resource: config.name().to_string(),
                parameter: call_name.clone(),
                placeholder: placeholder.to_string(),
            });
        }
        targeted.push(placeholder);
    }

    if let Some(unmatched) = placeholders.iter().find(|it| !targeted.contains(it)) {
        return Err(ConfigurationError::UnmatchedPlaceholder {
            resource: config.name().to_string(),
            placeholder: (*unmatched).to_string(),
        });
    }
    Ok(())
}

fn check_wire_names(config: &ResourceConfig) -> Result<(), ConfigurationError> {
    let mut seen: Vec<(ParameterKind, &str)> = Vec::new();
    for (call_name, parameter) in config.parameters() {
        let Some(wire_name) = parameter.effective_wire_name(call_name) else {
            continue;
        };
        let key = (parameter.kind(), wire_name);
        if seen.contains(&key) {
            return Err(ConfigurationError::DuplicateWireName {
                resource: config.name().to_string(),
                kind: parameter.kind().to_string(),
                wire_name: wire_name.to_string(),
            });
        }
        seen.push(key);
    }
    Ok(())
}

fn check_body(config: &ResourceConfig) -> Result<(), ConfigurationError> {
    let parameters = config.parameters().values();
    let whole = parameters.clone().filter(|it| it.is_whole_body()).count();
    let body = parameters
        .clone()
        .filter(|it| it.kind() == ParameterKind::Body)
        .count();
    let files = parameters
        .filter(|it| it.kind() == ParameterKind::File)
        .count();

    if whole > 0 && body > 1 {
        return Err(ConfigurationError::AmbiguousBody {
            resource: config.name().to_string(),
        });
    }
    if body > 0 && files > 0 {
        return Err(ConfigurationError::BodyWithFiles {
            resource: config.name().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn api() -> ApiConfig {
        ApiConfig::new("jsonplaceholder", "https://example.test")
            .with_default_header("X-Test", "api")
            .with_default_header("Accept", "application/json")
            .with_default_timeout(5000, 0)
    }

    #[test]
    fn test_register_merges_headers_and_timeout() {
        let config = ResourceConfig::new("single_post", HttpMethod::Get, "/posts/{item}")
            .with_parameter("item", Parameter::path("item"))
            .with_header("x-test", "post")
            .with_timeout(1000, 2000);

        let registered = RegisteredResource::register(&api(), config).expect("valid resource");

        assert_eq!(registered.headers.len(), 2);
        assert_eq!(
            registered.headers.get("X-Test").and_then(|it| it.to_str().ok()),
            Some("post")
        );
        assert_eq!(registered.timeout.connect, Some(Duration::from_secs(1)));
        assert_eq!(registered.timeout.read, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_register_falls_back_to_api_timeout() {
        let config = ResourceConfig::new("posts", HttpMethod::Get, "/posts");

        let registered = RegisteredResource::register(&api(), config).expect("valid resource");

        assert_eq!(registered.timeout.connect, Some(Duration::from_secs(5)));
        assert_eq!(registered.timeout.read, None);
    }

    #[test]
    fn test_unmatched_placeholder() {
        let config = ResourceConfig::new("single_post", HttpMethod::Get, "/posts/{item}");

        let error = RegisteredResource::register(&api(), config).expect_err("unmatched");

        assert_eq!(
            error,
            ConfigurationError::UnmatchedPlaceholder {
                resource: "single_post".to_string(),
                placeholder: "item".to_string(),
            }
        );
    }

    #[test]
    fn test_orphan_path_parameter() {
        let config = ResourceConfig::new("posts", HttpMethod::Get, "/posts")
            .with_parameter("post_id", Parameter::path("id"));

        let error = RegisteredResource::register(&api(), config).expect_err("orphan");

        insta::assert_snapshot!(error, @"Path parameter 'post_id' of resource 'posts' targets unknown placeholder '{id}'");
    }

    #[test]
    fn test_duplicate_path_parameter() {
        let config = ResourceConfig::new("single_post", HttpMethod::Get, "/posts/{item}")
            .with_parameter("item", Parameter::path("item"))
            .with_parameter("other", Parameter::path("item"));

        let error = RegisteredResource::register(&api(), config).expect_err("duplicate");

        assert!(matches!(error, ConfigurationError::DuplicateWireName { .. }));
    }

    #[test]
    fn test_same_wire_name_in_different_kinds_is_allowed() {
        let config = ResourceConfig::new("search", HttpMethod::Post, "/search")
            .with_parameter("query_id", Parameter::query("id"))
            .with_parameter("body_id", Parameter::body("id"));

        assert!(RegisteredResource::register(&api(), config).is_ok());
    }

    #[test]
    fn test_whole_body_mixed_with_named_fields() {
        let config = ResourceConfig::new("create_post", HttpMethod::Post, "/posts")
            .with_parameter("post", Parameter::whole_body())
            .with_parameter("title", Parameter::body("title"));

        let error = RegisteredResource::register(&api(), config).expect_err("ambiguous");

        assert_eq!(
            error,
            ConfigurationError::AmbiguousBody {
                resource: "create_post".to_string()
            }
        );
    }

    #[test]
    fn test_body_with_files() {
        let config = ResourceConfig::new("upload", HttpMethod::Post, "/upload")
            .with_parameter("title", Parameter::body("title"))
            .with_parameter("file", Parameter::file("file"));

        let error = RegisteredResource::register(&api(), config).expect_err("body with files");

        assert!(matches!(error, ConfigurationError::BodyWithFiles { .. }));
    }

    #[test]
    fn test_invalid_resource_header() {
        let config = ResourceConfig::new("posts", HttpMethod::Get, "/posts")
            .with_header("X-Test", "line\nbreak");

        let error = RegisteredResource::register(&api(), config).expect_err("invalid header");

        assert!(matches!(
            error,
            ConfigurationError::InvalidHeader { ref owner, .. } if owner == "posts"
        ));
    }

    #[test]
    fn test_deserialize_resource() {
        let config: ResourceConfig = serde_json::from_value(json!({
            "name": "comments",
            "method": "GET",
            "path": "/posts/{post_id}/comments",
            "parameters": {
                "post_id": {"in": "path"},
                "email": {"in": "query", "description": "Filter by author email"},
            },
            "response": {"kind": "json", "extract_section": [0, "email"]},
        }))
        .expect("valid resource");

        assert_eq!(config.path(), ["posts", "{post_id}", "comments"]);
        assert_eq!(config.parameters().len(), 2);
        assert_eq!(
            config.response(),
            &ResponseHandler::Json {
                extract_section: vec![SectionKey::Index(0), SectionKey::from("email")]
            }
        );
    }

    #[test]
    fn test_deserialize_rejects_unknown_method() {
        let result = serde_json::from_value::<ResourceConfig>(json!({
            "name": "posts",
            "method": "BREW",
            "path": ["posts"],
        }));

        assert!(result.is_err());
    }
}
