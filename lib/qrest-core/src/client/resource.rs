use indexmap::IndexMap;
use tracing::debug;

use super::Api;
use crate::config::RegisteredResource;
use crate::response::classify;
use crate::transport::invoke;
use crate::{
    AssembledRequest, CallArgs, ConfigurationError, Content, HttpMethod, Parameter,
    ProcessedResponse, QrestError,
};

/// One resource of an [`Api`], ready to be called.
///
/// A call runs four stages, each reporting its own error kind:
/// 1. build the request from the call arguments ([`QrestError::Validation`]),
/// 2. send it ([`QrestError::Transport`]),
/// 3. classify the status ([`QrestError::Resource`]),
/// 4. process the body ([`QrestError::Content`]).
///
/// # Example
///
/// ```rust
/// use qrest_core::{Api, ApiConfig, AssembledRequest, CallArgs, HttpMethod, Parameter, RawResponse, ResourceConfig, TransportError};
/// use serde_json::json;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = Api::builder(ApiConfig::new("jsonplaceholder", "https://jsonplaceholder.typicode.com"))
///     .resource(
///         ResourceConfig::new("single_post", HttpMethod::Get, "/posts/{item}")
///             .with_parameter("item", Parameter::path("item").with_description("id of the post")),
///     )
///     .transport(|request: &AssembledRequest| -> Result<RawResponse, TransportError> {
///         Ok(RawResponse::new(200, request.url().as_str()).with_json(&json!({"id": 1})))
///     })
///     .build()?;
///
/// let post = api.resource("single_post")?;
/// assert_eq!(post.help("item")?, "id of the post");
///
/// let request = post.build_request(&CallArgs::new().with("item", 1))?;
/// assert_eq!(request.url().as_str(), "https://jsonplaceholder.typicode.com/posts/1");
///
/// let content = post.call(&CallArgs::new().with("item", 1))?;
/// assert_eq!(content.as_json(), Some(&json!({"id": 1})));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    api: &'a Api,
    registered: &'a RegisteredResource,
}

impl<'a> Resource<'a> {
    pub(super) fn new(api: &'a Api, registered: &'a RegisteredResource) -> Self {
        Self { api, registered }
    }

    /// The resource name.
    pub fn name(&self) -> &'a str {
        self.registered.config.name()
    }

    /// The help text of the resource.
    pub fn description(&self) -> &'a str {
        self.registered.config.description()
    }

    /// The HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.registered.config.method()
    }

    /// The declared parameters, keyed by call name.
    pub fn parameters(&self) -> &'a IndexMap<String, Parameter> {
        self.registered.config.parameters()
    }

    /// The help text of a parameter; empty when none was configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidParameter`] for an unknown parameter.
    pub fn help(&self, parameter: &str) -> Result<&'a str, QrestError> {
        let found = self.parameters().get(parameter).ok_or_else(|| {
            ConfigurationError::InvalidParameter {
                resource: self.name().to_string(),
                parameter: parameter.to_string(),
            }
        })?;
        Ok(found.description())
    }

    /// Validates the arguments and assembles the request, without sending it.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`](crate::ValidationError) found.
    pub fn build_request(&self, args: &CallArgs) -> Result<AssembledRequest, QrestError> {
        AssembledRequest::build(
            self.api.config(),
            self.api.base_url(),
            self.registered,
            args,
        )
    }

    /// Sends the request and returns the classified response, before any body processing.
    ///
    /// # Errors
    ///
    /// Returns validation, transport and status errors.
    pub fn get_response(&self, args: &CallArgs) -> Result<ProcessedResponse, QrestError> {
        let request = self.build_request(args)?;
        let raw = invoke(self.api.transport.as_ref(), &request)?;
        let raw = classify(raw)?;
        Ok(ProcessedResponse::new(
            raw,
            self.registered.config.response().clone(),
        ))
    }

    /// Calls the resource and returns its processed content.
    ///
    /// # Errors
    ///
    /// Returns the first error of the call.
    pub fn call(&self, args: &CallArgs) -> Result<Content, QrestError> {
        debug!(api = self.api.name(), resource = self.name(), "calling resource");
        let content = self.get_response(args)?.into_content()?;
        Ok(content)
    }
}
