use std::sync::Arc;

use indexmap::IndexMap;
use url::Url;

use crate::config::RegisteredResource;
use crate::{
    ApiConfig, ApiDefinition, CallArgs, ConfigurationError, Content, QrestError, Transport,
};

mod builder;
pub use self::builder::ApiBuilder;

mod resource;
pub use self::resource::Resource;

/// A registered REST API: its settings, its resources and the transport used to reach it.
///
/// An `Api` is immutable once built and can be shared between threads; every call works on
/// its own request and response.
///
/// # Example
///
/// ```rust
/// use qrest_core::{Api, ApiConfig, HttpMethod, Parameter, ResourceConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = Api::builder(ApiConfig::new("jsonplaceholder", "https://jsonplaceholder.typicode.com"))
///     .resource(
///         ResourceConfig::new("posts", HttpMethod::Get, "/posts")
///             .with_description("List all posts")
///             .with_parameter("user_id", Parameter::query("userId")),
///     )
///     .build()?;
///
/// assert_eq!(api.help("posts")?, "List all posts");
/// assert!(api.resource("all_users").is_err());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(derive_more::Debug)]
pub struct Api {
    config: ApiConfig,
    base_url: Url,
    resources: IndexMap<String, RegisteredResource>,
    #[debug(skip)]
    transport: Arc<dyn Transport>,
}

// Create
impl Api {
    /// Starts registering an API.
    pub fn builder(config: ApiConfig) -> ApiBuilder {
        ApiBuilder::new(config)
    }

    /// Builds an API from a JSON document, reached through [`ReqwestTransport`](crate::ReqwestTransport).
    ///
    /// Use [`ApiBuilder::from_definition`] to pick another transport.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the document is malformed or describes an invalid API.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigurationError> {
        ApiBuilder::from_definition(ApiDefinition::from_json_str(document)?).build()
    }

    /// Builds an API from a YAML document, reached through [`ReqwestTransport`](crate::ReqwestTransport).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the document is malformed or describes an invalid API.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigurationError> {
        ApiBuilder::from_definition(ApiDefinition::from_yaml_str(document)?).build()
    }
}

// Introspection
impl Api {
    /// The API name.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// The help text of the API.
    pub fn description(&self) -> &str {
        self.config.description()
    }

    /// The API settings.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The parsed base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Names of the registered resources, in registration order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// The help text of a resource.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidResource`] for an unknown resource.
    pub fn help(&self, resource: &str) -> Result<&str, QrestError> {
        Ok(self.registered(resource)?.config.description())
    }
}

// Call
impl Api {
    /// Looks a resource up by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidResource`] for an unknown resource.
    pub fn resource(&self, name: &str) -> Result<Resource<'_>, QrestError> {
        let registered = self.registered(name)?;
        Ok(Resource::new(self, registered))
    }

    /// Calls a resource and returns its processed content.
    ///
    /// # Errors
    ///
    /// Returns the first error of the call, see [`Resource::call`].
    pub fn call(&self, resource: &str, args: &CallArgs) -> Result<Content, QrestError> {
        self.resource(resource)?.call(args)
    }

    fn registered(&self, name: &str) -> Result<&RegisteredResource, ConfigurationError> {
        self.resources
            .get(name)
            .ok_or_else(|| ConfigurationError::InvalidResource {
                api: self.name().to_string(),
                resource: name.to_string(),
            })
    }
}
