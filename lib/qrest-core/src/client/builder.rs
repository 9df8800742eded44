use std::sync::Arc;

use http::HeaderMap;
use indexmap::IndexMap;
use tracing::debug;
use url::Url;

use super::Api;
use crate::config::RegisteredResource;
use crate::{ApiConfig, ApiDefinition, ConfigurationError, ReqwestTransport, ResourceConfig, Transport};

/// Builder registering the resources of an [`Api`].
///
/// Every descriptor is checked by [`build`](Self::build): nothing malformed reaches a call.
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
///             .with_parameter("user_id", Parameter::query("userId")),
///     )
///     .resource(
///         ResourceConfig::new("single_post", HttpMethod::Get, "/posts/{item}")
///             .with_parameter("item", Parameter::path("item")),
///     )
///     .build()?;
///
/// assert_eq!(api.resource_names().collect::<Vec<_>>(), ["posts", "single_post"]);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(derive_more::Debug)]
pub struct ApiBuilder {
    config: ApiConfig,
    resources: Vec<ResourceConfig>,
    #[debug(skip)]
    transport: Option<Arc<dyn Transport>>,
}

impl ApiBuilder {
    pub(super) fn new(config: ApiConfig) -> Self {
        Self {
            config,
            resources: Vec::new(),
            transport: None,
        }
    }

    /// Starts from a loaded definition.
    pub fn from_definition(definition: ApiDefinition) -> Self {
        let (config, resources) = definition.into_parts();
        Self::new(config).resources(resources)
    }

    /// Registers a resource.
    #[must_use]
    pub fn resource(mut self, resource: ResourceConfig) -> Self {
        self.resources.push(resource);
        self
    }

    /// Registers several resources, in order.
    #[must_use]
    pub fn resources(mut self, resources: impl IntoIterator<Item = ResourceConfig>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Sets the transport; [`ReqwestTransport`] is used otherwise.
    #[must_use]
    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Sets a transport shared with other owners.
    #[must_use]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Checks every descriptor and builds the API.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found: invalid base URL, header or credentials,
    /// duplicate resource name, or a resource whose path and parameters disagree.
    pub fn build(self) -> Result<Api, ConfigurationError> {
        let Self {
            config,
            resources,
            transport,
        } = self;

        let base_url = parse_base_url(config.base_url())?;
        crate::config::extend_headers(config.name(), &mut HeaderMap::new(), config.default_headers())?;
        if let Some(auth) = config.auth() {
            auth.to_header()
                .map_err(|err| ConfigurationError::InvalidAuthentication {
                    api: config.name().to_string(),
                    message: err.to_string(),
                })?;
        }

        let mut registered = IndexMap::with_capacity(resources.len());
        for resource in resources {
            if registered.contains_key(resource.name()) {
                return Err(ConfigurationError::DuplicateResource {
                    api: config.name().to_string(),
                    resource: resource.name().to_string(),
                });
            }
            let name = resource.name().to_string();
            registered.insert(name, RegisteredResource::register(&config, resource)?);
        }

        debug!(api = config.name(), %base_url, resources = registered.len(), "registered api");
        Ok(Api {
            config,
            base_url,
            resources: registered,
            transport: transport.unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
        })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ConfigurationError> {
    let invalid = |message: String| ConfigurationError::InvalidBaseUrl {
        url: base_url.to_string(),
        message,
    };
    let url = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an absolute http(s) URL".to_string()));
    }
    Ok(url)
}
