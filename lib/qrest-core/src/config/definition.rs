use serde::Deserialize;

use super::{ApiConfig, ResourceConfig};
use crate::ConfigurationError;

/// A whole API described as a document: its settings and its resources.
///
/// # Example
///
/// ```rust
/// use qrest_core::ApiDefinition;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let definition = ApiDefinition::from_json_str(r#"{
///     "api": {"name": "jsonplaceholder", "base_url": "https://jsonplaceholder.typicode.com"},
///     "resources": [
///         {"name": "posts", "method": "GET", "path": "/posts"}
///     ]
/// }"#)?;
///
/// assert_eq!(definition.resources().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiDefinition {
    api: ApiConfig,
    #[serde(default)]
    resources: Vec<ResourceConfig>,
}

impl ApiDefinition {
    /// Creates a definition from its parts.
    pub fn new(api: ApiConfig, resources: Vec<ResourceConfig>) -> Self {
        Self { api, resources }
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidDocument`] locating the first invalid field.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigurationError> {
        let deserializer = &mut serde_json::Deserializer::from_str(document);
        serde_path_to_error::deserialize(deserializer).map_err(|err| {
            ConfigurationError::InvalidDocument {
                path: err.path().to_string(),
                message: err.inner().to_string(),
            }
        })
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidDocument`] if the document does not describe an API.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigurationError> {
        serde_saphyr::from_str(document).map_err(|err| ConfigurationError::InvalidDocument {
            path: ".".to_string(),
            message: err.to_string(),
        })
    }

    /// The API settings.
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// The resources, in document order.
    pub fn resources(&self) -> &[ResourceConfig] {
        &self.resources
    }

    /// Splits the definition into its parts.
    pub fn into_parts(self) -> (ApiConfig, Vec<ResourceConfig>) {
        (self.api, self.resources)
    }
}
