use crate::response::{ContentError, ResourceError};
use crate::transport::TransportError;

/// Errors returned by [`Api`](crate::Api) and [`Resource`](crate::Resource) operations.
///
/// Every stage of a call reports its own error kind, and no stage swallows the error of the
/// stage below it: whatever goes wrong is handed back to the caller, who owns retry policy.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum QrestError {
    /// The API or resource configuration is malformed.
    Configuration(ConfigurationError),

    /// A call-time argument does not satisfy its parameter definition.
    Validation(ValidationError),

    /// The transport failed before an HTTP response was received.
    Transport(TransportError),

    /// The server answered with a `4xx` or `5xx` status code.
    Resource(ResourceError),

    /// The response body could not be processed as configured.
    Content(ContentError),
}

impl QrestError {
    /// Returns `true` when the transport gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Timeout { .. }))
    }

    /// Returns the HTTP status code when the error was derived from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Resource(error) => Some(error.status()),
            _ => None,
        }
    }
}

/// Malformed API or resource descriptors.
///
/// These are detected when the API is registered (or when a document is loaded), never in the
/// middle of a call, except for lookups of unknown resources and parameters.
#[derive(Debug, Clone, PartialEq, derive_more::Error, derive_more::Display)]
pub enum ConfigurationError {
    /// The base URL of the API cannot be parsed.
    #[display("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why the URL was rejected.
        message: String,
    },

    /// A header name or value cannot be sent over HTTP.
    #[display("Invalid header '{name}' for '{owner}': {message}")]
    InvalidHeader {
        /// The API or resource declaring the header.
        owner: String,
        /// The header name.
        name: String,
        /// Why the header was rejected.
        message: String,
    },

    /// The configured credentials cannot be rendered into a header.
    #[display("Invalid authentication for '{api}': {message}")]
    InvalidAuthentication {
        /// The API declaring the credentials.
        api: String,
        /// Why the credentials were rejected.
        message: String,
    },

    /// A path segment is neither a literal nor a well-formed `{placeholder}`.
    #[display("Invalid path segment '{segment}' in resource '{resource}'")]
    InvalidPathSegment {
        /// The resource declaring the path.
        resource: String,
        /// The offending segment.
        segment: String,
    },

    /// A path placeholder has no path parameter.
    #[display("Placeholder '{{{placeholder}}}' of resource '{resource}' has no path parameter")]
    UnmatchedPlaceholder {
        /// The resource declaring the path.
        resource: String,
        /// The unmatched placeholder name.
        placeholder: String,
    },

    /// A path parameter targets a placeholder that is not in the path.
    #[display(
        "Path parameter '{parameter}' of resource '{resource}' targets unknown placeholder '{{{placeholder}}}'"
    )]
    OrphanPathParameter {
        /// The resource declaring the parameter.
        resource: String,
        /// The call name of the parameter.
        parameter: String,
        /// The placeholder the parameter targets.
        placeholder: String,
    },

    /// Two parameters of the same kind share one wire name.
    #[display("Resource '{resource}' declares several {kind} parameters for '{wire_name}'")]
    DuplicateWireName {
        /// The resource declaring the parameters.
        resource: String,
        /// The parameter kind.
        kind: String,
        /// The shared wire name.
        wire_name: String,
    },

    /// Two resources of one API share a name.
    #[display("Resource '{resource}' is declared several times for '{api}'")]
    DuplicateResource {
        /// The API name.
        api: String,
        /// The duplicated resource name.
        resource: String,
    },

    /// A whole-body parameter is combined with other body parameters.
    #[display("Resource '{resource}' mixes a whole-body parameter with other body parameters")]
    AmbiguousBody {
        /// The resource declaring the parameters.
        resource: String,
    },

    /// JSON body parameters and file parameters are both declared.
    #[display("Resource '{resource}' declares both body and file parameters")]
    BodyWithFiles {
        /// The resource declaring the parameters.
        resource: String,
    },

    /// A JSON schema document is not a valid schema.
    #[display("Invalid JSON schema: {message}")]
    InvalidSchema {
        /// Why the schema was rejected.
        message: String,
    },

    /// A configuration document cannot be deserialized.
    #[display("Invalid configuration at '{path}': {message}")]
    InvalidDocument {
        /// Location of the error inside the document.
        path: String,
        /// The underlying deserialization error.
        message: String,
    },

    /// A resource name is not registered for the API.
    #[display("'{resource}' is not a valid resource for '{api}'")]
    InvalidResource {
        /// The API name.
        api: String,
        /// The unknown resource name.
        resource: String,
    },

    /// A parameter name is not declared by the resource.
    #[display("'{parameter}' is not a valid parameter for '{resource}'")]
    InvalidParameter {
        /// The resource name.
        resource: String,
        /// The unknown parameter name.
        parameter: String,
    },
}

/// A call-time argument violates its parameter definition.
///
/// Every variant is attributable to one named parameter, see [`ValidationError::parameter`].
#[derive(Debug, Clone, PartialEq, derive_more::Error, derive_more::Display)]
pub enum ValidationError {
    /// A required parameter was not supplied and has no default.
    #[display("Missing required parameter '{parameter}'")]
    Missing {
        /// The call name of the parameter.
        parameter: String,
    },

    /// The value is not one of the allowed choices.
    #[display("Invalid value {value} for '{parameter}', valid choices are: {choices}")]
    InvalidChoice {
        /// The call name of the parameter.
        parameter: String,
        /// The rejected value.
        value: serde_json::Value,
        /// The allowed values, as a JSON array.
        choices: serde_json::Value,
    },

    /// The value does not validate against the parameter schema.
    #[display("value for {parameter} does not obey schema")]
    SchemaViolation {
        /// The call name of the parameter.
        parameter: String,
    },

    /// The argument does not name any parameter of the resource.
    #[display("'{parameter}' is not a valid parameter for '{resource}'")]
    UnknownArgument {
        /// The rejected argument name.
        parameter: String,
        /// The resource name.
        resource: String,
    },

    /// A file parameter received a plain value.
    #[display("Parameter '{parameter}' expects a file upload")]
    ExpectedFile {
        /// The call name of the parameter.
        parameter: String,
    },

    /// A path, query or body parameter received a file upload.
    #[display("Parameter '{parameter}' expects a value, not a file upload")]
    ExpectedValue {
        /// The call name of the parameter.
        parameter: String,
    },

    /// The value cannot be rendered as a path segment.
    #[display("Value {value} for '{parameter}' cannot be used as a path segment")]
    UnsupportedPathValue {
        /// The call name of the parameter.
        parameter: String,
        /// The rejected value.
        value: serde_json::Value,
    },

    /// The value cannot be rendered as a query parameter.
    #[display("Value {value} for '{parameter}' cannot be used as a query parameter")]
    UnsupportedQueryValue {
        /// The call name of the parameter.
        parameter: String,
        /// The rejected value.
        value: serde_json::Value,
    },
}

impl ValidationError {
    /// The call name of the parameter (or argument) at fault.
    pub fn parameter(&self) -> &str {
        match self {
            Self::Missing { parameter }
            | Self::InvalidChoice { parameter, .. }
            | Self::SchemaViolation { parameter }
            | Self::UnknownArgument { parameter, .. }
            | Self::ExpectedFile { parameter }
            | Self::ExpectedValue { parameter }
            | Self::UnsupportedPathValue { parameter, .. }
            | Self::UnsupportedQueryValue { parameter, .. } => parameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_qrest_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<QrestError>();
        assert_sync::<QrestError>();
    }

    #[test]
    fn test_schema_violation_message() {
        let error = ValidationError::SchemaViolation {
            parameter: "post".to_string(),
        };

        assert_eq!(error.to_string(), "value for post does not obey schema");
        assert_eq!(error.parameter(), "post");
    }

    #[test]
    fn test_invalid_choice_lists_choices() {
        let error = ValidationError::InvalidChoice {
            parameter: "order".to_string(),
            value: json!("sideways"),
            choices: json!(["asc", "desc"]),
        };

        insta::assert_snapshot!(error, @r#"Invalid value "sideways" for 'order', valid choices are: ["asc","desc"]"#);
    }

    #[test]
    fn test_invalid_resource_message() {
        let error = ConfigurationError::InvalidResource {
            api: "jsonplaceholder".to_string(),
            resource: "all_users".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "'all_users' is not a valid resource for 'jsonplaceholder'"
        );
    }

    #[test]
    fn test_placeholder_messages_keep_braces() {
        let error = ConfigurationError::UnmatchedPlaceholder {
            resource: "single_post".to_string(),
            placeholder: "item".to_string(),
        };

        insta::assert_snapshot!(error, @"Placeholder '{item}' of resource 'single_post' has no path parameter");
    }

    #[test]
    fn test_qrest_error_delegates_display() {
        let error = QrestError::from(ValidationError::Missing {
            parameter: "title".to_string(),
        });

        assert_eq!(error.to_string(), "Missing required parameter 'title'");
        assert!(!error.is_timeout());
        assert_eq!(error.status(), None);
    }
}
