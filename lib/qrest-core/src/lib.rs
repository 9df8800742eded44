//! # Qrest Core
//!
//! Declare the resources of a REST API once, then call them by name with validated arguments.
//!
//! A resource describes one endpoint: HTTP method, path template, headers, timeout, the
//! parameters it accepts and how its response is processed. Calling it runs a fixed pipeline:
//!
//! 1. **Build**: call arguments are validated against the parameter definitions (required,
//!    defaults, choices, JSON schema) and assembled into an [`AssembledRequest`]
//! 2. **Send**: the request goes through a [`Transport`] ([`ReqwestTransport`] by default)
//! 3. **Classify**: `4xx`/`5xx` statuses become a [`ResourceError`]
//! 4. **Process**: the body is decoded as JSON (optionally extracting a nested section) or
//!    returned as raw bytes
//!
//! Each stage reports its own error kind through [`QrestError`], and nothing is retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qrest_core::{Api, ApiConfig, CallArgs, HttpMethod, Parameter, ResourceConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Api::builder(
//!     ApiConfig::new("jsonplaceholder", "https://jsonplaceholder.typicode.com")
//!         .with_default_timeout(5000, 0),
//! )
//! .resource(
//!     ResourceConfig::new("posts", HttpMethod::Get, "/posts")
//!         .with_description("List all posts")
//!         .with_parameter(
//!             "user_id",
//!             Parameter::query("userId").with_description("the user ID of the author of the post"),
//!         ),
//! )
//! .resource(
//!     ResourceConfig::new("create_post", HttpMethod::Post, "/posts")
//!         .with_parameter("title", Parameter::body("title").required())
//!         .with_parameter("content", Parameter::body("body").required())
//!         .with_parameter("user_id", Parameter::body("userId").with_default(101)),
//! )
//! .build()?;
//!
//! // GET https://jsonplaceholder.typicode.com/posts?userId=1
//! let posts = api.call("posts", &CallArgs::new().with("user_id", 1))?;
//!
//! // POST {"title": "...", "body": "...", "userId": 101}
//! let created = api.call(
//!     "create_post",
//!     &CallArgs::new().with("title", "hello").with("content", "world"),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Parameters
//!
//! Parameters are registered under a *call name* and sent under a *wire name*:
//!
//! - [`Parameter::path`] fills a `{placeholder}` of the path (always required)
//! - [`Parameter::query`] adds a query string pair; arrays repeat the key
//! - [`Parameter::body`] adds a field to the JSON body, [`Parameter::whole_body`] provides it all
//! - [`Parameter::file`] sends a [`FileUpload`] as a multipart part
//!
//! ```rust
//! use qrest_core::{JsonSchema, Parameter};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let order = Parameter::query("order")
//!     .with_choices(["asc", "desc"])
//!     .with_default("asc");
//!
//! let post = Parameter::whole_body().required().with_schema(JsonSchema::new(json!({
//!     "type": "object",
//!     "required": ["user", "body"],
//! }))?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Response processing
//!
//! ```rust
//! use qrest_core::{HttpMethod, Parameter, ResourceConfig};
//!
//! // Returns `document["body"]["intro"]` instead of the whole document
//! let intro = ResourceConfig::new("intro", HttpMethod::Get, "/posts/{item}")
//!     .with_parameter("item", Parameter::path("item"))
//!     .with_extract_section(["body", "intro"]);
//!
//! // Returns the bytes as received
//! let avatar = ResourceConfig::new("avatar", HttpMethod::Get, "/users/{id}/avatar")
//!     .with_parameter("id", Parameter::path("id"))
//!     .with_raw_response();
//! ```
//!
//! ## Declarative documents
//!
//! The same descriptors deserialize from JSON with [`Api::from_json_str`], or from YAML with
//! `Api::from_yaml_str` when the `yaml` feature is enabled.
//!
//! ## Testing
//!
//! Any `Fn(&AssembledRequest) -> Result<RawResponse, TransportError>` is a [`Transport`], so
//! calls can be checked without a server:
//!
//! ```rust
//! use qrest_core::{Api, ApiConfig, AssembledRequest, HttpMethod, RawResponse, ResourceConfig, TransportError, call_args};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Api::builder(ApiConfig::new("test", "https://example.test"))
//!     .resource(ResourceConfig::new("ping", HttpMethod::Get, "/ping"))
//!     .transport(|request: &AssembledRequest| -> Result<RawResponse, TransportError> {
//!         Ok(RawResponse::new(200, request.url().as_str()).with_json(&json!("pong")))
//!     })
//!     .build()?;
//!
//! let content = api.call("ping", &call_args!())?;
//! assert_eq!(content.as_json(), Some(&json!("pong")));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod auth;
pub use self::auth::{Authentication, AuthenticationError, SecureString};

mod client;
pub use self::client::{Api, ApiBuilder, Resource};

mod config;
pub use self::config::{
    ApiConfig, ApiDefinition, HttpMethod, PathTemplate, ResourceConfig, Timeout, TimeoutConfig,
};

mod error;
pub use self::error::{ConfigurationError, QrestError, ValidationError};

mod parameters;
pub use self::parameters::{ArgValue, CallArgs, FileUpload, JsonSchema, Parameter, ParameterKind};

mod request;
pub use self::request::{AssembledRequest, RequestBody};

pub mod response;
pub use self::response::{
    Content, ContentError, ProcessedResponse, ResourceError, ResponseHandler, SectionKey,
};

pub mod transport;
pub use self::transport::{RawResponse, ReqwestTransport, Transport, TransportError};

/// Creates [`CallArgs`] from `name => value` pairs.
///
/// Values are anything convertible into a [`serde_json::Value`].
///
/// # Examples
///
/// ```rust
/// use qrest_core::call_args;
/// use serde_json::json;
///
/// let args = call_args!(
///     "title" => "hello",
///     "user_id" => 7,
///     "tags" => json!(["rust", "http"]),
/// );
///
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! call_args {
    () => {
        $crate::CallArgs::new()
    };

    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::CallArgs::new()
            $(.with($name, $value))+
    };
}
