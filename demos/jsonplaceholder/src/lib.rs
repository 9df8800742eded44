//! Resources of the [JSONPlaceholder](https://jsonplaceholder.typicode.com) fake REST API.
use std::io;

use qrest_core::{
    Api, ApiConfig, ArgValue, CallArgs, ConfigurationError, FileUpload, HttpMethod, Parameter,
    ResourceConfig, SectionKey, Transport,
};
use serde_json::Value;

/// The public JSONPlaceholder server.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// API settings for a JSONPlaceholder server.
#[must_use]
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig::new("jsonplaceholder", base_url)
        .with_description("Fake online REST API for testing and prototyping")
        .with_default_header("Accept", "application/json")
        .with_default_timeout(5000, 10_000)
}

/// The declared resources.
#[must_use]
pub fn resources() -> Vec<ResourceConfig> {
    vec![
        ResourceConfig::new("posts", HttpMethod::Get, "/posts")
            .with_description("List all posts")
            .with_parameter(
                "user_id",
                Parameter::query("userId").with_description("the user ID of the author of the post"),
            ),
        ResourceConfig::new("post", HttpMethod::Get, "/posts/{item}")
            .with_description("Get a single post")
            .with_parameter("item", Parameter::path("item").with_description("id of the post")),
        ResourceConfig::new("comments", HttpMethod::Get, "/posts/{post_id}/comments")
            .with_description("List the comments of a post")
            .with_parameter("post_id", Parameter::path("post_id")),
        ResourceConfig::new("first_comment_email", HttpMethod::Get, "/posts/{post_id}/comments")
            .with_description("Email of the first commenter of a post")
            .with_parameter("post_id", Parameter::path("post_id"))
            .with_extract_section([SectionKey::Index(0), SectionKey::from("email")]),
        ResourceConfig::new("create_post", HttpMethod::Post, "/posts")
            .with_description("Create a post")
            .with_parameter("title", Parameter::body("title").required())
            .with_parameter(
                "content",
                Parameter::body("body")
                    .required()
                    .with_description("text of the post"),
            )
            .with_parameter("user_id", Parameter::body("userId").with_default(1)),
        ResourceConfig::new("update_post", HttpMethod::Patch, "/posts/{item}")
            .with_description("Update some fields of a post")
            .with_parameter("item", Parameter::path("item"))
            .with_parameter("title", Parameter::body("title"))
            .with_parameter("content", Parameter::body("body")),
        ResourceConfig::new("delete_post", HttpMethod::Delete, "/posts/{item}")
            .with_description("Delete a post")
            .with_parameter("item", Parameter::path("item")),
        ResourceConfig::new("todos", HttpMethod::Get, "/todos")
            .with_description("List todos")
            .with_parameter("user_id", Parameter::query("userId"))
            .with_parameter(
                "completed",
                Parameter::query("completed").with_choices([true, false]),
            ),
    ]
}

/// Creates the API, sending requests over HTTP.
///
/// # Errors
///
/// Fails if `base_url` is not a valid HTTP base URL.
pub fn api(base_url: &str) -> Result<Api, ConfigurationError> {
    Api::builder(api_config(base_url))
        .resources(resources())
        .build()
}

/// Creates the API with a custom transport.
///
/// # Errors
///
/// Fails if `base_url` is not a valid HTTP base URL.
pub fn api_with_transport(
    base_url: &str,
    transport: impl Transport + 'static,
) -> Result<Api, ConfigurationError> {
    Api::builder(api_config(base_url))
        .resources(resources())
        .transport(transport)
        .build()
}

/// A command line argument that is not a `name=value` pair.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum ArgumentError {
    /// No `=` in the argument.
    #[display("expected 'name=value', got {raw:?}")]
    MissingSeparator {
        /// The argument as given.
        raw: String,
    },
    /// Nothing before the `=`.
    #[display("missing parameter name in {raw:?}")]
    EmptyName {
        /// The argument as given.
        raw: String,
    },
    /// The file of a `name=@path` argument cannot be read.
    #[display("cannot read {path:?}: {source}")]
    File {
        /// The file path.
        path: String,
        /// The underlying error.
        source: io::Error,
    },
}

/// Parses a `name=value` command line argument.
///
/// The value is read as JSON when possible and as a plain string otherwise,
/// `name=@path` reads a file.
///
/// # Errors
///
/// Fails on a malformed argument or an unreadable file.
pub fn parse_argument(raw: &str) -> Result<(String, ArgValue), ArgumentError> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(ArgumentError::MissingSeparator {
            raw: raw.to_string(),
        });
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(ArgumentError::EmptyName {
            raw: raw.to_string(),
        });
    }

    let value = if let Some(path) = value.strip_prefix('@') {
        let file = FileUpload::from_path(path).map_err(|source| ArgumentError::File {
            path: path.to_string(),
            source,
        })?;
        ArgValue::File(file)
    } else {
        let json = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
        ArgValue::Value(json)
    };
    Ok((name.to_string(), value))
}

/// Parses all `name=value` arguments of a call.
///
/// # Errors
///
/// Fails on the first malformed argument.
pub fn parse_call_args<I, S>(raw_args: I) -> Result<CallArgs, ArgumentError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = CallArgs::new();
    for raw in raw_args {
        let (name, value) = parse_argument(raw.as_ref())?;
        args.insert(name, value);
    }
    Ok(args)
}

/// Help text listing every resource and its parameters.
#[must_use]
pub fn usage(api: &Api) -> String {
    let mut result = format!("{}: {}\n", api.name(), api.description());
    for name in api.resource_names() {
        let Ok(resource) = api.resource(name) else {
            continue;
        };
        result.push_str(&format!(
            "\n  {name} ({}): {}\n",
            resource.method(),
            resource.description()
        ));
        for (param, definition) in resource.parameters() {
            let required = if definition.is_required() { "*" } else { "" };
            let line = match definition.description() {
                "" => format!("    {param}{required} [{}]\n", definition.kind()),
                description => format!("    {param}{required} [{}] {description}\n", definition.kind()),
            };
            result.push_str(&line);
        }
    }
    result
}
