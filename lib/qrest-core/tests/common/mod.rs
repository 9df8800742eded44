#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use qrest_core::{
    Api, ApiConfig, AssembledRequest, HttpMethod, JsonSchema, Parameter, RawResponse,
    ResourceConfig, Transport, TransportError,
};
use rstest::fixture;
use serde_json::{Value, json};
use tracing::info;

pub const BASE_URL: &str = "https://example.test";

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// In-memory transport recording every request and answering with queued responses.
///
/// When the queue is empty it answers `200` with an empty JSON object.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<AssembledRequest>>,
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
}

impl RecordingTransport {
    pub fn respond(&self, response: RawResponse) {
        self.push(Ok(response));
    }

    pub fn respond_json(&self, status: u16, body: &Value) {
        self.respond(RawResponse::new(status, BASE_URL).with_json(body));
    }

    pub fn fail(&self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(&self, outcome: Result<RawResponse, TransportError>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(outcome);
        }
    }

    pub fn requests(&self) -> Vec<AssembledRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> AssembledRequest {
        match self.requests().pop() {
            Some(request) => request,
            None => panic!("no request was sent"),
        }
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &AssembledRequest) -> Result<RawResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let queued = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        queued.unwrap_or_else(|| {
            Ok(RawResponse::new(200, request.full_url().as_str()).with_json(&json!({})))
        })
    }
}

pub struct TestApi {
    pub api: Api,
    pub transport: Arc<RecordingTransport>,
}

fn create_post_schema() -> JsonSchema {
    match JsonSchema::new(json!({
        "title": "create post",
        "type": "object",
        "properties": {
            "user": {"type": "string"},
            "body": {"type": "string"},
        },
        "required": ["user", "body"],
    })) {
        Ok(schema) => schema,
        Err(error) => panic!("invalid schema: {error}"),
    }
}

/// A JSONPlaceholder-like API reached through a [`RecordingTransport`].
#[fixture]
pub fn jsonplaceholder() -> TestApi {
    init_tracing();

    let transport = Arc::new(RecordingTransport::default());
    let config = ApiConfig::new("jsonplaceholder", BASE_URL)
        .with_description("Fake online REST API for testing and prototyping")
        .with_default_header("X-Test", "api")
        .with_default_header("Accept", "application/json")
        .with_default_timeout(5000, 0);

    let resources = [
        ResourceConfig::new("posts", HttpMethod::Get, "/posts")
            .with_description("List all posts")
            .with_parameter(
                "user_id",
                Parameter::query("userId").with_description("the user ID of the author of the post"),
            )
            .with_parameter("order", Parameter::query("order").with_choices(["asc", "desc"])),
        ResourceConfig::new("single_post", HttpMethod::Get, "/posts/{item}")
            .with_description("Get a single post")
            .with_parameter("item", Parameter::path("item").with_description("id of the post"))
            .with_header("x-test", "post"),
        ResourceConfig::new("comments", HttpMethod::Get, "/posts/{post_id}/comments")
            .with_parameter("post_id", Parameter::path("post_id"))
            .with_timeout(1000, 2000),
        ResourceConfig::new("create_post", HttpMethod::Post, "/posts")
            .with_parameter("title", Parameter::body("title").required())
            .with_parameter("content", Parameter::body("body").required())
            .with_parameter("user_id", Parameter::body("userId").with_default(101)),
        ResourceConfig::new("update_post", HttpMethod::Patch, "/posts/{item}")
            .with_parameter("item", Parameter::path("item"))
            .with_parameter("title", Parameter::body("title"))
            .with_parameter("content", Parameter::body("body")),
        ResourceConfig::new("create_post_schema", HttpMethod::Post, "/posts")
            .with_parameter(
                "post",
                Parameter::whole_body().required().with_schema(create_post_schema()),
            ),
        ResourceConfig::new("replace_post", HttpMethod::Put, "/posts/{item}")
            .with_parameter("item", Parameter::path("item"))
            .with_parameter("post", Parameter::whole_body().with_schema(create_post_schema())),
        ResourceConfig::new("comment", HttpMethod::Post, "/posts/{item}/comments")
            .with_parameter("item", Parameter::path("item"))
            .with_parameter("text", Parameter::body("body").required()),
        ResourceConfig::new("intro", HttpMethod::Get, "/posts/{item}")
            .with_parameter("item", Parameter::path("item"))
            .with_extract_section(["body", "intro"]),
        ResourceConfig::new("upload", HttpMethod::Post, "/upload")
            .with_parameter("file", Parameter::file("attachment").required())
            .with_parameter("thumbnail", Parameter::file("thumbnail")),
        ResourceConfig::new("avatar", HttpMethod::Get, "/users/{id}/avatar")
            .with_parameter("id", Parameter::path("id"))
            .with_raw_response(),
    ];

    let api = match Api::builder(config)
        .resources(resources)
        .shared_transport(transport.clone())
        .build()
    {
        Ok(api) => api,
        Err(error) => panic!("invalid test api: {error}"),
    };

    TestApi { api, transport }
}
