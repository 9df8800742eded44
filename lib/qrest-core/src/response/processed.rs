use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ResponseHandler, SectionKey};
use crate::RawResponse;

/// The response body could not be processed as configured.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ContentError {
    /// JSON was expected but the server announced another media type.
    #[display("Expected a JSON response, got content type '{content_type}'")]
    UnexpectedContentType {
        /// The announced content type.
        content_type: String,
    },

    /// The body is not valid JSON.
    #[display("Invalid JSON response: {message}")]
    InvalidJson {
        /// The decoder error.
        message: String,
    },

    /// A step of the extract section is absent from the document.
    #[display("No content found at '{path}'")]
    MissingContent {
        /// The section walked so far, the missing step included, e.g. `/body/intro`.
        path: String,
    },

    /// The JSON content does not match the requested type.
    #[display("Cannot deserialize response at '{path}': {message}")]
    Deserialize {
        /// Location of the mismatch inside the content.
        path: String,
        /// The deserialization error.
        message: String,
    },
}

/// Processed content of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// The decoded (and possibly extracted) JSON value.
    Json(Value),
    /// The untouched body bytes.
    Raw(Vec<u8>),
}

impl Content {
    /// The JSON value, if the resource decodes JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// The body bytes, if the resource returns raw content.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Json(_) => None,
            Self::Raw(content) => Some(content),
        }
    }

    /// Takes the JSON value out; `None` for raw content.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }
}

/// A successful response together with the way its resource processes it.
///
/// Processing is lazy: nothing is decoded until [`fetch`](Self::fetch) is called, and the
/// result is kept for subsequent calls on the same response.
#[derive(Debug)]
pub struct ProcessedResponse {
    raw: RawResponse,
    handler: ResponseHandler,
    content: OnceLock<Content>,
}

impl ProcessedResponse {
    pub(crate) fn new(raw: RawResponse, handler: ResponseHandler) -> Self {
        Self {
            raw,
            handler,
            content: OnceLock::new(),
        }
    }

    /// The response as received.
    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    /// Returns the processed content, processing the body on first access.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] if the body cannot be decoded or the extract section does not
    /// match it. A failed attempt is not remembered.
    pub fn fetch(&self) -> Result<&Content, ContentError> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let content = self.process()?;
        Ok(self.content.get_or_init(|| content))
    }

    /// Processes the body and returns the content by value.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub fn into_content(self) -> Result<Content, ContentError> {
        match self.content.into_inner() {
            Some(content) => Ok(content),
            None => process(&self.raw, &self.handler),
        }
    }

    /// Deserializes the processed JSON content into `T`.
    ///
    /// Raw content is decoded as JSON for the occasion.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Deserialize`] naming the first mismatching field, or any error
    /// of [`fetch`](Self::fetch).
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrest_core::{Api, ApiConfig, AssembledRequest, CallArgs, HttpMethod, RawResponse, ResourceConfig, TransportError};
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Debug, Deserialize)]
    /// struct Post {
    ///     id: u32,
    ///     title: String,
    /// }
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = Api::builder(ApiConfig::new("blog", "https://example.test"))
    ///     .resource(ResourceConfig::new("first_post", HttpMethod::Get, "/posts/1"))
    ///     .transport(|request: &AssembledRequest| -> Result<RawResponse, TransportError> {
    ///         Ok(RawResponse::new(200, request.url().as_str())
    ///             .with_json(&json!({"id": 1, "title": "hello"})))
    ///     })
    ///     .build()?;
    ///
    /// let post: Post = api.resource("first_post")?.get_response(&CallArgs::new())?.json()?;
    /// assert_eq!(post.title, "hello");
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn json<T>(&self) -> Result<T, ContentError>
    where
        T: DeserializeOwned,
    {
        let to_error = |err: serde_path_to_error::Error<serde_json::Error>| {
            ContentError::Deserialize {
                path: err.path().to_string(),
                message: err.inner().to_string(),
            }
        };
        match self.fetch()? {
            Content::Json(value) => serde_path_to_error::deserialize(value).map_err(to_error),
            Content::Raw(content) => {
                let deserializer = &mut serde_json::Deserializer::from_slice(content);
                serde_path_to_error::deserialize(deserializer).map_err(to_error)
            }
        }
    }

    fn process(&self) -> Result<Content, ContentError> {
        process(&self.raw, &self.handler)
    }
}

fn process(raw: &RawResponse, handler: &ResponseHandler) -> Result<Content, ContentError> {
    match handler {
        ResponseHandler::Raw => Ok(Content::Raw(raw.content.clone())),
        ResponseHandler::Json { extract_section } => {
            check_content_type(raw)?;
            let document = decode(&raw.content)?;
            extract(document, extract_section).map(Content::Json)
        }
    }
}

fn check_content_type(raw: &RawResponse) -> Result<(), ContentError> {
    let Some(content_type) = raw.content_type() else {
        return Ok(());
    };
    let is_json = content_type.parse::<mime::Mime>().is_ok_and(|mime| {
        mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON)
    });
    if is_json {
        Ok(())
    } else {
        Err(ContentError::UnexpectedContentType {
            content_type: content_type.to_string(),
        })
    }
}

fn decode(content: &[u8]) -> Result<Value, ContentError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(content).map_err(|err| ContentError::InvalidJson {
        message: err.to_string(),
    })
}

fn extract(document: Value, section: &[SectionKey]) -> Result<Value, ContentError> {
    let mut current = document;
    let mut path = String::new();
    for key in section {
        path.push('/');
        path.push_str(&key.to_string());
        let next = match (current, key) {
            (Value::Object(mut object), SectionKey::Key(key)) => object.shift_remove(key),
            (Value::Array(mut array), SectionKey::Index(index)) if *index < array.len() => {
                Some(array.swap_remove(*index))
            }
            _ => None,
        };
        current = next.ok_or_else(|| ContentError::MissingContent { path: path.clone() })?;
    }
    Ok(current)
}
