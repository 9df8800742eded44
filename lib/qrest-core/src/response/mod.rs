//! Status classification and response processing.
//!
//! Once the transport returns a [`RawResponse`](crate::RawResponse), the status is classified
//! first (a `4xx`/`5xx` becomes a [`ResourceError`]), then the body is processed according to
//! the [`ResponseHandler`] of the resource.

use std::fmt;

use serde::Deserialize;

mod processed;
pub use self::processed::{Content, ContentError, ProcessedResponse};

mod status;
pub(crate) use self::status::classify;
pub use self::status::ResourceError;

/// How the body of a successful response is turned into [`Content`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseHandler {
    /// Decode the body as JSON, then walk down `extract_section`.
    Json {
        /// Keys and indices leading to the returned value; empty for the whole document.
        #[serde(default)]
        extract_section: Vec<SectionKey>,
    },
    /// Return the body bytes untouched.
    Raw,
}

impl Default for ResponseHandler {
    fn default() -> Self {
        Self::Json {
            extract_section: Vec::new(),
        }
    }
}

/// One step of an extract section: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum SectionKey {
    /// An array index.
    Index(usize),
    /// An object key.
    Key(String),
}

impl From<&str> for SectionKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => write!(f, "{key}"),
        }
    }
}
