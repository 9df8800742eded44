use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::ConfigurationError;

/// Regular expression for a whole `{placeholder}` segment.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{(?<name>\w+)}$").expect("a valid regex"));

/// Characters left as-is in a path segment: alphanumerics and the RFC 3986 unreserved marks.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a value so it stays within one path segment.
pub(crate) fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Placeholder(String),
}

/// A parsed resource path: literal segments and named placeholders.
///
/// Built from the segment list of a resource, e.g. `["posts", "{post_id}", "comments"]`.
/// Empty segments are ignored, so a template can also be written as `"/posts/{post_id}"`
/// split on `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    /// Parses the segments of `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPathSegment`] when a segment contains braces without
    /// being a whole `{name}` placeholder.
    pub fn parse<S: AsRef<str>>(resource: &str, segments: &[S]) -> Result<Self, ConfigurationError> {
        let mut parsed = Vec::with_capacity(segments.len());
        for segment in segments.iter().map(AsRef::as_ref) {
            let segment = segment.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            if let Some(caps) = PLACEHOLDER.captures(segment) {
                let name = caps.name("name").map(|m| m.as_str()).unwrap_or_default();
                parsed.push(PathSegment::Placeholder(name.to_string()));
            } else if segment.contains(['{', '}', '/']) {
                return Err(ConfigurationError::InvalidPathSegment {
                    resource: resource.to_string(),
                    segment: segment.to_string(),
                });
            } else {
                parsed.push(PathSegment::Literal(segment.to_string()));
            }
        }
        Ok(Self { segments: parsed })
    }

    /// Distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let PathSegment::Placeholder(name) = segment
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }

    /// Renders the path (without leading slash) using already-encoded placeholder values.
    ///
    /// Returns the name of the first placeholder without a value on failure.
    pub(crate) fn render<'a>(
        &'a self,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<String, &'a str> {
        let mut rendered = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                PathSegment::Literal(literal) => rendered.push(literal.as_str()),
                PathSegment::Placeholder(name) => rendered.push(lookup(name).ok_or(name.as_str())?),
            }
        }
        Ok(rendered.join("/"))
    }
}
