use std::fmt;

use tracing::warn;

use crate::RawResponse;

/// The server answered with a `4xx` or `5xx` status.
///
/// Every variant keeps the whole [`RawResponse`], so callers can inspect headers and body.
/// Messages quote at most [`BODY_SNIPPET_LIMIT`](crate::transport::BODY_SNIPPET_LIMIT) bytes of
/// the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// `400 Bad Request`.
    BadRequest(RawResponse),
    /// `401`, `402` or `403`.
    AccessDenied(RawResponse),
    /// `404 Not Found`.
    NotFound(RawResponse),
    /// `500 Internal Server Error`.
    InternalServerError(RawResponse),
    /// Any other status from `400` upwards.
    Unspecified(RawResponse),
}

impl ResourceError {
    /// The response that triggered the error.
    pub fn response(&self) -> &RawResponse {
        match self {
            Self::BadRequest(response)
            | Self::AccessDenied(response)
            | Self::NotFound(response)
            | Self::InternalServerError(response)
            | Self::Unspecified(response) => response,
        }
    }

    /// Takes the response out of the error.
    pub fn into_response(self) -> RawResponse {
        match self {
            Self::BadRequest(response)
            | Self::AccessDenied(response)
            | Self::NotFound(response)
            | Self::InternalServerError(response)
            | Self::Unspecified(response) => response,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.response().status
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.response();
        let RawResponse {
            status,
            reason,
            url,
            ..
        } = response;
        match self {
            Self::BadRequest(_) => write!(
                f,
                "Bad request for resource {url} ({reason}): {}",
                response.body_snippet()
            ),
            Self::AccessDenied(_) => {
                write!(f, "error {status}: Access is denied to resource {url}")
            }
            Self::NotFound(_) => write!(f, "Object could not be found in database ({reason})"),
            Self::InternalServerError(_) => write!(
                f,
                "error 500: Internal Server error ({reason}): {}",
                response.body_snippet()
            ),
            Self::Unspecified(_) => write!(f, "REST error {status}: {reason}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// Passes responses below `400` through and turns the others into a [`ResourceError`].
pub(crate) fn classify(response: RawResponse) -> Result<RawResponse, ResourceError> {
    let error = match response.status {
        ..400 => return Ok(response),
        400 => ResourceError::BadRequest(response),
        401..=403 => ResourceError::AccessDenied(response),
        404 => ResourceError::NotFound(response),
        500 => ResourceError::InternalServerError(response),
        _ => ResourceError::Unspecified(response),
    };
    warn!(status = error.status(), url = %error.response().url, "{error}");
    Err(error)
}
