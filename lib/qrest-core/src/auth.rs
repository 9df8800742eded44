use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;
use http::header::{AUTHORIZATION, HeaderName};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Credentials that cannot be rendered into an HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// The API key header name is not a valid header name.
    #[display("invalid header name '{name}': {message}")]
    InvalidHeaderName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// The rendered credentials contain characters forbidden in a header value.
    #[display("invalid {scheme} credentials: {message}")]
    InvalidHeaderValue {
        /// `bearer`, `basic` or `api key`.
        scheme: &'static str,
        /// Why it was rejected.
        message: String,
    },

    /// Basic authentication separates username and password with a colon.
    #[display("username '{username}' contains a colon")]
    ColonInUsername {
        /// The rejected username.
        username: String,
    },
}

/// A secret zeroed on drop and never printed in full.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize, derive_more::From)]
#[serde(transparent)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret in clear text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(***)")
    }
}

/// Shows the last four characters of long secrets only.
impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hint = self
            .0
            .char_indices()
            .rev()
            .nth(3)
            .filter(|_| self.0.chars().count() > 12)
            .and_then(|(start, _)| self.0.get(start..));
        match hint {
            Some(tail) => write!(f, "***{tail}"),
            None => f.write_str("***"),
        }
    }
}

/// Static credentials sent with every request of an API.
///
/// ```rust
/// use qrest_core::Authentication;
///
/// let token = Authentication::Bearer("my-api-token".into());
/// let basic = Authentication::Basic {
///     username: "user".to_string(),
///     password: "pass".into(),
/// };
/// let key = Authentication::ApiKey {
///     header_name: "X-API-Key".to_string(),
///     key: "secret-key".into(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authentication {
    /// `Authorization: Bearer <token>`
    Bearer(SecureString),

    /// `Authorization: Basic <base64(username:password)>`
    Basic {
        /// The user.
        username: String,
        /// The password.
        password: SecureString,
    },

    /// `<header_name>: <key>`
    ApiKey {
        /// The header carrying the key.
        header_name: String,
        /// The key.
        key: SecureString,
    },
}

impl Authentication {
    /// Renders the credentials as a sensitive header.
    ///
    /// # Errors
    ///
    /// Fails if the credentials cannot be sent in a header.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        let (name, scheme, rendered) = match self {
            Self::Bearer(token) => (AUTHORIZATION, "bearer", format!("Bearer {}", token.as_str())),
            Self::Basic { username, password } => {
                if username.contains(':') {
                    return Err(AuthenticationError::ColonInUsername {
                        username: username.clone(),
                    });
                }
                let credentials = STANDARD.encode(format!("{username}:{}", password.as_str()));
                (AUTHORIZATION, "basic", format!("Basic {credentials}"))
            }
            Self::ApiKey { header_name, key } => {
                let name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|err| {
                    AuthenticationError::InvalidHeaderName {
                        name: header_name.clone(),
                        message: err.to_string(),
                    }
                })?;
                (name, "api key", key.as_str().to_string())
            }
        };

        let mut value = HeaderValue::from_str(&rendered).map_err(|err| {
            AuthenticationError::InvalidHeaderValue {
                scheme,
                message: err.to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok((name, value))
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => write!(f, "bearer {token}"),
            Self::Basic { username, password } => write!(f, "basic {username}:{password}"),
            Self::ApiKey { header_name, key } => write!(f, "{header_name}: {key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::bearer(Authentication::Bearer("my-secret-token".into()), "authorization", "Bearer my-secret-token")]
    #[case::basic(
        Authentication::Basic { username: "user".to_string(), password: "pass".into() },
        "authorization",
        "Basic dXNlcjpwYXNz"
    )]
    #[case::api_key(
        Authentication::ApiKey { header_name: "X-API-Key".to_string(), key: "secret-key-123".into() },
        "x-api-key",
        "secret-key-123"
    )]
    fn should_render_header(
        #[case] auth: Authentication,
        #[case] expected_name: &str,
        #[case] expected_value: &str,
    ) {
        let (name, value) = auth.to_header().expect("valid credentials");

        assert_eq!(name, expected_name);
        assert_eq!(value, expected_value);
        assert!(value.is_sensitive());
    }

    #[rstest]
    #[case::control_in_token(Authentication::Bearer("\0token".into()))]
    #[case::colon_in_username(Authentication::Basic {
        username: "user:name".to_string(),
        password: "pass".into(),
    })]
    #[case::space_in_header(Authentication::ApiKey {
        header_name: "Api Key".to_string(),
        key: "key".into(),
    })]
    fn should_reject_credentials(#[case] auth: Authentication) {
        let result = auth.to_header();

        assert!(result.is_err(), "{auth:?} should be rejected");
    }

    #[test]
    fn should_mask_secrets() {
        let long = Authentication::Bearer("very-secret-token-12345".into());
        let short = Authentication::ApiKey {
            header_name: "X-API-Key".to_string(),
            key: "short".into(),
        };

        assert_eq!(long.to_string(), "bearer ***2345");
        assert_eq!(short.to_string(), "X-API-Key: ***");
        insta::assert_snapshot!(format!("{short:?}"), @r#"ApiKey { header_name: "X-API-Key", key: SecureString(***) }"#);
    }

    #[test]
    fn should_load_from_document() {
        let auth: Authentication =
            serde_json::from_str(r#"{"basic": {"username": "user", "password": "pass"}}"#)
                .expect("valid document");

        assert_eq!(
            auth,
            Authentication::Basic {
                username: "user".to_string(),
                password: "pass".into(),
            }
        );
    }
}
