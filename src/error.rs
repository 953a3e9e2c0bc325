//! Error types for request materialization and dispatch.
//!
//! [`NetworkError`] is the lower-level failure shape: anything that goes wrong
//! between building a request and decoding its body. Status-code driven
//! domain errors live in [`crate::classify`] instead.
//!
//! # Error Categories
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `InvalidUrl` | base URL and path do not form a valid URL |
//! | `Encoding` | a task payload failed to serialize |
//! | `Decoding` | a response body did not match the decode type |
//! | `Timeout` / `Connectivity` / `Transport` | the HTTP exchange failed |
//! | `Interceptor` | a request interceptor refused to adapt the request |
//! | `Stub` | a target's canned response is a designated failure |

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Failures raised while materializing, dispatching or decoding a request.
///
/// Payloads are rendered to `String` so the error stays `Clone` and can be
/// stored inside a [`crate::StubResponse::Failure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The resolved URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A task payload could not be encoded into the request.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The response body could not be decoded into the requested type.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection to the server could not be established.
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request interceptor failed, typically while attaching credentials.
    #[error("interceptor failed: {0}")]
    Interceptor(String),

    /// Designated failure returned by a stubbed target.
    #[error("stub failure: {0}")]
    Stub(String),
}

impl NetworkError {
    /// True for failures of the HTTP exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NetworkError::Timeout(_) | NetworkError::Connectivity(_) | NetworkError::Transport(_)
        )
    }

    /// True when the failure came from an interceptor.
    pub fn is_interceptor(&self) -> bool {
        matches!(self, NetworkError::Interceptor(_))
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout(err.to_string())
        } else if err.is_connect() {
            NetworkError::Connectivity(err.to_string())
        } else if err.is_decode() {
            NetworkError::Decoding(err.to_string())
        } else if err.is_builder() {
            NetworkError::Encoding(err.to_string())
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        NetworkError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_predicate() {
        assert!(NetworkError::Timeout("t".into()).is_transport());
        assert!(NetworkError::Connectivity("c".into()).is_transport());
        assert!(!NetworkError::Decoding("d".into()).is_transport());
        assert!(!NetworkError::Interceptor("i".into()).is_transport());
    }

    #[test]
    fn test_url_parse_error_maps_to_invalid_url() {
        let err: NetworkError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }

    #[test]
    fn test_display() {
        let err = NetworkError::Encoding("key must be a string".into());
        assert_eq!(err.to_string(), "encoding failed: key must be a string");
    }
}
