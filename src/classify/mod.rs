//! Status-code to domain error classification.
//!
//! A completed dispatch is either a transport failure ([`NetworkError`]) or an
//! HTTP response with a status code and possibly an error body. The
//! [`ErrorClassifier`] folds both into [`ClassifiedError`]:
//!
//! | Input | Result |
//! |-------|--------|
//! | 2xx | success |
//! | status in the override table | the configured [`ApiError`] |
//! | 400 | [`ApiError::BadRequest`] with the server's code and message |
//! | 401, 403 | [`ApiError::AuthenticationFailed`] |
//! | 404 + known server code | [`ApiError::NotFound`] with the mapped kind |
//! | 404 + unknown/missing code | [`ApiError::ClientError`], code and message unchanged |
//! | any other status | [`ApiError::ServerError`] |
//! | [`NetworkError::Interceptor`] | [`ApiError::AuthenticationFailed`] |
//! | any other [`NetworkError`] | passed through as [`ClassifiedError::Network`] |
//!
//! # Examples
//!
//! ```
//! use endpoint_http::{ApiError, ErrorBody, ErrorClassifier, NotFoundKind};
//!
//! let classifier = ErrorClassifier::default()
//!     .with_status(400, ApiError::InvalidInvitationCode);
//!
//! let body = ErrorBody::parse(br#"{"code": "CHALLENGE_NOT_FOUND", "message": "gone"}"#);
//! assert_eq!(
//!     classifier.classify_status(404, &body),
//!     Some(ApiError::NotFound(NotFoundKind::Challenge))
//! );
//! assert_eq!(
//!     classifier.classify_status(400, &ErrorBody::default()),
//!     Some(ApiError::InvalidInvitationCode)
//! );
//! assert_eq!(classifier.classify_status(200, &ErrorBody::default()), None);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::client::{is_access_denied_status, is_success_status};
use crate::error::NetworkError;

/// Resource a 404 refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFoundKind {
    /// A user account.
    User,
    /// A challenge.
    Challenge,
    /// Membership of a user in a challenge.
    Member,
    /// A comment.
    Comment,
    /// A certification post.
    Certification,
    /// Any other addressed resource.
    Resource,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotFoundKind::User => "user",
            NotFoundKind::Challenge => "challenge",
            NotFoundKind::Member => "member",
            NotFoundKind::Comment => "comment",
            NotFoundKind::Certification => "certification",
            NotFoundKind::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Closed set of domain failures derived from HTTP status codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// An invitation code was rejected.
    #[error("invalid invitation code")]
    InvalidInvitationCode,

    /// 400 without a more specific mapping.
    #[error("bad request (code: {code:?}, message: {message:?})")]
    BadRequest {
        /// Server-supplied machine-readable code.
        code: Option<String>,
        /// Server-supplied message.
        message: Option<String>,
    },

    /// 401/403, or an interceptor failure.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// 404 with a recognized server code.
    #[error("{0} not found")]
    NotFound(NotFoundKind),

    /// 404 with an unrecognized or missing server code.
    #[error("client error (code: {code:?}, message: {message:?})")]
    ClientError {
        /// Server-supplied code, unchanged.
        code: Option<String>,
        /// Server-supplied message, unchanged.
        message: Option<String>,
    },

    /// Any other non-2xx status.
    #[error("server error (status {status})")]
    ServerError {
        /// The HTTP status.
        status: u16,
    },
}

/// Either a domain error or a lower-level network error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifiedError {
    /// Status-derived domain error.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Transport, encoding or decoding failure.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Machine-readable fields of an error response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    /// Error code, e.g. `CHALLENGE_NOT_FOUND`.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
}

const CODE_FIELDS: [&str; 3] = ["code", "errorCode", "error_code"];

impl ErrorBody {
    /// Parse leniently, field by field.
    ///
    /// The code is taken from the first present field among `code`,
    /// `errorCode` and `error_code`; numeric codes are kept as their decimal
    /// text. A body that is not a JSON object yields an empty `ErrorBody`.
    pub fn parse(body: &[u8]) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return ErrorBody::default();
        };
        let code = CODE_FIELDS
            .iter()
            .filter_map(|name| fields.get(*name))
            .find_map(scalar_text);
        let message = fields.get("message").and_then(scalar_text);
        ErrorBody { code, message }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Configurable status-code classifier.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    status_overrides: BTreeMap<u16, ApiError>,
    not_found_codes: HashMap<String, NotFoundKind>,
}

impl ErrorClassifier {
    /// Classifier with no overrides and no 404 sub-codes.
    pub fn empty() -> Self {
        ErrorClassifier {
            status_overrides: BTreeMap::new(),
            not_found_codes: HashMap::new(),
        }
    }

    /// Map `status` straight to `error`, ahead of the built-in rules.
    pub fn with_status(mut self, status: u16, error: ApiError) -> Self {
        self.status_overrides.insert(status, error);
        self
    }

    /// Map a 404 server code to a [`NotFoundKind`].
    pub fn with_not_found_code(mut self, code: impl Into<String>, kind: NotFoundKind) -> Self {
        self.not_found_codes.insert(code.into(), kind);
        self
    }

    /// Classify a status code. `None` means success.
    pub fn classify_status(&self, status: u16, body: &ErrorBody) -> Option<ApiError> {
        if is_success_status(status) {
            return None;
        }
        if let Some(error) = self.status_overrides.get(&status) {
            return Some(error.clone());
        }
        let error = match status {
            400 => ApiError::BadRequest {
                code: body.code.clone(),
                message: body.message.clone(),
            },
            s if is_access_denied_status(s) => ApiError::AuthenticationFailed,
            404 => match body.code.as_deref().and_then(|c| self.not_found_codes.get(c)) {
                Some(kind) => ApiError::NotFound(*kind),
                None => ApiError::ClientError {
                    code: body.code.clone(),
                    message: body.message.clone(),
                },
            },
            status => ApiError::ServerError { status },
        };
        Some(error)
    }

    /// Classify a status code together with its raw body.
    pub fn classify_response(&self, status: u16, body: &[u8]) -> Option<ApiError> {
        if is_success_status(status) {
            return None;
        }
        self.classify_status(status, &ErrorBody::parse(body))
    }

    /// Classify a transport-level failure.
    pub fn classify_network(&self, error: NetworkError) -> ClassifiedError {
        match error {
            NetworkError::Interceptor(_) => ClassifiedError::Api(ApiError::AuthenticationFailed),
            other => ClassifiedError::Network(other),
        }
    }
}

impl Default for ErrorClassifier {
    /// Classifier with the standard 404 sub-code table.
    fn default() -> Self {
        ErrorClassifier::empty()
            .with_not_found_code("USER_NOT_FOUND", NotFoundKind::User)
            .with_not_found_code("CHALLENGE_NOT_FOUND", NotFoundKind::Challenge)
            .with_not_found_code("MEMBER_NOT_FOUND", NotFoundKind::Member)
            .with_not_found_code("COMMENT_NOT_FOUND", NotFoundKind::Comment)
            .with_not_found_code("CERTIFICATION_NOT_FOUND", NotFoundKind::Certification)
            .with_not_found_code("RESOURCE_NOT_FOUND", NotFoundKind::Resource)
    }
}
