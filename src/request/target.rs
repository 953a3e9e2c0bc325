//! The call-site contract.
//!
//! An API operation is described by implementing [`TargetType`], usually on
//! an enum with one variant per endpoint:
//!
//! ```
//! use endpoint_http::{HttpMethod, TargetType, TaskType, StubResponse};
//!
//! enum ChallengeApi {
//!     Detail { id: u64 },
//!     Join { id: u64, code: String },
//! }
//!
//! impl TargetType for ChallengeApi {
//!     fn base_url(&self) -> String {
//!         "https://api.example.com/v1".to_string()
//!     }
//!
//!     fn path(&self) -> String {
//!         match self {
//!             ChallengeApi::Detail { id } => format!("challenges/{}", id),
//!             ChallengeApi::Join { id, .. } => format!("challenges/{}/members", id),
//!         }
//!     }
//!
//!     fn method(&self) -> HttpMethod {
//!         match self {
//!             ChallengeApi::Detail { .. } => HttpMethod::Get,
//!             ChallengeApi::Join { .. } => HttpMethod::Post,
//!         }
//!     }
//!
//!     fn task(&self) -> TaskType {
//!         match self {
//!             ChallengeApi::Detail { .. } => TaskType::Plain,
//!             ChallengeApi::Join { code, .. } => {
//!                 TaskType::json(serde_json::json!({ "invitationCode": code }))
//!             }
//!         }
//!     }
//!
//!     fn stub_response(&self) -> StubResponse {
//!         StubResponse::ok(r#"{"id": 1, "title": "Morning run"}"#)
//!     }
//! }
//! ```

use bytes::Bytes;

use crate::client::reason_phrase;
use crate::error::NetworkError;
use crate::protocol::{HttpHeaders, HttpMethod};
use crate::request::task::TaskType;

/// Canned response a target returns when the provider is stubbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubResponse {
    /// A completed exchange, decoded exactly like a live body.
    Response {
        /// HTTP status code.
        status_code: u16,
        /// Body bytes.
        payload: Bytes,
        /// Reason phrase.
        status_text: String,
        /// Free-form message surfaced on the [`BaseResponse`](crate::BaseResponse).
        message: String,
    },
    /// The dispatch fails with this error.
    Failure(NetworkError),
}

impl StubResponse {
    /// 200 with the given body.
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self::with_status(200, payload)
    }

    /// Arbitrary status with the given body; the reason phrase is filled in.
    pub fn with_status(status_code: u16, payload: impl Into<Bytes>) -> Self {
        StubResponse::Response {
            status_code,
            payload: payload.into(),
            status_text: reason_phrase(status_code).unwrap_or_default(),
            message: String::new(),
        }
    }

    /// Designated failure.
    pub fn failure(error: NetworkError) -> Self {
        StubResponse::Failure(error)
    }

    /// Set the message of a `Response`; no-op on `Failure`.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        if let StubResponse::Response { message, .. } = &mut self {
            *message = text.into();
        }
        self
    }
}

impl Default for StubResponse {
    fn default() -> Self {
        StubResponse::ok(Bytes::new())
    }
}

/// Everything needed to build the request for one API operation.
///
/// Implementations should be pure functions of `self`: the provider may call
/// each accessor more than once per dispatch.
pub trait TargetType: Send + Sync {
    /// Scheme, host and optional base path, e.g. `https://api.example.com/v1`.
    fn base_url(&self) -> String;

    /// Path relative to [`base_url`](Self::base_url). May be empty.
    fn path(&self) -> String;

    /// HTTP method.
    fn method(&self) -> HttpMethod;

    /// Body/query shape.
    fn task(&self) -> TaskType;

    /// Request headers. Empty by default.
    fn headers(&self) -> HttpHeaders {
        HttpHeaders::new()
    }

    /// Canned response used when the provider is stubbed. 200 with an empty
    /// payload by default.
    fn stub_response(&self) -> StubResponse {
        StubResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stub_is_empty_ok() {
        match StubResponse::default() {
            StubResponse::Response {
                status_code,
                payload,
                status_text,
                message,
            } => {
                assert_eq!(status_code, 200);
                assert!(payload.is_empty());
                assert_eq!(status_text, "OK");
                assert!(message.is_empty());
            }
            other => panic!("unexpected stub: {:?}", other),
        }
    }

    #[test]
    fn test_with_status_fills_reason() {
        let stub = StubResponse::with_status(404, "{}").with_message("missing");
        assert_eq!(
            stub,
            StubResponse::Response {
                status_code: 404,
                payload: Bytes::from_static(b"{}"),
                status_text: "Not Found".into(),
                message: "missing".into(),
            }
        );
    }

    #[test]
    fn test_with_status_unknown_code_has_empty_reason() {
        match StubResponse::with_status(299, "") {
            StubResponse::Response { status_text, .. } => assert_eq!(status_text, ""),
            other => panic!("unexpected stub: {:?}", other),
        }
    }

    #[test]
    fn test_message_ignored_on_failure() {
        let stub = StubResponse::failure(NetworkError::Stub("offline".into())).with_message("x");
        assert_eq!(stub, StubResponse::Failure(NetworkError::Stub("offline".into())));
    }
}
