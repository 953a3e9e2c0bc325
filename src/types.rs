//! Response envelopes.

use std::collections::BTreeMap;

use bytes::Bytes;

/// An undecoded HTTP response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Body bytes.
    pub body: Bytes,
    /// Final URL after redirects.
    pub url: String,
}

impl RawResponse {
    /// True for 2xx.
    pub fn is_success(&self) -> bool {
        crate::client::is_success_status(self.status)
    }
}

/// A decoded payload paired with its status metadata.
///
/// Produced by both live and stubbed dispatch; only `response` tells them
/// apart (`None` for stubs).
#[derive(Debug, Clone, PartialEq)]
pub struct BaseResponse<T> {
    /// Decoded body.
    pub data: T,
    /// Live HTTP status or the stub's status.
    pub status_code: u16,
    /// The transport response, present on live dispatch.
    pub response: Option<RawResponse>,
    /// Reason phrase.
    pub status_text: Option<String>,
    /// Message attached to a stub response.
    pub message: Option<String>,
}

impl<T> BaseResponse<T> {
    /// True for 2xx.
    pub fn is_success(&self) -> bool {
        crate::client::is_success_status(self.status_code)
    }

    /// True when the response came from a stub.
    pub fn is_stubbed(&self) -> bool {
        self.response.is_none()
    }

    /// Transform the payload, keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BaseResponse<U> {
        BaseResponse {
            data: f(self.data),
            status_code: self.status_code,
            response: self.response,
            status_text: self.status_text,
            message: self.message,
        }
    }
}
