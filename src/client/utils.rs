//! Helpers shared by the live and stubbed dispatch paths.
//!
//! - Status code classification
//! - Body decoding with one contract for both paths
//! - Conversion of transport responses into [`RawResponse`]

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::error::{NetworkError, Result};
use crate::types::RawResponse;

/// Check if status code is 2xx
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Check if status code indicates access denied
pub fn is_access_denied_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Canonical reason phrase for a status code, if it has one.
pub fn reason_phrase(status: u16) -> Option<String> {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
}

/// Decode a JSON body into `T`.
///
/// An empty body decodes as JSON `null`, so `()` and `Option<_>` accept it
/// while any struct still fails. Malformed bodies are never defaulted.
///
/// # Examples
///
/// ```
/// use endpoint_http::client::decode_body;
///
/// let unit: () = decode_body(b"").unwrap();
/// let none: Option<u32> = decode_body(b"").unwrap();
/// assert_eq!(none, None);
/// assert!(decode_body::<Vec<u32>>(b"{").is_err());
/// ```
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let input: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(input).map_err(|e| NetworkError::Decoding(e.to_string()))
}

/// Read a reqwest response into a [`RawResponse`].
pub async fn read_response(response: reqwest::Response) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let url = response.url().to_string();

    let mut headers = BTreeMap::new();
    for (k, v) in response.headers() {
        if let Ok(val) = v.to_str() {
            headers.insert(k.as_str().to_string(), val.to_string());
        }
    }

    let body = response.bytes().await?;

    Ok(RawResponse {
        status,
        headers,
        body,
        url,
    })
}
