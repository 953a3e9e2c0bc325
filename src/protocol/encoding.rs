//! Parameter encoding into URL queries and request bodies.
//!
//! Parameters are a sorted map of JSON values. Nested values are flattened
//! with the bracket convention most form parsers understand:
//!
//! | Value | Components |
//! |-------|------------|
//! | `{"a": "x"}` | `a=x` |
//! | `{"a": [1, 2]}` | `a[]=1&a[]=2` |
//! | `{"a": {"b": true}}` | `a[b]=true` |
//! | `{"a": null}` | `a=` |
//!
//! Keys and values are percent-encoded with the
//! `application/x-www-form-urlencoded` byte set (spaces become `+`).

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::error::{NetworkError, Result};

/// Request parameters. Keys are emitted in sorted order.
pub type Parameters = BTreeMap<String, Value>;

/// Where and how [`Parameters`] are written into a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterEncoding {
    /// Append to the URL query string.
    QueryString,
    /// Encode as an `application/x-www-form-urlencoded` body.
    FormBody,
    /// Encode as a JSON object body.
    JsonBody,
    /// Query string for GET, HEAD and DELETE; form body otherwise.
    #[default]
    MethodDependent,
}

/// Flatten parameters into ordered `(key, value)` string pairs.
pub fn query_pairs(params: &Parameters) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_components(key, value, &mut pairs);
    }
    pairs
}

fn push_components(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (nested, v) in map {
                push_components(&format!("{}[{}]", key, nested), v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                push_components(&format!("{}[]", key), v, out);
            }
        }
        Value::String(s) => out.push((key.to_string(), s.clone())),
        Value::Null => out.push((key.to_string(), String::new())),
        Value::Bool(_) | Value::Number(_) => out.push((key.to_string(), value.to_string())),
    }
}

/// Append parameters to the URL query, keeping any query already present.
pub fn append_query(url: &mut Url, params: &Parameters) {
    let pairs = query_pairs(params);
    if pairs.is_empty() {
        return;
    }
    let mut serializer = url.query_pairs_mut();
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
}

/// Encode parameters as a form body.
pub fn form_body(params: &Parameters) -> Vec<u8> {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query_pairs(params))
        .finish()
        .into_bytes()
}

/// Encode parameters as a JSON object body.
pub fn json_body(params: &Parameters) -> Result<Vec<u8>> {
    serde_json::to_vec(params).map_err(|e| NetworkError::Encoding(e.to_string()))
}
