//! How a request carries its payload.
//!
//! [`TaskType`] is the closed set of body/query shapes a target can ask for.
//! Materialization into bytes happens later, in
//! [`EndPoint::url_request`](crate::EndPoint::url_request), so encoding
//! failures surface at dispatch time as [`NetworkError::Encoding`].

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::{NetworkError, Result};
use crate::protocol::{ParameterEncoding, Parameters};
use crate::request::multipart::MultipartFormData;

/// How object keys are rewritten before output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEncodingStrategy {
    /// Keys are written as the `Serialize` impl produces them.
    #[default]
    UseDefaultKeys,
    /// `camelCase` keys become `snake_case`.
    ConvertToSnakeCase,
}

/// JSON body encoder with output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonEncoder {
    /// Indent the output.
    pub pretty: bool,
    /// Key rewriting applied to every object in the value.
    pub key_strategy: KeyEncodingStrategy,
}

impl JsonEncoder {
    /// Compact output with keys unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable indented output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Set the key strategy.
    pub fn with_key_strategy(mut self, strategy: KeyEncodingStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Serialize `value` to JSON bytes.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let encoded = match self.key_strategy {
            KeyEncodingStrategy::UseDefaultKeys => {
                if self.pretty {
                    serde_json::to_vec_pretty(value)
                } else {
                    serde_json::to_vec(value)
                }
            }
            KeyEncodingStrategy::ConvertToSnakeCase => {
                let tree = serde_json::to_value(value).map_err(encoding_error)?;
                let tree = snake_case_keys(tree);
                if self.pretty {
                    serde_json::to_vec_pretty(&tree)
                } else {
                    serde_json::to_vec(&tree)
                }
            }
        };
        encoded.map_err(encoding_error)
    }
}

fn encoding_error(err: serde_json::Error) -> NetworkError {
    NetworkError::Encoding(err.to_string())
}

fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), snake_case_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}

/// `userID` → `user_id`, `createdAt` → `created_at`, `URLString` → `url_string`.
fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

type EncodeFn = dyn Fn(&JsonEncoder) -> Result<Vec<u8>> + Send + Sync;

/// A type-erased serializable value.
///
/// Holds the value behind an `Arc` so a [`TaskType`] stays cheap to clone
/// while still deferring serialization until the request is materialized.
#[derive(Clone)]
pub struct Encodable {
    encode: Arc<EncodeFn>,
}

impl Encodable {
    /// Wrap any `Serialize` value.
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Encodable {
            encode: Arc::new(move |encoder: &JsonEncoder| encoder.encode(&value)),
        }
    }

    /// Serialize with `encoder`.
    pub fn encode_with(&self, encoder: &JsonEncoder) -> Result<Vec<u8>> {
        (self.encode)(encoder)
    }
}

impl fmt::Debug for Encodable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Encodable(..)")
    }
}

/// Payload shape of a request.
#[derive(Debug, Clone)]
pub enum TaskType {
    /// No body and no query additions.
    Plain,
    /// Body set verbatim.
    RawData(Bytes),
    /// Body is the value encoded with the default [`JsonEncoder`].
    JsonEncodable(Encodable),
    /// Body is the value encoded with the supplied encoder.
    JsonEncodableCustom(Encodable, JsonEncoder),
    /// Parameters placed according to the encoding.
    Parameters(Parameters, ParameterEncoding),
    /// Raw body plus query-string parameters.
    CompositeData(Bytes, Parameters),
    /// Body parameters, then query parameters layered on the same request.
    CompositeParameters {
        /// Parameters written into the body.
        body: Parameters,
        /// Encoding of the body parameters. `QueryString` is rejected.
        body_encoding: ParameterEncoding,
        /// Parameters appended to the URL query.
        query: Parameters,
    },
    /// `multipart/form-data` body.
    Multipart(MultipartFormData),
}

impl TaskType {
    /// [`TaskType::JsonEncodable`] for any serializable value.
    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        TaskType::JsonEncodable(Encodable::new(value))
    }

    /// [`TaskType::JsonEncodableCustom`] for any serializable value.
    pub fn json_with<T>(value: T, encoder: JsonEncoder) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        TaskType::JsonEncodableCustom(Encodable::new(value), encoder)
    }

    /// [`TaskType::Parameters`] with query-string encoding.
    pub fn query(params: Parameters) -> Self {
        TaskType::Parameters(params, ParameterEncoding::QueryString)
    }

    /// Short variant name, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskType::Plain => "plain",
            TaskType::RawData(_) => "raw_data",
            TaskType::JsonEncodable(_) => "json",
            TaskType::JsonEncodableCustom(..) => "json_custom",
            TaskType::Parameters(..) => "parameters",
            TaskType::CompositeData(..) => "composite_data",
            TaskType::CompositeParameters { .. } => "composite_parameters",
            TaskType::Multipart(_) => "multipart",
        }
    }
}
