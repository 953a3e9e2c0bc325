//! Resolved request descriptors and their wire materialization.
//!
//! An [`EndPoint`] is the concrete form of a [`TargetType`]: a full URL, a
//! method, a task and headers. [`EndPoint::url_request`] turns it into a
//! [`WireRequest`] with the body and query the task asks for.

use bytes::Bytes;
use url::Url;

use crate::error::{NetworkError, Result};
use crate::protocol::constants::{headers, media_types};
use crate::protocol::{append_query, form_body, json_body, HttpHeaders, HttpMethod, ParameterEncoding, Parameters};
use crate::request::target::TargetType;
use crate::request::task::{JsonEncoder, TaskType};

/// A fully resolved request descriptor.
#[derive(Debug, Clone)]
pub struct EndPoint {
    /// Absolute URL before any query parameters from the task.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Body/query shape.
    pub task: TaskType,
    /// Request headers.
    pub headers: HttpHeaders,
}

impl EndPoint {
    /// Descriptor from explicit parts.
    pub fn new(url: impl Into<String>, method: HttpMethod, task: TaskType, headers: HttpHeaders) -> Self {
        EndPoint {
            url: url.into(),
            method,
            task,
            headers,
        }
    }

    /// Resolve a target: `base_url` joined with `path`, plus its method,
    /// task and headers.
    pub fn from_target<T: TargetType + ?Sized>(target: &T) -> Self {
        EndPoint {
            url: join_url(&target.base_url(), &target.path()),
            method: target.method(),
            task: target.task(),
            headers: target.headers(),
        }
    }

    /// Copy with `extra` merged over the current headers.
    pub fn adding_headers(mut self, extra: &HttpHeaders) -> Self {
        self.headers.merge(extra);
        self
    }

    /// Copy with a different task.
    pub fn replacing_task(mut self, task: TaskType) -> Self {
        self.task = task;
        self
    }

    /// Materialize the wire request.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidUrl`] when the URL does not parse and
    /// [`NetworkError::Encoding`] when the task payload cannot be encoded.
    /// Nothing is returned on failure.
    pub fn url_request(&self) -> Result<WireRequest> {
        let url = Url::parse(&self.url)?;
        let mut request = WireRequest {
            method: self.method,
            url,
            headers: self.headers.clone(),
            body: None,
        };

        match &self.task {
            TaskType::Plain => {}
            TaskType::RawData(data) => {
                request.body = Some(data.clone());
            }
            TaskType::JsonEncodable(value) => {
                let body = value.encode_with(&JsonEncoder::default())?;
                request.set_body(body, media_types::JSON);
            }
            TaskType::JsonEncodableCustom(value, encoder) => {
                let body = value.encode_with(encoder)?;
                request.set_body(body, media_types::JSON);
            }
            TaskType::Parameters(params, encoding) => {
                request.encode_parameters(params, *encoding)?;
            }
            TaskType::CompositeData(data, query) => {
                request.body = Some(data.clone());
                request.encode_parameters(query, ParameterEncoding::QueryString)?;
            }
            TaskType::CompositeParameters {
                body,
                body_encoding,
                query,
            } => {
                let body_encoding = match body_encoding {
                    ParameterEncoding::QueryString => {
                        return Err(NetworkError::Encoding(
                            "composite body parameters cannot use query-string encoding".to_string(),
                        ))
                    }
                    ParameterEncoding::MethodDependent => ParameterEncoding::FormBody,
                    other => *other,
                };
                request.encode_parameters(body, body_encoding)?;
                request.encode_parameters(query, ParameterEncoding::QueryString)?;
            }
            TaskType::Multipart(form) => {
                let content_type = form.content_type();
                request.set_body(form.encode(), &content_type);
            }
        }

        Ok(request)
    }
}

/// `base` and `path` joined with exactly one `/`; an empty path keeps `base`.
fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// A materialized HTTP request, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL including query.
    pub url: Url,
    /// Headers in insertion order.
    pub headers: HttpHeaders,
    /// Body, if any.
    pub body: Option<Bytes>,
}

impl WireRequest {
    /// Set the body and a default content type.
    ///
    /// A `Content-Type` already present (e.g. from the target) is kept.
    pub fn set_body(&mut self, body: impl Into<Bytes>, content_type: &str) {
        self.body = Some(body.into());
        self.headers.insert_if_absent(headers::CONTENT_TYPE, content_type);
    }

    /// Apply parameters with `encoding`, leaving everything else unchanged.
    pub fn encode_parameters(&mut self, params: &Parameters, encoding: ParameterEncoding) -> Result<()> {
        if params.is_empty() {
            return Ok(());
        }
        let in_url = match encoding {
            ParameterEncoding::QueryString => true,
            ParameterEncoding::MethodDependent => self.method.encodes_parameters_in_url(),
            ParameterEncoding::FormBody | ParameterEncoding::JsonBody => false,
        };
        if in_url {
            append_query(&mut self.url, params);
        } else if encoding == ParameterEncoding::JsonBody {
            self.set_body(json_body(params)?, media_types::JSON);
        } else {
            self.set_body(form_body(params), media_types::FORM_URLENCODED);
        }
        Ok(())
    }

    /// Build the reqwest request on `client`.
    pub fn into_reqwest(self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut builder = client.request(self.method.into(), self.url);
        for (name, value) in self.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = self.body {
            builder = builder.body(body);
        }
        builder
    }
}
