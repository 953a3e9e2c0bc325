#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # endpoint_http: declarative HTTP endpoints
//!
//! Call sites describe an API operation once, as a [`TargetType`]. The crate
//! turns that description into a wire request, sends it (or answers from a
//! canned stub), decodes the body into a [`BaseResponse`], and classifies
//! failures into a closed [`ApiError`] taxonomy.
//!
//! ## Overview
//!
//! 1. **Describe** - implement [`TargetType`]: base URL, path, method,
//!    [`TaskType`], headers, stub response
//! 2. **Resolve** - [`EndPoint::from_target`] and [`EndPoint::url_request`]
//!    materialize body and query (JSON, form, query string, multipart)
//! 3. **Dispatch** - [`Provider`] goes live or stubs per [`StubBehavior`]
//! 4. **Classify** - [`ErrorClassifier`] maps status codes and interceptor
//!    failures to [`ApiError`]
//!
//! ## Client Usage
//!
//! ```ignore
//! use endpoint_http::{ErrorClassifier, Provider, ApiError, NotFoundKind};
//!
//! let provider = Provider::new();
//! let classifier = ErrorClassifier::default();
//!
//! match provider
//!     .request_classified::<_, Challenge>(&ChallengeApi::Detail { id: 1 }, &classifier)
//!     .await
//! {
//!     Ok(response) => println!("{}", response.data.title),
//!     Err(ClassifiedError::Api(ApiError::NotFound(NotFoundKind::Challenge))) => {
//!         println!("challenge was deleted")
//!     }
//!     Err(e) => eprintln!("request failed: {}", e),
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[protocol]** - methods, headers, parameter encoding
//! - **[request]** - targets, tasks, multipart bodies, endpoints
//! - **[client]** - provider, stubbing, interceptors, configuration
//! - **[types]** - response envelopes
//! - **[classify]** - status-code classification
//! - **[error]** - network-level errors

pub mod classify;
pub mod client;
pub mod error;
pub mod protocol;
pub mod request;
pub mod types;

pub use classify::{ApiError, ClassifiedError, ErrorBody, ErrorClassifier, NotFoundKind};
pub use client::{BearerTokenInterceptor, Provider, ProviderConfig, RequestInterceptor, StubBehavior};
pub use error::{NetworkError, Result};
pub use protocol::{HttpHeaders, HttpMethod, ParameterEncoding, Parameters};
pub use request::{
    BodyPart, BoundaryGenerator, BoundaryType, EndPoint, JsonEncoder, KeyEncodingStrategy, MultipartFormData,
    StubResponse, TargetType, TaskType, WireRequest,
};
pub use types::{BaseResponse, RawResponse};

#[cfg(test)]
mod tests;
