//! Request dispatch.
//!
//! This module turns declarative targets into responses:
//!
//! - **Live dispatch** over reqwest, with request interceptors
//! - **Stubbed dispatch** from canned responses, immediately or delayed
//! - **One decode contract** for both paths
//! - **Classified dispatch** mapping status codes to domain errors
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── provider    - Provider and StubBehavior
//! ├── interceptor - RequestInterceptor and BearerTokenInterceptor
//! ├── config      - Provider configuration
//! └── utils       - status helpers and body decoding
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Provider`] | Dispatch engine |
//! | [`StubBehavior`] | Live vs. stubbed mode |
//! | [`ProviderConfig`] | Timeouts, proxy, default headers, logging |
//! | [`RequestInterceptor`] | Adapts requests before send |
//!
//! # Examples
//!
//! ## Creating a Provider
//!
//! ```
//! use endpoint_http::client::{Provider, ProviderConfig, StubBehavior};
//! use std::time::Duration;
//!
//! // Live, default configuration
//! let provider = Provider::new();
//!
//! // Custom configuration
//! let config = ProviderConfig {
//!     request_timeout_ms: 5_000,
//!     ..Default::default()
//! };
//! let provider = Provider::with_config(config);
//!
//! // Canned responses after a short delay
//! let provider = Provider::stubbed(StubBehavior::Delayed(Duration::from_millis(200)));
//! assert!(provider.stub_behavior().is_stubbed());
//! ```
//!
//! ## Status Helpers
//!
//! ```
//! use endpoint_http::client::{is_access_denied_status, is_success_status};
//!
//! assert!(is_success_status(204));
//! assert!(is_access_denied_status(403));
//! assert!(!is_access_denied_status(404));
//! ```

mod config;
mod interceptor;
mod provider;
mod utils;

pub use config::ProviderConfig;
pub use interceptor::{BearerTokenInterceptor, RequestInterceptor};
pub use provider::{Provider, StubBehavior};
pub use utils::*;
