//! Provider configuration.

use serde::Deserialize;

use crate::protocol::HttpHeaders;

/// Settings applied to every request a [`Provider`](crate::Provider) sends.
///
/// Deserializable so it can be embedded in an application's own config file.
///
/// # Examples
///
/// ```
/// use endpoint_http::ProviderConfig;
///
/// let config = ProviderConfig {
///     request_timeout_ms: 5_000,
///     enable_logging: false,
///     ..Default::default()
/// };
/// assert_eq!(config.connect_timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Whole-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Proxy for all traffic. Empty means no proxy.
    pub proxy_url: String,
    /// Headers sent with every request; target headers override them.
    pub default_headers: HttpHeaders,
    /// Emit `tracing` events for dispatches and failures.
    pub enable_logging: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            proxy_url: String::new(),
            default_headers: HttpHeaders::new(),
            enable_logging: true,
        }
    }
}
