//! Request adaptation before dispatch.
//!
//! Interceptors run on the live path only, in registration order, after the
//! wire request is materialized. Whatever error an interceptor returns, the
//! provider reports it as [`NetworkError::Interceptor`], which the
//! [`ErrorClassifier`](crate::ErrorClassifier) maps to an authentication
//! failure.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{NetworkError, Result};
use crate::protocol::constants::headers;
use crate::request::WireRequest;

/// Adapts a request before it is sent.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Return the adapted request, or an error to abort the dispatch.
    async fn adapt(&self, request: WireRequest) -> Result<WireRequest>;
}

type TokenSource = dyn Fn() -> Option<String> + Send + Sync;

/// Attaches `Authorization: Bearer <token>` from a token source.
#[derive(Clone)]
pub struct BearerTokenInterceptor {
    token: Arc<TokenSource>,
}

impl BearerTokenInterceptor {
    /// Interceptor reading the token from `source` on every request.
    pub fn new(source: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        BearerTokenInterceptor {
            token: Arc::new(source),
        }
    }
}

#[async_trait]
impl RequestInterceptor for BearerTokenInterceptor {
    async fn adapt(&self, mut request: WireRequest) -> Result<WireRequest> {
        let token = (self.token)()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NetworkError::Interceptor("no access token available".to_string()))?;
        request
            .headers
            .insert(headers::AUTHORIZATION, format!("Bearer {}", token));
        Ok(request)
    }
}
