//! The dispatch engine.
//!
//! [`Provider`] turns a [`TargetType`] into a [`BaseResponse`], either over
//! the network or from the target's canned [`StubResponse`].
//!
//! # Dispatch
//!
//! ```text
//!                 ┌──────────────── StubBehavior ───────────────┐
//!                 │ Never          Immediate        Delayed(d)  │
//! target ─► EndPoint ─► WireRequest                             │
//!                 │         │          │                 │      │
//!                 │   interceptors     │              sleep(d)  │
//!                 │     reqwest        │                 │      │
//!                 │         └──────────┴── stub_response ┘      │
//!                 └──────────────► decode_body::<D> ─► BaseResponse<D>
//! ```
//!
//! Both branches materialize the wire request first, so encoding errors
//! surface the same way whether or not the provider is stubbed, and both
//! decode through [`decode_body`]. A stub payload that does not match the
//! decode type fails with [`NetworkError::Decoding`] exactly like a live one.
//!
//! # Examples
//!
//! ```ignore
//! use endpoint_http::{Provider, StubBehavior};
//!
//! let provider = Provider::new();
//! let response = provider.request::<_, Challenge>(&ChallengeApi::Detail { id: 1 }).await?;
//! println!("{} {:?}", response.status_code, response.data);
//!
//! // Same call, canned data after 300ms
//! let stubbed = Provider::stubbed(StubBehavior::Delayed(Duration::from_millis(300)));
//! let response = stubbed.request::<_, Challenge>(&ChallengeApi::Detail { id: 1 }).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::classify::{ClassifiedError, ErrorClassifier};
use crate::client::config::ProviderConfig;
use crate::client::interceptor::RequestInterceptor;
use crate::client::utils::{decode_body, read_response, reason_phrase};
use crate::error::{NetworkError, Result};
use crate::request::{EndPoint, StubResponse, TargetType, WireRequest};
use crate::types::{BaseResponse, RawResponse};

/// Whether a provider goes to the network or answers from stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StubBehavior {
    /// Always perform the live request.
    #[default]
    Never,
    /// Answer from the stub at once.
    Immediate,
    /// Answer from the stub after the delay, without blocking other work.
    Delayed(Duration),
}

impl StubBehavior {
    /// [`StubBehavior::Delayed`] from fractional seconds. Negative or
    /// non-finite values are treated as zero; values too large for a
    /// `Duration` saturate at `Duration::MAX`.
    pub fn delayed_secs(seconds: f64) -> Self {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        StubBehavior::Delayed(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX))
    }

    /// True unless `Never`.
    pub fn is_stubbed(&self) -> bool {
        !matches!(self, StubBehavior::Never)
    }
}

/// A completed exchange before decoding.
struct Dispatched {
    status_code: u16,
    body: Bytes,
    status_text: Option<String>,
    message: Option<String>,
    response: Option<RawResponse>,
}

impl Dispatched {
    fn into_response<D>(self, data: D) -> BaseResponse<D> {
        BaseResponse {
            data,
            status_code: self.status_code,
            response: self.response,
            status_text: self.status_text,
            message: self.message,
        }
    }
}

/// Dispatches targets live or from stubs and decodes the result.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct Provider {
    client: reqwest::Client,
    config: Arc<ProviderConfig>,
    stub_behavior: StubBehavior,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl Provider {
    /// Live provider with default configuration.
    pub fn new() -> Self {
        Self::with_config(ProviderConfig::default())
    }

    /// Live provider with custom configuration.
    pub fn with_config(config: ProviderConfig) -> Self {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent.clone());

        if config.proxy_url.is_empty() {
            builder = builder.no_proxy();
        } else {
            match reqwest::Proxy::all(&config.proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!("Ignoring invalid proxy url {}: {}", config.proxy_url, e),
            }
        }

        let client = builder.build().unwrap_or_default();

        Provider {
            client,
            config: Arc::new(config),
            stub_behavior: StubBehavior::Never,
            interceptors: Vec::new(),
        }
    }

    /// Provider answering from stubs with the given behavior.
    pub fn stubbed(behavior: StubBehavior) -> Self {
        Self::new().with_stub_behavior(behavior)
    }

    /// Replace the stub behavior.
    pub fn with_stub_behavior(mut self, behavior: StubBehavior) -> Self {
        self.stub_behavior = behavior;
        self
    }

    /// Append an interceptor. Interceptors run in registration order.
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Current stub behavior.
    pub fn stub_behavior(&self) -> StubBehavior {
        self.stub_behavior
    }

    /// Get the provider configuration
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve `target` to an endpoint with the configured default headers
    /// underneath the target's own.
    pub fn endpoint<T: TargetType + ?Sized>(&self, target: &T) -> EndPoint {
        let mut endpoint = EndPoint::from_target(target);
        let mut headers = self.config.default_headers.clone();
        headers.merge(&endpoint.headers);
        endpoint.headers = headers;
        endpoint
    }

    /// Dispatch `target` and decode the body as `D`.
    ///
    /// The status code is not inspected; use
    /// [`request_classified`](Self::request_classified) to turn non-2xx
    /// responses into [`ApiError`](crate::ApiError)s.
    ///
    /// # Errors
    ///
    /// Any [`NetworkError`]: encoding, interceptor, transport, a designated
    /// stub failure, or decoding.
    pub async fn request<T, D>(&self, target: &T) -> Result<BaseResponse<D>>
    where
        T: TargetType + ?Sized,
        D: DeserializeOwned,
    {
        let dispatched = self.dispatch(target).await?;
        let data = self.decode(&dispatched.body)?;
        Ok(dispatched.into_response(data))
    }

    /// Dispatch `target`, classify the status with `classifier`, and decode
    /// successful bodies as `D`.
    ///
    /// Error bodies are never decoded as `D`; they are read as
    /// [`ErrorBody`](crate::ErrorBody) for the classifier.
    pub async fn request_classified<T, D>(
        &self,
        target: &T,
        classifier: &ErrorClassifier,
    ) -> std::result::Result<BaseResponse<D>, ClassifiedError>
    where
        T: TargetType + ?Sized,
        D: DeserializeOwned,
    {
        let dispatched = self
            .dispatch(target)
            .await
            .map_err(|e| classifier.classify_network(e))?;

        if let Some(error) = classifier.classify_response(dispatched.status_code, &dispatched.body) {
            if self.config.enable_logging {
                tracing::warn!("Request returned status {}: {}", dispatched.status_code, error);
            }
            return Err(error.into());
        }

        let data = self
            .decode(&dispatched.body)
            .map_err(|e| classifier.classify_network(e))?;
        Ok(dispatched.into_response(data))
    }

    async fn dispatch<T: TargetType + ?Sized>(&self, target: &T) -> Result<Dispatched> {
        let endpoint = self.endpoint(target);
        let request = endpoint.url_request().inspect_err(|e| {
            if self.config.enable_logging {
                tracing::warn!("Failed to build {} {}: {}", endpoint.method, endpoint.url, e);
            }
        })?;

        match self.stub_behavior {
            StubBehavior::Never => self.dispatch_live(request).await,
            StubBehavior::Immediate => self.dispatch_stub(&request, target.stub_response()),
            StubBehavior::Delayed(delay) => {
                let stub = target.stub_response();
                sleep(delay).await;
                self.dispatch_stub(&request, stub)
            }
        }
    }

    async fn dispatch_live(&self, mut request: WireRequest) -> Result<Dispatched> {
        for interceptor in &self.interceptors {
            request = interceptor.adapt(request).await.map_err(|e| {
                if self.config.enable_logging {
                    tracing::warn!("Interceptor rejected request: {}", e);
                }
                match e {
                    NetworkError::Interceptor(msg) => NetworkError::Interceptor(msg),
                    other => NetworkError::Interceptor(other.to_string()),
                }
            })?;
        }

        if self.config.enable_logging {
            tracing::debug!(method = %request.method, url = %request.url, "Sending request");
        }

        let response = request
            .into_reqwest(&self.client)
            .send()
            .await
            .map_err(NetworkError::from)
            .inspect_err(|e| {
                if self.config.enable_logging {
                    tracing::warn!("Request failed: {}", e);
                }
            })?;

        let raw = read_response(response).await?;

        if self.config.enable_logging {
            tracing::debug!(status = raw.status, bytes = raw.body.len(), "Received response");
        }

        Ok(Dispatched {
            status_code: raw.status,
            body: raw.body.clone(),
            status_text: reason_phrase(raw.status),
            message: None,
            response: Some(raw),
        })
    }

    fn dispatch_stub(&self, request: &WireRequest, stub: StubResponse) -> Result<Dispatched> {
        if self.config.enable_logging {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                behavior = ?self.stub_behavior,
                "Answering from stub"
            );
        }

        match stub {
            StubResponse::Response {
                status_code,
                payload,
                status_text,
                message,
            } => Ok(Dispatched {
                status_code,
                body: payload,
                status_text: non_empty(status_text),
                message: non_empty(message),
                response: None,
            }),
            StubResponse::Failure(error) => Err(error),
        }
    }

    fn decode<D: DeserializeOwned>(&self, body: &[u8]) -> Result<D> {
        decode_body(body).inspect_err(|e| {
            if self.config.enable_logging {
                tracing::warn!("Failed to decode response body: {}", e);
            }
        })
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
