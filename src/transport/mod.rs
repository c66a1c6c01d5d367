//! HTTP transport used by strategies that exchange credentials.
//!
//! Strategies never talk to `reqwest` directly; they go through
//! [`HttpTransport`], so callers can reuse their own client (custom TLS,
//! proxies) and tests can substitute a scripted transport.

mod network;

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use network::{NetworkConfig, ProxyConfig};

/// Errors raised by a transport before an HTTP response is available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client setup failed (certificates, proxy)
    #[error("transport setup failed: {0}")]
    Setup(String),

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// Outgoing exchange request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Exchange response.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Injectable HTTP request function.
///
/// Implementations must be cancel-safe: dropping the returned future abandons
/// the request.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with default settings.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(network::DEFAULT_USER_AGENT)
            .timeout(network::DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Reuse an existing client (custom TLS, proxies, middleware).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client from network settings.
    pub async fn from_network(config: &NetworkConfig) -> Result<Self, TransportError> {
        let builder = config.apply_to_builder(reqwest::Client::builder()).await?;
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
