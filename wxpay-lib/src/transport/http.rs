//! reqwest-backed gateway transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use wxpay_lib::{GatewayConfig, HttpTransport};
//!
//! let transport = HttpTransport::new(GatewayConfig::default().with_timeout(10))?;
//! ```

use std::time::Duration;

use async_trait::async_trait;

use super::config::GatewayConfig;
use super::traits::{GatewayTransport, ResponseHeaders, TransportRequest, TransportResponse};
use crate::protocol::Method;
use crate::{Result, WxPayError};

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WxPayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create a transport for the primary domain with default settings.
    pub fn primary() -> Result<Self> {
        Self::new(GatewayConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> WxPayError {
        if e.is_timeout() {
            WxPayError::ConnectionTimeout {
                operation: "gateway request".to_string(),
                timeout_ms: self.config.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            WxPayError::ConnectionFailed {
                target: self.config.base_url.clone(),
                reason: e.to_string(),
            }
        } else {
            WxPayError::Transport(format!("gateway request failed: {e}"))
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))
    )]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = self.config.url(&request.path);

        let mut builder = self
            .client
            .request(reqwest_method(request.method), &url)
            .header("Accept", "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder
                .header("Content-Type", "application/json")
                .body(request.body);
        }

        let response = builder.send().await.map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status().as_u16();
        let headers: ResponseHeaders = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| WxPayError::Transport(format!("failed to read response body: {e}")))?
            .to_vec();

        #[cfg(feature = "tracing")]
        tracing::debug!(status, body_len = body.len(), "gateway responded");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
