//! JSON-RPC endpoint client
//!
//! Thin wrapper around `reqwest` that posts a request envelope and hands back
//! the raw response body. The body is not unwrapped into `result`/`error`:
//! the whole top-level object is what gets compared.

use crate::error::{BenchError, Result};
use crate::request::RpcRequest;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Endpoint configuration
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Label used in logs and errors (e.g. "remote", "local")
    pub label: String,
    /// RPC URL (e.g. "http://127.0.0.1:9944")
    pub url: String,
    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl EndpointConfig {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            timeout: Some(Duration::from_secs(30)),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// JSON-RPC client for a single endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    config: EndpointConfig,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(BenchError::Client)?;

        Ok(Self { client, config })
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Send `request` and return the raw response body.
    pub async fn call(&self, request: &RpcRequest) -> Result<Value> {
        let transport = |source: reqwest::Error| BenchError::Transport {
            endpoint: self.config.label.clone(),
            method: request.method.clone(),
            source,
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BenchError::HttpStatus {
                endpoint: self.config.label.clone(),
                method: request.method.clone(),
                status,
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!(
            endpoint = %self.config.label,
            method = %request.method,
            bytes = body.len(),
            "received response"
        );

        if body.trim().is_empty() {
            return Err(self.malformed(request, "empty body".to_string()));
        }
        serde_json::from_str(&body).map_err(|e| self.malformed(request, e.to_string()))
    }

    fn malformed(&self, request: &RpcRequest, reason: String) -> BenchError {
        BenchError::MalformedResponse {
            endpoint: self.config.label.clone(),
            method: request.method.clone(),
            reason,
        }
    }
}
