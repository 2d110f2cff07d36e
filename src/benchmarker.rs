//! Method benchmarker
//!
//! Sends one request to the reference (remote) and candidate (local)
//! endpoints, times both exchanges and diffs the two bodies.

use crate::diff::{diff, DiffReport};
use crate::error::Result;
use crate::request::RpcRequest;
use crate::rpc_client::{EndpointConfig, RpcClient};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of comparing one request across both endpoints
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub method: String,
    pub params: Vec<Value>,
    pub report: DiffReport,
    /// Round trip to the reference endpoint
    pub remote_elapsed: Duration,
    /// Round trip to the candidate endpoint
    pub local_elapsed: Duration,
}

/// Comparison plus both raw bodies, for callers that dump them
#[derive(Debug, Clone)]
pub struct RawComparison {
    pub comparison: Comparison,
    pub remote: Value,
    pub local: Value,
}

/// Issues the same request to two endpoints and diffs the answers
#[derive(Debug, Clone)]
pub struct Benchmarker {
    remote: RpcClient,
    local: RpcClient,
}

impl Benchmarker {
    pub fn new(remote: RpcClient, local: RpcClient) -> Self {
        Self { remote, local }
    }

    pub fn from_configs(remote: EndpointConfig, local: EndpointConfig) -> Result<Self> {
        Ok(Self::new(RpcClient::new(remote)?, RpcClient::new(local)?))
    }

    pub fn remote(&self) -> &RpcClient {
        &self.remote
    }

    pub fn local(&self) -> &RpcClient {
        &self.local
    }

    /// Compare `method(params)` across both endpoints.
    ///
    /// A failure on either side is returned as-is; there is no retry and no
    /// substitute payload.
    pub async fn run(&self, method: &str, params: Vec<Value>) -> Result<Comparison> {
        Ok(self.run_raw(method, params).await?.comparison)
    }

    pub async fn run_raw(&self, method: &str, params: Vec<Value>) -> Result<RawComparison> {
        let request = RpcRequest::build(method, params);

        // No ordering dependency between the two calls
        let (remote, local) = tokio::join!(
            timed_call(&self.remote, &request),
            timed_call(&self.local, &request)
        );
        let (remote, remote_elapsed) = remote?;
        let (local, local_elapsed) = local?;

        let report = diff(&remote, &local);
        debug!(
            method,
            entries = report.len(),
            remote_ms = remote_elapsed.as_millis() as u64,
            local_ms = local_elapsed.as_millis() as u64,
            "compared responses"
        );

        Ok(RawComparison {
            comparison: Comparison {
                method: request.method,
                params: request.params,
                report,
                remote_elapsed,
                local_elapsed,
            },
            remote,
            local,
        })
    }
}

async fn timed_call(client: &RpcClient, request: &RpcRequest) -> Result<(Value, Duration)> {
    let start = Instant::now();
    let body = client.call(request).await?;
    Ok((body, start.elapsed()))
}
