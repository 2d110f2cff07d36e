//! Error taxonomy for the harness.
//!
//! The differ itself never fails; everything here comes from reaching an
//! endpoint, decoding what it sent back, or rejecting bad configuration.

use thiserror::Error;

/// Result alias used across the library
pub type Result<T, E = BenchError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Network failure or timeout reaching an endpoint
    #[error("{endpoint}: {method} request failed: {source}")]
    Transport {
        endpoint: String,
        method: String,
        #[source]
        source: reqwest::Error,
    },

    /// Endpoint answered with a non-success HTTP status
    #[error("{endpoint}: {method} returned HTTP {status}")]
    HttpStatus {
        endpoint: String,
        method: String,
        status: reqwest::StatusCode,
    },

    /// Empty or non-JSON body
    #[error("{endpoint}: {method} returned a malformed response: {reason}")]
    MalformedResponse {
        endpoint: String,
        method: String,
        reason: String,
    },

    #[error("invalid block range: {0}")]
    InvalidRange(String),

    #[error("invalid params template: {0}")]
    InvalidParams(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("scan worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("scan worker pool closed")]
    PoolClosed(#[from] tokio::sync::AcquireError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl BenchError {
    /// Whether the failure came from reaching or decoding an endpoint.
    ///
    /// Transport-class failures are recorded as unresolved blocks by the
    /// scanner instead of aborting the run.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BenchError::Transport { .. }
                | BenchError::HttpStatus { .. }
                | BenchError::MalformedResponse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_transport_class() {
        let err = BenchError::MalformedResponse {
            endpoint: "local".to_string(),
            method: "getBlock".to_string(),
            reason: "empty body".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "local: getBlock returned a malformed response: empty body"
        );
    }

    #[test]
    fn test_config_errors_are_not_transport() {
        assert!(!BenchError::InvalidRange("5:5".to_string()).is_transport());
        assert!(!BenchError::InvalidParams("[]".to_string()).is_transport());
    }
}
