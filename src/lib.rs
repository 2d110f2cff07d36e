//! rpc-diff-bench - Differential testing of JSON-RPC nodes
//!
//! This crate compares the responses of a locally-run node against a trusted
//! reference node for a single RPC method, either for one block or across a
//! range of blocks, and reports field-level differences.

/// JSON-RPC request envelopes and params helpers
pub mod request;

/// Structural diff of two JSON payloads
pub mod diff;

/// HTTP client for a single endpoint
pub mod rpc_client;

/// Same request against two endpoints, diffed
pub mod benchmarker;

/// Benchmarker repeated across a block range
pub mod scanner;

pub mod config;
pub mod error;
pub mod report;

pub use benchmarker::{Benchmarker, Comparison, RawComparison};
pub use config::{parse_range, ClassificationPolicy, ScanConfig};
pub use diff::{diff, diff_at, DiffCounts, DiffEntry, DiffReport};
pub use error::{BenchError, Result};
pub use request::{block_params, parse_param_template, RpcRequest};
pub use rpc_client::{EndpointConfig, RpcClient};
pub use scanner::{RangeScanner, ScanOutcome, ScanStatus};
