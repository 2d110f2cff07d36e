//! Scan configuration

use crate::error::{BenchError, Result};
use crate::request::DEFAULT_BLOCK_KEY;
use serde::Serialize;
use serde_json::{Map, Value};
use std::ops::Range;

/// Which report entries flag a block during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationPolicy {
    /// Only value mismatches flag a block; presence drift is tolerated
    #[default]
    MismatchOnly,
    /// Mismatches and fields missing on either side both flag a block
    MismatchOrMissing,
}

/// Configuration for a range scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub method: String,
    /// Params object the block number is injected into
    pub param_template: Map<String, Value>,
    /// Half-open block range
    pub range: Range<u64>,
    /// Blocks compared at once; 1 keeps the scan strictly sequential
    pub concurrency: usize,
    pub policy: ClassificationPolicy,
    /// Stop scheduling blocks after the first flagged or unresolved one
    pub fail_fast: bool,
    /// Param field holding the block number
    pub block_key: String,
}

impl ScanConfig {
    pub fn new(method: impl Into<String>, range: Range<u64>) -> Self {
        Self {
            method: method.into(),
            param_template: Map::new(),
            range,
            concurrency: 1,
            policy: ClassificationPolicy::default(),
            fail_fast: false,
            block_key: DEFAULT_BLOCK_KEY.to_string(),
        }
    }

    pub fn with_template(mut self, template: Map<String, Value>) -> Self {
        self.param_template = template;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_block_key(mut self, key: impl Into<String>) -> Self {
        self.block_key = key.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.range.start >= self.range.end {
            return Err(BenchError::InvalidRange(format!(
                "{}:{} is empty",
                self.range.start, self.range.end
            )));
        }
        if self.concurrency == 0 {
            return Err(BenchError::ZeroConcurrency);
        }
        Ok(())
    }
}

/// Parse `start:end` into a half-open range.
pub fn parse_range(raw: &str) -> Result<Range<u64>> {
    let (start, end) = raw
        .split_once(':')
        .ok_or_else(|| BenchError::InvalidRange(format!("expected start:end, got {:?}", raw)))?;

    let parse = |s: &str| {
        s.trim()
            .parse::<u64>()
            .map_err(|e| BenchError::InvalidRange(format!("{:?}: {}", s, e)))
    };
    let range = parse(start)?..parse(end)?;

    if range.start >= range.end {
        return Err(BenchError::InvalidRange(format!("{} is empty", raw)));
    }
    Ok(range)
}
