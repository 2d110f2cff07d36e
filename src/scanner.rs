//! Range scanner
//!
//! Repeats the benchmarker over a contiguous range of block numbers and
//! buckets every block as clean, flagged or unresolved. Blocks run on a
//! bounded worker pool; each block's two fetches and its diff form one unit.
//! With a concurrency of 1 the scan is strictly sequential: block `n + 1`
//! does not start before block `n` has been fetched and diffed.

use crate::benchmarker::Benchmarker;
use crate::config::{ClassificationPolicy, ScanConfig};
use crate::diff::DiffReport;
use crate::error::Result;
use crate::request::block_params;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

impl ClassificationPolicy {
    /// Whether `report` flags its block under this policy
    pub fn flags(&self, report: &DiffReport) -> bool {
        match self {
            ClassificationPolicy::MismatchOnly => report.has_mismatch(),
            ClassificationPolicy::MismatchOrMissing => report.has_mismatch() || report.has_missing(),
        }
    }
}

/// Overall verdict of a scan, most severe bucket first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Unresolved,
    Flagged,
    Clean,
}

/// Aggregated result of a scan.
///
/// Every scanned block lands in exactly one of `clean`, `flagged` or
/// `unresolved`. All collections are ordered by block number, whatever order
/// the workers finished in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub clean: BTreeSet<u64>,
    pub flagged: BTreeSet<u64>,
    /// Blocks whose comparison could not complete, with the error
    pub unresolved: BTreeMap<u64, String>,
    /// Diff reports of flagged blocks
    pub reports: BTreeMap<u64, DiffReport>,
    /// First block not scheduled after a fail-fast stop
    pub stopped_at: Option<u64>,
}

impl ScanOutcome {
    pub fn scanned(&self) -> usize {
        self.clean.len() + self.flagged.len() + self.unresolved.len()
    }

    pub fn status(&self) -> ScanStatus {
        if !self.unresolved.is_empty() {
            ScanStatus::Unresolved
        } else if !self.flagged.is_empty() {
            ScanStatus::Flagged
        } else {
            ScanStatus::Clean
        }
    }
}

enum BlockOutcome {
    Clean,
    Flagged(DiffReport),
    Unresolved(String),
}

/// Drives the benchmarker across a block range
pub struct RangeScanner {
    benchmarker: Arc<Benchmarker>,
    config: ScanConfig,
}

impl RangeScanner {
    pub fn new(benchmarker: Benchmarker, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            benchmarker: Arc::new(benchmarker),
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan every block of the configured range.
    ///
    /// Transport failures are recorded per block as unresolved and the scan
    /// carries on. Only non-transport failures (a panicked worker) abort it.
    pub async fn scan(&self) -> Result<ScanOutcome> {
        self.scan_with_progress(|_, _| {}).await
    }

    /// Like [`scan`](Self::scan), calling `on_block` as each block is recorded.
    ///
    /// Blocks are recorded in ascending order while later blocks are still in
    /// flight; at most `concurrency` worker handles are held at once.
    pub async fn scan_with_progress<F>(&self, mut on_block: F) -> Result<ScanOutcome>
    where
        F: FnMut(u64, ScanStatus),
    {
        let config = &self.config;
        let start = Instant::now();
        info!(
            method = %config.method,
            start = config.range.start,
            end = config.range.end,
            concurrency = config.concurrency,
            "scanning block range"
        );

        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        let stop = Arc::new(AtomicBool::new(false));
        let mut pending = VecDeque::with_capacity(config.concurrency);
        let mut outcome = ScanOutcome::default();

        for block in config.range.clone() {
            while pending.len() >= config.concurrency {
                if let Some(handle) = pending.pop_front() {
                    outcome.record(handle.await?, &mut on_block)?;
                }
            }

            let permit = semaphore.clone().acquire_owned().await?;

            if stop.load(Ordering::SeqCst) {
                outcome.stopped_at = Some(block);
                break;
            }

            let benchmarker = self.benchmarker.clone();
            let stop = stop.clone();
            let method = config.method.clone();
            let params = block_params(&config.param_template, &config.block_key, block);
            let policy = config.policy;
            let fail_fast = config.fail_fast;

            pending.push_back(tokio::spawn(async move {
                let _permit = permit;
                let outcome = match benchmarker.run(&method, params).await {
                    Ok(comparison) if policy.flags(&comparison.report) => {
                        BlockOutcome::Flagged(comparison.report)
                    }
                    Ok(_) => BlockOutcome::Clean,
                    Err(e) if e.is_transport() => BlockOutcome::Unresolved(e.to_string()),
                    Err(e) => return (block, Err(e)),
                };
                if fail_fast && !matches!(outcome, BlockOutcome::Clean) {
                    stop.store(true, Ordering::SeqCst);
                }
                (block, Ok(outcome))
            }));
        }

        while let Some(handle) = pending.pop_front() {
            outcome.record(handle.await?, &mut on_block)?;
        }

        info!(
            scanned = outcome.scanned(),
            flagged = outcome.flagged.len(),
            unresolved = outcome.unresolved.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan complete"
        );
        Ok(outcome)
    }
}

impl ScanOutcome {
    fn record<F>(
        &mut self,
        (block, result): (u64, Result<BlockOutcome>),
        on_block: &mut F,
    ) -> Result<()>
    where
        F: FnMut(u64, ScanStatus),
    {
        let status = match result? {
            BlockOutcome::Clean => {
                debug!(block, "clean");
                self.clean.insert(block);
                ScanStatus::Clean
            }
            BlockOutcome::Flagged(report) => {
                let counts = report.counts();
                info!(
                    block,
                    mismatches = counts.mismatches,
                    missing = counts.missing_in_a + counts.missing_in_b,
                    "flagged"
                );
                self.flagged.insert(block);
                self.reports.insert(block, report);
                ScanStatus::Flagged
            }
            BlockOutcome::Unresolved(reason) => {
                warn!(block, %reason, "unresolved");
                self.unresolved.insert(block, reason);
                ScanStatus::Unresolved
            }
        };
        on_block(block, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use serde_json::json;

    #[test]
    fn test_policy_ignores_missing_by_default() {
        let report = diff(&json!({"hash": "0xabc", "extra": 5}), &json!({"hash": "0xabc"}));
        assert!(!ClassificationPolicy::MismatchOnly.flags(&report));
        assert!(ClassificationPolicy::MismatchOrMissing.flags(&report));

        let report = diff(&json!({"hash": "0xabc"}), &json!({"hash": "0xdef"}));
        assert!(ClassificationPolicy::MismatchOnly.flags(&report));
        assert!(ClassificationPolicy::MismatchOrMissing.flags(&report));
    }

    #[test]
    fn test_status_precedence() {
        let mut outcome = ScanOutcome::default();
        outcome.clean.insert(1);
        assert_eq!(outcome.status(), ScanStatus::Clean);
        outcome.flagged.insert(2);
        assert_eq!(outcome.status(), ScanStatus::Flagged);
        outcome.unresolved.insert(3, "timeout".to_string());
        assert_eq!(outcome.status(), ScanStatus::Unresolved);
        assert_eq!(outcome.scanned(), 3);
    }

    #[test]
    fn test_record_reports_each_block() {
        let mut outcome = ScanOutcome::default();
        let mut seen = Vec::new();
        let mut on_block = |block: u64, status: ScanStatus| seen.push((block, status));

        outcome.record((7, Ok(BlockOutcome::Clean)), &mut on_block).unwrap();
        outcome
            .record((8, Ok(BlockOutcome::Unresolved("HTTP 500".to_string()))), &mut on_block)
            .unwrap();

        assert_eq!(seen, vec![(7, ScanStatus::Clean), (8, ScanStatus::Unresolved)]);
        assert!(outcome.clean.contains(&7));
        assert_eq!(outcome.unresolved.get(&8).map(String::as_str), Some("HTTP 500"));
    }
}
