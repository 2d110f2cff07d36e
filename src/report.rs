//! Human-readable rendering of diff and scan results

use crate::benchmarker::Comparison;
use crate::diff::{DiffEntry, DiffReport};
use crate::scanner::{ScanOutcome, ScanStatus};
use colored::Colorize;
use std::fmt::Write;

/// Render a diff report, one line per entry followed by a summary line.
///
/// Matching leaves are skipped unless `show_matches` is set.
pub fn render_report(report: &DiffReport, show_matches: bool) -> String {
    let mut out = String::new();
    for entry in report.entries() {
        let line = match entry {
            DiffEntry::Match { path, value } => {
                if !show_matches {
                    continue;
                }
                format!("✓ {}: {}", path, value).green().to_string()
            }
            DiffEntry::Mismatch { path, a, b } => format!(
                "{} {}: remote={} local={}",
                "✗".red().bold(),
                path.red(),
                a,
                b
            ),
            DiffEntry::MissingInA { path, b } => format!(
                "{} {} missing in remote, local={}",
                "?".yellow().bold(),
                path.yellow(),
                b
            ),
            DiffEntry::MissingInB { path, a } => format!(
                "{} {} missing in local, remote={}",
                "?".yellow().bold(),
                path.yellow(),
                a
            ),
        };
        let _ = writeln!(out, "  {}", line);
    }

    let counts = report.counts();
    let _ = writeln!(
        out,
        "  {} matched, {} mismatched, {} missing in remote, {} missing in local",
        counts.matches, counts.mismatches, counts.missing_in_a, counts.missing_in_b
    );
    out
}

/// Render one comparison with its timings
pub fn render_comparison(comparison: &Comparison, show_matches: bool) -> String {
    let params = serde_json::to_string(&comparison.params).unwrap_or_default();
    let verdict = if comparison.report.has_mismatch() {
        "❌ MISMATCH".red().bold()
    } else if comparison.report.has_missing() {
        "⚠️  PRESENCE DRIFT".yellow().bold()
    } else {
        "✅ MATCH".green().bold()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} {}({})", verdict, comparison.method, params);
    let _ = writeln!(
        out,
        "  remote {:.1}ms, local {:.1}ms",
        comparison.remote_elapsed.as_secs_f64() * 1000.0,
        comparison.local_elapsed.as_secs_f64() * 1000.0
    );
    out.push_str(&render_report(&comparison.report, show_matches));
    out
}

/// Render the buckets of a scan
pub fn render_scan(outcome: &ScanOutcome, show_reports: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "📊 Scanned {} blocks: {} clean, {} flagged, {} unresolved",
        outcome.scanned(),
        outcome.clean.len(),
        outcome.flagged.len(),
        outcome.unresolved.len()
    );

    if outcome.flagged.is_empty() {
        match outcome.status() {
            ScanStatus::Clean => {
                let _ = writeln!(out, "{}", "✅ No mismatches across the range".green());
            }
            _ => {
                let _ = writeln!(
                    out,
                    "{} {} of {} blocks could not be compared",
                    "⚠️  No mismatches among resolved blocks, but".yellow(),
                    outcome.unresolved.len(),
                    outcome.scanned()
                );
            }
        }
    } else {
        let blocks: Vec<String> = outcome.flagged.iter().map(u64::to_string).collect();
        let _ = writeln!(out, "{} {}", "❌ Flagged blocks:".red().bold(), blocks.join(", "));
        if show_reports {
            for (block, report) in &outcome.reports {
                let _ = writeln!(out, "Block {}:", block);
                out.push_str(&render_report(report, false));
            }
        }
    }

    for (block, reason) in &outcome.unresolved {
        let _ = writeln!(out, "{} block {}: {}", "⚠️  Unresolved".yellow().bold(), block, reason);
    }
    if let Some(block) = outcome.stopped_at {
        let _ = writeln!(out, "Stopped early, block {} onwards not scanned", block);
    }
    out
}
