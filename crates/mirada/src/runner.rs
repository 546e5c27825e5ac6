//! Run sequencing primitives: the append-only check log and settle waits.
//!
//! A run is strictly linear: every assertion appends exactly one result and
//! the sequence always runs to completion, so a single failing check never
//! hides the report of subsequent checks. There are no retries and no
//! early exits; the only fatal condition is failing to find the window at
//! all, which happens before the log sees its first check.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One recorded assertion outcome. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Free-text detail (scores, sizes, coordinates)
    pub detail: String,
}

/// Append-only result log for one run
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    results: Vec<CheckResult>,
}

impl RunLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one check outcome, returning the condition so callers can
    /// chain on it without halting the sequence.
    pub fn check(&mut self, name: impl Into<String>, passed: bool, detail: impl Into<String>) -> bool {
        let result = CheckResult {
            name: name.into(),
            passed,
            detail: detail.into(),
        };
        if passed {
            tracing::info!(check = %result.name, detail = %result.detail, "check passed");
        } else {
            tracing::warn!(check = %result.name, detail = %result.detail, "check FAILED");
        }
        self.results.push(result);
        passed
    }

    /// All recorded results, in order
    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Produce the aggregate summary
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            passed: self.results.iter().filter(|r| r.passed).count(),
            total: self.results.len(),
            results: self.results.clone(),
        }
    }
}

/// Aggregate pass/fail counts plus the full result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of passing checks
    pub passed: usize,
    /// Total number of checks
    pub total: usize,
    /// Every result, in recorded order
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    /// Whether every check passed (the process exit criterion)
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// The failing results, in recorded order
    #[must_use]
    pub fn failures(&self) -> Vec<&CheckResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Results: {}/{} passed", self.passed, self.total)?;
        if !self.all_passed() {
            writeln!(f, "FAILURES:")?;
            for failure in self.failures() {
                writeln!(f, "  - {}: {}", failure.name, failure.detail)?;
            }
        }
        Ok(())
    }
}

/// Fixed-duration settle waits.
///
/// The target application exposes no render-complete signal, so the harness
/// pauses a fixed duration after each action to let render/debounce logic
/// settle before the next capture. Durations are empirically tuned; one
/// multiplier scales all of them for slower machines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settle {
    multiplier: f64,
}

impl Default for Settle {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl Settle {
    /// Create with a duration multiplier (1.0 = tuned defaults)
    #[must_use]
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier: if multiplier.is_finite() && multiplier > 0.0 {
                multiplier
            } else {
                1.0
            },
        }
    }

    /// The scaled duration for a base wait
    #[must_use]
    pub fn scaled(&self, base_ms: u64) -> Duration {
        Duration::from_millis((base_ms as f64 * self.multiplier).round() as u64)
    }

    /// Block for the scaled duration
    pub fn pause(&self, base_ms: u64) {
        std::thread::sleep(self.scaled(base_ms));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_returns_condition() {
        let mut log = RunLog::new();
        assert!(log.check("window found", true, "1200x800"));
        assert!(!log.check("panel differs", false, "mean_diff=0.40"));
        assert_eq!(log.results().len(), 2);
    }

    #[test]
    fn test_results_preserve_order() {
        let mut log = RunLog::new();
        log.check("first", true, "");
        log.check("second", false, "detail");
        log.check("third", true, "");
        let names: Vec<&str> = log.results().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_summary_counts() {
        let mut log = RunLog::new();
        log.check("a", true, "");
        log.check("b", false, "x");
        log.check("c", true, "");
        let summary = log.summary();
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.total, 3);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures().len(), 1);
        assert_eq!(summary.failures()[0].name, "b");
    }

    #[test]
    fn test_empty_run_passes() {
        let summary = RunLog::new().summary();
        assert!(summary.all_passed());
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn test_summary_display_lists_failures() {
        let mut log = RunLog::new();
        log.check("badge updated", false, "mean_diff=0.12");
        let text = log.summary().to_string();
        assert!(text.contains("Results: 0/1 passed"));
        assert!(text.contains("badge updated: mean_diff=0.12"));
    }

    #[test]
    fn test_summary_serializes() {
        let mut log = RunLog::new();
        log.check("a", true, "ok");
        let json = serde_json::to_string(&log.summary()).unwrap();
        assert!(json.contains("\"passed\":1"));
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log.summary());
    }

    #[test]
    fn test_settle_scaling() {
        let settle = Settle::new(2.0);
        assert_eq!(settle.scaled(800), Duration::from_millis(1600));
        assert_eq!(Settle::default().scaled(500), Duration::from_millis(500));
    }

    #[test]
    fn test_settle_rejects_degenerate_multiplier() {
        assert_eq!(Settle::new(0.0).scaled(100), Duration::from_millis(100));
        assert_eq!(Settle::new(-1.0).scaled(100), Duration::from_millis(100));
    }
}
