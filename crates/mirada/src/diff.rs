//! Statistical region comparison.
//!
//! A global-mean metric, not a structural or perceptual one: regions are
//! small and comparisons are few per run, so the metric trades local
//! sensitivity for runtime simplicity. The default threshold absorbs
//! anti-aliasing and font-rendering jitter between otherwise-identical
//! frames while still flagging real content changes.

use crate::capture::PixelBuffer;

/// Default dissimilarity threshold on the 0–255 per-channel scale
pub const DEFAULT_DIFF_THRESHOLD: f64 = 3.0;

/// Sentinel score for regions whose pixel dimensions differ
pub const DIMENSION_MISMATCH_SCORE: f64 = 999.0;

/// Outcome of comparing two regions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffResult {
    /// Mean absolute per-channel difference (0–255 scale); higher means more
    /// visually different
    pub score: f64,
    /// Whether the score exceeded the threshold
    pub changed: bool,
}

/// Compares same-shaped pixel regions against a tolerance threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionDiff {
    threshold: f64,
}

impl Default for RegionDiff {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DIFF_THRESHOLD,
        }
    }
}

impl RegionDiff {
    /// Create a comparator with the default threshold
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dissimilarity threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// The configured threshold
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare two regions.
    ///
    /// Differently-shaped regions are unconditionally `changed` with the
    /// [`DIMENSION_MISMATCH_SCORE`] sentinel: a resized or missing region is
    /// informative, not exceptional. Same-shaped regions get the mean
    /// absolute channel difference, classified against the threshold.
    #[must_use]
    pub fn differs(&self, a: &PixelBuffer, b: &PixelBuffer) -> DiffResult {
        if a.width() != b.width() || a.height() != b.height() {
            tracing::debug!(
                a_size = %format_args!("{}x{}", a.width(), a.height()),
                b_size = %format_args!("{}x{}", b.width(), b.height()),
                "region dimensions differ, trivially changed"
            );
            return DiffResult {
                score: DIMENSION_MISMATCH_SCORE,
                changed: true,
            };
        }

        let samples = u64::from(a.width()) * u64::from(a.height()) * 3;
        if samples == 0 {
            return DiffResult {
                score: 0.0,
                changed: false,
            };
        }

        let mut total: u64 = 0;
        for y in 0..a.height() {
            for x in 0..a.width() {
                let (ar, ag, ab) = a.pixel(x, y);
                let (br, bg, bb) = b.pixel(x, y);
                total += u64::from(ar.abs_diff(br))
                    + u64::from(ag.abs_diff(bg))
                    + u64::from(ab.abs_diff(bb));
            }
        }

        let score = total as f64 / samples as f64;
        DiffResult {
            score,
            changed: score > self.threshold,
        }
    }
}
