//! Color-signature scanning: locating UI features in raw pixels.
//!
//! A GPU-rendered UI offers no widget model to query, but an active control
//! is visually distinct (the target app highlights the active sidebar entry
//! in cyan). The scanner marks rows containing at least one pixel matching a
//! color predicate and groups vertically-contiguous marked rows into
//! candidate feature clusters.
//!
//! This is a presence scan, not an exhaustive one: the first matching column
//! per row is enough to mark row membership, and the rest of the row is
//! skipped.

use crate::capture::PixelBuffer;

/// Horizontal compensation added to a cluster's derived center.
///
/// Only the leftmost matching column per row is recorded, so the true visual
/// center lies further right. Calibrated against the reference layout.
const CENTER_X_OFFSET: u32 = 10;

/// Per-pixel classification rule marking pixels that belong to a feature of
/// interest.
pub trait ColorPredicate {
    /// Whether an RGB sample belongs to the feature
    fn matches(&self, r: u8, g: u8, b: u8) -> bool;
}

impl<F> ColorPredicate for F
where
    F: Fn(u8, u8, u8) -> bool,
{
    fn matches(&self, r: u8, g: u8, b: u8) -> bool {
        self(r, g, b)
    }
}

/// Threshold rule over the three channels: red suppressed, green and blue
/// dominant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRule {
    /// Red channel must be strictly below this
    pub max_red: u8,
    /// Green channel must be strictly above this
    pub min_green: u8,
    /// Blue channel must be strictly above this
    pub min_blue: u8,
}

impl ChannelRule {
    /// The cyan highlight the target app paints on the active sidebar entry
    #[must_use]
    pub const fn cyan_highlight() -> Self {
        Self {
            max_red: 100,
            min_green: 150,
            min_blue: 200,
        }
    }
}

impl ColorPredicate for ChannelRule {
    fn matches(&self, r: u8, g: u8, b: u8) -> bool {
        r < self.max_red && g > self.min_green && b > self.min_blue
    }
}

/// A group of vertically-contiguous row matches presumed to correspond to
/// one rendered UI element. Transient per scan; ordered top-to-bottom in the
/// scanner's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureCluster {
    /// First matching row (buffer-local)
    pub first_row: u32,
    /// Last matching row (buffer-local)
    pub last_row: u32,
    /// Maximum first-matching column seen across the cluster's rows
    pub max_col: u32,
    /// Number of matching rows in the cluster
    pub rows: usize,
}

impl FeatureCluster {
    /// Vertical center: midpoint of the first and last matching row
    #[must_use]
    pub const fn center_y(&self) -> u32 {
        (self.first_row + self.last_row) / 2
    }

    /// Horizontal center, compensated for the leftmost-column-only scan
    #[must_use]
    pub const fn center_x(&self) -> u32 {
        self.max_col / 2 + CENTER_X_OFFSET
    }
}

/// Scans pixel buffers for color-signature features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureScanner {
    /// Maximum row gap between entries of the same cluster
    row_gap: u32,
    /// Minimum matching rows for a cluster to survive noise rejection
    min_rows: usize,
}

impl Default for SignatureScanner {
    fn default() -> Self {
        Self {
            row_gap: 2,
            min_rows: 3,
        }
    }
}

impl SignatureScanner {
    /// Create a scanner with the default gap tolerance and noise threshold
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum row gap inside one cluster
    #[must_use]
    pub const fn with_row_gap(mut self, gap: u32) -> Self {
        self.row_gap = gap;
        self
    }

    /// Set the minimum row count for a cluster to survive
    #[must_use]
    pub const fn with_min_rows(mut self, rows: usize) -> Self {
        self.min_rows = rows;
        self
    }

    /// Scan a buffer for feature clusters, top to bottom.
    ///
    /// Callers scan a cropped region of interest (see
    /// [`PixelBuffer::crop`]), not the whole frame. An empty result is a
    /// valid, non-error outcome: no highlighted feature is visible, and the
    /// caller falls back to computed layout.
    #[must_use]
    pub fn scan<P: ColorPredicate>(&self, buffer: &PixelBuffer, predicate: &P) -> Vec<FeatureCluster> {
        let mut hits: Vec<(u32, u32)> = Vec::new();
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let (r, g, b) = buffer.pixel(x, y);
                if predicate.matches(r, g, b) {
                    hits.push((y, x));
                    break;
                }
            }
        }

        let clusters = self.group(&hits);
        tracing::debug!(
            hit_rows = hits.len(),
            clusters = clusters.len(),
            "signature scan complete"
        );
        clusters
    }

    /// Group (row, first-column) hits into clusters by row adjacency
    fn group(&self, hits: &[(u32, u32)]) -> Vec<FeatureCluster> {
        let mut clusters = Vec::new();
        let mut current: Vec<(u32, u32)> = Vec::new();

        for &hit in hits {
            match current.last() {
                Some(&(prev_row, _)) if hit.0 - prev_row > self.row_gap => {
                    self.flush(&mut clusters, &current);
                    current.clear();
                    current.push(hit);
                }
                _ => current.push(hit),
            }
        }
        self.flush(&mut clusters, &current);
        clusters
    }

    fn flush(&self, clusters: &mut Vec<FeatureCluster>, group: &[(u32, u32)]) {
        if group.len() < self.min_rows {
            return;
        }
        let first_row = group[0].0;
        let last_row = group[group.len() - 1].0;
        let max_col = group.iter().map(|&(_, col)| col).max().unwrap_or(0);
        clusters.push(FeatureCluster {
            first_row,
            last_row,
            max_col,
            rows: group.len(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use proptest::prelude::*;

    const CYAN: (u8, u8, u8) = (40, 200, 230);
    const DARK: (u8, u8, u8) = (20, 22, 25);

    /// Buffer with cyan pixels at the given (row, col) positions
    fn buffer_with(width: u32, height: u32, marks: &[(u32, u32)]) -> PixelBuffer {
        let mut rgb = Vec::new();
        for _ in 0..(width * height) {
            rgb.extend_from_slice(&[DARK.0, DARK.1, DARK.2]);
        }
        for &(row, col) in marks {
            let idx = ((row * width + col) * 3) as usize;
            rgb[idx] = CYAN.0;
            rgb[idx + 1] = CYAN.1;
            rgb[idx + 2] = CYAN.2;
        }
        PixelBuffer::from_rgb(Rect::from_origin_size(0, 0, width, height), width, height, rgb)
            .unwrap()
    }

    #[test]
    fn test_cyan_highlight_rule() {
        let rule = ChannelRule::cyan_highlight();
        assert!(rule.matches(40, 200, 230));
        assert!(!rule.matches(150, 200, 230)); // red too strong
        assert!(!rule.matches(40, 100, 230)); // green too weak
        assert!(!rule.matches(40, 200, 150)); // blue too weak
    }

    #[test]
    fn test_closure_predicate() {
        let buf = buffer_with(10, 10, &[(1, 1), (2, 1), (3, 1)]);
        let clusters = SignatureScanner::new().scan(&buf, &|r: u8, _g: u8, _b: u8| r == 40);
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn test_scan_empty_buffer_yields_no_clusters() {
        let buf = buffer_with(20, 20, &[]);
        let clusters = SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_single_contiguous_block_is_one_cluster() {
        let buf = buffer_with(20, 20, &[(5, 3), (6, 4), (7, 2), (8, 3)]);
        let clusters = SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].first_row, 5);
        assert_eq!(clusters[0].last_row, 8);
        assert_eq!(clusters[0].rows, 4);
        assert_eq!(clusters[0].max_col, 4);
    }

    #[test]
    fn test_small_groups_rejected_as_noise() {
        // Two rows only: below the three-row minimum.
        let buf = buffer_with(20, 20, &[(5, 3), (6, 3)]);
        let clusters = SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_gap_within_tolerance_stays_one_cluster() {
        // Rows 5,7,9: gaps of 2, within tolerance.
        let buf = buffer_with(20, 20, &[(5, 1), (7, 1), (9, 1)]);
        let clusters = SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].first_row, 5);
        assert_eq!(clusters[0].last_row, 9);
    }

    #[test]
    fn test_gap_beyond_tolerance_splits_clusters() {
        let buf = buffer_with(
            30,
            30,
            &[(2, 1), (3, 1), (4, 1), (10, 2), (11, 2), (12, 2)],
        );
        let clusters = SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].first_row, 2);
        assert_eq!(clusters[1].first_row, 10);
    }

    #[test]
    fn test_output_ordered_top_to_bottom() {
        let buf = buffer_with(
            40,
            40,
            &[(20, 1), (21, 1), (22, 1), (5, 1), (6, 1), (7, 1)],
        );
        let clusters = SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
        assert_eq!(clusters.len(), 2);
        assert!(clusters[0].first_row < clusters[1].first_row);
    }

    #[test]
    fn test_only_first_column_per_row_recorded() {
        // Row 5 has matches at columns 2 and 8; only column 2 counts.
        let buf = buffer_with(20, 20, &[(5, 2), (5, 8), (6, 2), (7, 2)]);
        let clusters = SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
        assert_eq!(clusters[0].max_col, 2);
    }

    #[test]
    fn test_cluster_center() {
        let cluster = FeatureCluster {
            first_row: 10,
            last_row: 20,
            max_col: 40,
            rows: 11,
        };
        assert_eq!(cluster.center_y(), 15);
        assert_eq!(cluster.center_x(), 30); // 40 / 2 + 10
    }

    proptest! {
        /// One contiguous block of >= 3 rows always yields exactly one
        /// cluster spanning those rows.
        #[test]
        fn prop_contiguous_block_yields_one_cluster(
            start in 0u32..40,
            len in 3u32..15,
            col in 0u32..19,
        ) {
            let marks: Vec<(u32, u32)> =
                (start..start + len).map(|row| (row, col)).collect();
            let buf = buffer_with(20, 60, &marks);
            let clusters =
                SignatureScanner::new().scan(&buf, &ChannelRule::cyan_highlight());
            prop_assert_eq!(clusters.len(), 1);
            prop_assert_eq!(clusters[0].first_row, start);
            prop_assert_eq!(clusters[0].last_row, start + len - 1);
        }
    }
}
