//! Logical-target to absolute-coordinate resolution.
//!
//! The mapper owns the layout constants of the target UI, calibrated against
//! the reference 100%-scale layout, and combines them with the per-run
//! [`Calibration`] to produce exact physical-pixel click targets.
//!
//! Two resolution strategies for sidebar targets, tried in order:
//!
//! 1. **Detected**: anchor from a scanned [`FeatureCluster`] when one is
//!    available and plausibly the active control.
//! 2. **Computed**: pure arithmetic over the layout constants. Always
//!    available, never fails; this is the production path, detection is
//!    advisory.

use crate::calibration::Calibration;
use crate::geometry::{Point, Rect};
use crate::scanner::FeatureCluster;
use serde::{Deserialize, Serialize};

/// An abstract UI location: an index into the ordered sidebar control list
/// plus a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalTarget {
    /// Position in the ordered control list, top to bottom
    pub index: usize,
    /// Label for logs and check names
    pub label: &'static str,
}

impl LogicalTarget {
    /// Chat panel (the panel shown on a fresh start)
    pub const CHAT: Self = Self::new(0, "Chat");
    /// History panel
    pub const HISTORY: Self = Self::new(1, "History");
    /// Files panel
    pub const FILES: Self = Self::new(2, "Files");
    /// Settings panel
    pub const SETTINGS: Self = Self::new(11, "Settings");
    /// Help panel
    pub const HELP: Self = Self::new(12, "Help");

    /// Create a target
    #[must_use]
    pub const fn new(index: usize, label: &'static str) -> Self {
        Self { index, label }
    }
}

/// Sidebar button layout at the reference 100% scale, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarLayout {
    /// Button center distance from the window's left edge
    pub base_x: i32,
    /// First button center distance from the window's top edge
    pub base_y: i32,
    /// Vertical distance between consecutive button centers
    pub spacing: i32,
    /// Number of controls in the sidebar; valid indices are `0..control_count`
    pub control_count: usize,
    /// Width of the strip scanned for highlight signatures, physical pixels
    pub scan_strip_px: u32,
}

impl Default for SidebarLayout {
    fn default() -> Self {
        Self {
            base_x: 35,
            base_y: 65,
            spacing: 51,
            control_count: 13,
            scan_strip_px: 120,
        }
    }
}

/// Content-area layout at the reference 100% scale, in logical pixels.
///
/// The API-key inputs are right-aligned, so their horizontal constants are
/// offsets from the window's *right* edge; vertical constants are offsets
/// from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLayout {
    /// API-key input center, offset from the right edge
    pub input_x_from_right: i32,
    /// API-key input row center, offset from the top
    pub input_row_y: i32,
    /// Input capture region: left offset from the right edge
    pub input_region_left: i32,
    /// Input capture region: right offset from the right edge
    pub input_region_right: i32,
    /// Input capture region: top offset from the top
    pub input_region_top: i32,
    /// Input capture region: bottom offset from the top
    pub input_region_bottom: i32,
    /// Save badge region: left offset from the right edge
    pub badge_region_left: i32,
    /// Save badge region: right offset from the right edge
    pub badge_region_right: i32,
    /// Save badge region: top offset from the top
    pub badge_region_top: i32,
    /// Save badge region: bottom offset from the top
    pub badge_region_bottom: i32,
    /// Header check region, window-relative, left/top/right/bottom
    pub header: (i32, i32, i32, i32),
}

impl Default for ContentLayout {
    fn default() -> Self {
        Self {
            input_x_from_right: 260,
            input_row_y: 273,
            input_region_left: 400,
            input_region_right: 130,
            input_region_top: 255,
            input_region_bottom: 295,
            badge_region_left: 160,
            badge_region_right: 20,
            badge_region_top: 260,
            badge_region_bottom: 290,
            header: (100, 40, 600, 150),
        }
    }
}

/// Resolves logical UI targets to absolute physical-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    calibration: Calibration,
    sidebar: SidebarLayout,
    content: ContentLayout,
}

impl CoordinateMapper {
    /// Create a mapper over a run's calibration with the default layouts
    #[must_use]
    pub fn new(calibration: Calibration) -> Self {
        Self {
            calibration,
            sidebar: SidebarLayout::default(),
            content: ContentLayout::default(),
        }
    }

    /// Override the sidebar layout
    #[must_use]
    pub const fn with_sidebar(mut self, sidebar: SidebarLayout) -> Self {
        self.sidebar = sidebar;
        self
    }

    /// Override the content layout
    #[must_use]
    pub const fn with_content(mut self, content: ContentLayout) -> Self {
        self.content = content;
        self
    }

    /// The sidebar layout in use
    #[must_use]
    pub const fn sidebar(&self) -> &SidebarLayout {
        &self.sidebar
    }

    /// Resolve a sidebar target to an absolute coordinate.
    ///
    /// `detected` is the cluster list from scanning the sidebar strip of a
    /// calibration capture taken while the first control was active; its
    /// first entry, when plausible, anchors the whole column. Otherwise the
    /// computed strategy applies.
    ///
    /// Out-of-range indices are a caller contract violation, checked by
    /// debug assertion; coordinates for valid indices always fall within the
    /// window rectangle.
    #[must_use]
    pub fn resolve(&self, target: LogicalTarget, detected: &[FeatureCluster]) -> Point {
        debug_assert!(
            target.index < self.sidebar.control_count,
            "target index {} out of range 0..{}",
            target.index,
            self.sidebar.control_count
        );

        if let Some(anchor) = detected.first() {
            if self.plausible_anchor(anchor) {
                let point = self.from_anchor(target, anchor);
                tracing::debug!(label = target.label, x = point.x, y = point.y, "detected-strategy target");
                return point;
            }
            tracing::debug!(
                center_x = anchor.center_x(),
                center_y = anchor.center_y(),
                "detected cluster implausible as active control, using computed layout"
            );
        }

        self.computed(target)
    }

    /// Computed strategy: pure arithmetic over the layout constants
    #[must_use]
    pub fn computed(&self, target: LogicalTarget) -> Point {
        debug_assert!(
            target.index < self.sidebar.control_count,
            "target index {} out of range 0..{}",
            target.index,
            self.sidebar.control_count
        );
        let scale = self.calibration.scale;
        let window = self.calibration.window;
        Point::new(
            window.left + scale.to_physical(self.sidebar.base_x),
            window.top
                + scale.to_physical(self.sidebar.base_y)
                + target.index as i32 * scale.to_physical(self.sidebar.spacing),
        )
    }

    fn from_anchor(&self, target: LogicalTarget, anchor: &FeatureCluster) -> Point {
        let window = self.calibration.window;
        let spacing = self.calibration.scale.to_physical(self.sidebar.spacing);
        Point::new(
            window.left + anchor.center_x() as i32,
            window.top + anchor.center_y() as i32 + target.index as i32 * spacing,
        )
    }

    /// A cluster anchors the column only if it sits inside the scan strip
    /// and within one button spacing of the computed first-button center.
    fn plausible_anchor(&self, anchor: &FeatureCluster) -> bool {
        let scale = self.calibration.scale;
        let expected_y = scale.to_physical(self.sidebar.base_y);
        let spacing = scale.to_physical(self.sidebar.spacing);
        let dy = (anchor.center_y() as i32 - expected_y).abs();
        anchor.center_x() < self.sidebar.scan_strip_px && dy <= spacing
    }

    /// Center of the API-key input field (right-aligned in the content area)
    #[must_use]
    pub fn api_key_input(&self) -> Point {
        let scale = self.calibration.scale;
        let window = self.calibration.window;
        Point::new(
            window.right - scale.to_physical(self.content.input_x_from_right),
            window.top + scale.to_physical(self.content.input_row_y),
        )
    }

    /// Capture region around the API-key input field
    #[must_use]
    pub fn input_region(&self) -> Rect {
        let scale = self.calibration.scale;
        let window = self.calibration.window;
        Rect::new(
            window.right - scale.to_physical(self.content.input_region_left),
            window.top + scale.to_physical(self.content.input_region_top),
            window.right - scale.to_physical(self.content.input_region_right),
            window.top + scale.to_physical(self.content.input_region_bottom),
        )
    }

    /// Capture region around the auto-save badge
    #[must_use]
    pub fn badge_region(&self) -> Rect {
        let scale = self.calibration.scale;
        let window = self.calibration.window;
        Rect::new(
            window.right - scale.to_physical(self.content.badge_region_left),
            window.top + scale.to_physical(self.content.badge_region_top),
            window.right - scale.to_physical(self.content.badge_region_right),
            window.top + scale.to_physical(self.content.badge_region_bottom),
        )
    }

    /// Header check region in window-relative (buffer-local) pixels,
    /// suitable for [`crate::PixelBuffer::crop`] of a full-window capture
    #[must_use]
    pub fn header_region_local(&self) -> (u32, u32, u32, u32) {
        let scale = self.calibration.scale;
        let (l, t, r, b) = self.content.header;
        (
            scale.to_physical(l).max(0) as u32,
            scale.to_physical(t).max(0) as u32,
            scale.to_physical(r).max(0) as u32,
            scale.to_physical(b).max(0) as u32,
        )
    }

    /// Window center, the scroll focus point
    #[must_use]
    pub fn window_center(&self) -> Point {
        self.calibration.window.center()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::calibration::DisplayScale;
    use proptest::prelude::*;

    fn mapper(window: Rect, scale: f64) -> CoordinateMapper {
        CoordinateMapper::new(Calibration::new(window, DisplayScale::new(scale)))
    }

    #[test]
    fn test_computed_settings_target_at_150_percent() {
        // Reference scenario: window (100,100,1200,900) at 1.5x,
        // Settings is index 11.
        let m = mapper(Rect::new(100, 100, 1200, 900), 1.5);
        let point = m.computed(LogicalTarget::SETTINGS);
        assert_eq!(point, Point::new(153, 1045));
    }

    #[test]
    fn test_computed_chat_at_unit_scale() {
        let m = mapper(Rect::new(0, 0, 800, 600), 1.0);
        assert_eq!(m.computed(LogicalTarget::CHAT), Point::new(35, 65));
    }

    #[test]
    fn test_computed_targets_fall_inside_window() {
        let window = Rect::new(100, 100, 1200, 1200);
        let m = mapper(window, 1.25);
        for index in 0..13 {
            let point = m.computed(LogicalTarget::new(index, "panel"));
            assert!(window.contains(point), "index {index} escaped the window");
        }
    }

    #[test]
    fn test_resolve_prefers_plausible_anchor() {
        let m = mapper(Rect::new(100, 100, 1200, 900), 1.0);
        // Anchor close to the computed first-button center (35, 65).
        let anchor = FeatureCluster {
            first_row: 58,
            last_row: 72,
            max_col: 52,
            rows: 15,
        };
        let point = m.resolve(LogicalTarget::FILES, &[anchor]);
        // x = 100 + (52/2 + 10); y = 100 + 65 + 2 * 51
        assert_eq!(point, Point::new(136, 267));
    }

    #[test]
    fn test_resolve_rejects_anchor_outside_strip() {
        let m = mapper(Rect::new(0, 0, 1000, 800), 1.0);
        let anchor = FeatureCluster {
            first_row: 60,
            last_row: 70,
            max_col: 400, // center_x = 210, beyond the 120 px strip
            rows: 11,
        };
        let point = m.resolve(LogicalTarget::CHAT, &[anchor]);
        assert_eq!(point, m.computed(LogicalTarget::CHAT));
    }

    #[test]
    fn test_resolve_rejects_anchor_far_from_first_button() {
        let m = mapper(Rect::new(0, 0, 1000, 800), 1.0);
        // Plausible x but vertically nowhere near the first button.
        let anchor = FeatureCluster {
            first_row: 500,
            last_row: 510,
            max_col: 40,
            rows: 11,
        };
        let point = m.resolve(LogicalTarget::CHAT, &[anchor]);
        assert_eq!(point, m.computed(LogicalTarget::CHAT));
    }

    #[test]
    fn test_resolve_without_clusters_uses_computed() {
        let m = mapper(Rect::new(50, 50, 850, 650), 2.0);
        assert_eq!(
            m.resolve(LogicalTarget::HELP, &[]),
            m.computed(LogicalTarget::HELP)
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_index_is_contract_violation() {
        let m = mapper(Rect::new(0, 0, 800, 600), 1.0);
        let _ = m.computed(LogicalTarget::new(13, "beyond"));
    }

    #[test]
    fn test_api_key_input_at_150_percent() {
        // window right = 1200: x = 1200 - round(260*1.5) = 810,
        // y = 100 + round(273*1.5) = 510.
        let m = mapper(Rect::new(100, 100, 1200, 900), 1.5);
        assert_eq!(m.api_key_input(), Point::new(810, 510));
    }

    #[test]
    fn test_input_and_badge_regions_nest_near_right_edge() {
        let window = Rect::new(0, 0, 1600, 1000);
        let m = mapper(window, 1.0);
        let input = m.input_region();
        let badge = m.badge_region();
        assert_eq!(input, Rect::new(1200, 255, 1470, 295));
        assert_eq!(badge, Rect::new(1440, 260, 1580, 290));
        assert!(input.width() > 0 && badge.width() > 0);
    }

    #[test]
    fn test_header_region_local_scales() {
        let m = mapper(Rect::new(0, 0, 1000, 800), 2.0);
        assert_eq!(m.header_region_local(), (200, 80, 1200, 300));
    }

    proptest! {
        /// Consecutive indices always differ in y by exactly
        /// round(spacing * scale), for any scale.
        #[test]
        fn prop_spacing_law(
            index in 0usize..12,
            scale in 0.5f64..4.0,
        ) {
            let m = mapper(Rect::new(100, 100, 5000, 5000), scale);
            let a = m.computed(LogicalTarget::new(index, "a"));
            let b = m.computed(LogicalTarget::new(index + 1, "b"));
            let expected = (51.0 * scale).round() as i32;
            prop_assert_eq!(b.y - a.y, expected);
            prop_assert_eq!(b.x, a.x);
        }

        /// Detected and computed strategies agree on the spacing law too.
        #[test]
        fn prop_anchor_spacing_law(index in 0usize..12) {
            let m = mapper(Rect::new(0, 0, 2000, 2000), 1.0);
            let anchor = FeatureCluster {
                first_row: 60,
                last_row: 70,
                max_col: 50,
                rows: 11,
            };
            let a = m.resolve(LogicalTarget::new(index, "a"), &[anchor]);
            let b = m.resolve(LogicalTarget::new(index + 1, "b"), &[anchor]);
            prop_assert_eq!(b.y - a.y, 51);
        }
    }
}
