//! Display-scale resolution and the per-run calibration record.
//!
//! Screenshot APIs and mouse-injection APIs are not guaranteed to agree on
//! pixel space (logical vs. physical) across environments, so the resolver
//! does not trust the OS DPI value alone: after the first capture it
//! reconciles the DPI-derived scale against the empirically observed
//! buffer-width / window-width ratio.

use crate::capture::PixelBuffer;
use crate::desktop::DpiContext;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Reconciliation tolerance: buffer and window widths within this many
/// pixels are considered to agree.
pub const RECONCILE_TOLERANCE_PX: u32 = 10;

/// Physical pixels per logical pixel (typically 1.0, 1.25, 1.5, 2.0).
///
/// Resolved once per run; all coordinate math for the run's duration uses
/// exactly one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayScale(f64);

impl Default for DisplayScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl DisplayScale {
    /// Wrap a raw factor. Non-positive or non-finite inputs degrade to 1.0
    /// rather than erroring; a usable default is always available.
    #[must_use]
    pub fn new(factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            Self(factor)
        } else {
            tracing::info!(factor, "non-positive scale factor, defaulting to 1.0");
            Self(1.0)
        }
    }

    /// The raw scale factor
    #[must_use]
    pub const fn factor(&self) -> f64 {
        self.0
    }

    /// Convert a logical-pixel length to physical pixels, rounded to nearest
    #[must_use]
    pub fn to_physical(&self, logical: i32) -> i32 {
        (f64::from(logical) * self.0).round() as i32
    }

    /// Convert a physical-pixel length to logical pixels
    #[must_use]
    pub fn to_logical(&self, physical: i32) -> f64 {
        f64::from(physical) / self.0
    }
}

impl std::fmt::Display for DisplayScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}

/// Resolves the run's display scale
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleResolver;

impl ScaleResolver {
    /// Compute scale from the OS-reported DPI (dots per logical inch / 96).
    ///
    /// Never fails: a missing DPI value degrades to 1.0 (logical ==
    /// physical) and [`reconcile`](Self::reconcile) corrects it afterwards.
    #[must_use]
    pub fn resolve(dpi: &dyn DpiContext) -> DisplayScale {
        match dpi.primary_dpi() {
            Some(value) => {
                let scale = DisplayScale::new(f64::from(value) / 96.0);
                tracing::info!(dpi = value, %scale, "DPI-derived display scale");
                scale
            }
            None => {
                tracing::info!("DPI query unavailable, assuming scale 1.0");
                DisplayScale::default()
            }
        }
    }

    /// Reconcile a DPI-derived scale against an actual capture of the
    /// window.
    ///
    /// If the calibration buffer's pixel width matches the window's
    /// physical-pixel width (within [`RECONCILE_TOLERANCE_PX`]), the capture
    /// service is operating in the same pixel space and the DPI-derived
    /// scale is kept unchanged. Otherwise the observed ratio wins.
    #[must_use]
    pub fn reconcile(scale: DisplayScale, window: Rect, buffer: &PixelBuffer) -> DisplayScale {
        let win_w = window.width();
        let buf_w = buffer.width();
        if win_w == 0 {
            return scale;
        }
        if buf_w.abs_diff(win_w) < RECONCILE_TOLERANCE_PX {
            return scale;
        }
        let observed = DisplayScale::new(f64::from(buf_w) / f64::from(win_w));
        tracing::info!(
            window_width = win_w,
            buffer_width = buf_w,
            dpi_scale = %scale,
            observed_scale = %observed,
            "capture and window widths disagree, trusting observed ratio"
        );
        observed
    }
}

/// Immutable per-run calibration: one window rectangle, one scale.
///
/// Constructed once at startup and passed by reference to every component
/// that needs it; never ambient global state. The window is assumed stable
/// for the run's duration (no resize handling).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Target window rectangle in physical pixels
    pub window: Rect,
    /// Resolved display scale
    pub scale: DisplayScale,
}

impl Calibration {
    /// Create a calibration record
    #[must_use]
    pub const fn new(window: Rect, scale: DisplayScale) -> Self {
        Self { window, scale }
    }

    /// Resolve scale from DPI, then reconcile against a calibration capture
    /// of the window.
    #[must_use]
    pub fn establish(dpi: &dyn DpiContext, window: Rect, calibration_shot: &PixelBuffer) -> Self {
        let resolved = ScaleResolver::resolve(dpi);
        let scale = ScaleResolver::reconcile(resolved, window, calibration_shot);
        Self { window, scale }
    }
}
