//! `xcap`-backed screen capture.

use mirada::{HarnessError, HarnessResult, PixelBuffer, Rect, ScreenCapture};

/// Captures the primary monitor and crops requested regions out of the full
/// frame. Region rectangles are physical-pixel screen coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapCapture;

impl XcapCapture {
    /// Create the capture service
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn full_frame() -> HarnessResult<PixelBuffer> {
        let monitors = xcap::Monitor::all().map_err(|e| HarnessError::ScreenshotError {
            message: format!("failed to enumerate monitors: {e}"),
        })?;
        let monitor = monitors
            .iter()
            .find(|m| m.is_primary())
            .or_else(|| monitors.first())
            .ok_or_else(|| HarnessError::ScreenshotError {
                message: "no monitors found".to_string(),
            })?;

        let img = monitor
            .capture_image()
            .map_err(|e| HarnessError::ScreenshotError {
                message: format!("screen capture failed: {e}"),
            })?;

        let rect = Rect::from_origin_size(monitor.x(), monitor.y(), img.width(), img.height());
        Ok(PixelBuffer::from_rgba(rect, &img))
    }
}

impl ScreenCapture for XcapCapture {
    fn capture(&mut self, region: Option<Rect>) -> HarnessResult<PixelBuffer> {
        let full = Self::full_frame()?;
        match region {
            None => Ok(full),
            Some(r) => {
                let left = (r.left - full.rect.left).max(0) as u32;
                let top = (r.top - full.rect.top).max(0) as u32;
                Ok(full.crop(left, top, left + r.width(), top + r.height()))
            }
        }
    }
}
