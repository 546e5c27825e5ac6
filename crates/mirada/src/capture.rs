//! Pixel buffers, the capture seam, and screenshot artifacts.

use crate::geometry::Rect;
use crate::result::{HarnessError, HarnessResult};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// A captured region of the screen: RGB samples tagged with the
/// physical-pixel rectangle they were taken from.
///
/// The buffer's own pixel dimensions are *not* required to equal the capture
/// rectangle's size. When the environment is correctly DPI-calibrated they
/// match; a mismatch is diagnostic data (the capture service works in logical
/// pixels) and is what [`crate::ScaleResolver::reconcile`] feeds on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Capture rectangle in physical pixels
    pub rect: Rect,
    width: u32,
    height: u32,
    /// Tightly packed RGB, row-major, 3 bytes per pixel
    rgb: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGB bytes. Returns `None` when the byte count does not match
    /// `width * height * 3`.
    #[must_use]
    pub fn from_rgb(rect: Rect, width: u32, height: u32, rgb: Vec<u8>) -> Option<Self> {
        if rgb.len() != (width as usize) * (height as usize) * 3 {
            return None;
        }
        Some(Self {
            rect,
            width,
            height,
            rgb,
        })
    }

    /// Convert an RGBA capture (the format screenshot services produce),
    /// dropping the alpha channel.
    #[must_use]
    pub fn from_rgba(rect: Rect, img: &RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * 3);
        for px in img.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
        }
        Self {
            rect,
            width,
            height,
            rgb,
        }
    }

    /// Buffer width in its own pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in its own pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// RGB channels of one pixel. Caller must stay in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let idx = ((y * self.width + x) * 3) as usize;
        (self.rgb[idx], self.rgb[idx + 1], self.rgb[idx + 2])
    }

    /// Crop a sub-region given in buffer-local pixel coordinates
    /// (left, top inclusive; right, bottom exclusive), clamped to the buffer.
    /// The result's capture rectangle is translated by the same offsets.
    #[must_use]
    pub fn crop(&self, left: u32, top: u32, right: u32, bottom: u32) -> Self {
        let right = right.min(self.width);
        let bottom = bottom.min(self.height);
        let left = left.min(right);
        let top = top.min(bottom);

        let width = right - left;
        let height = bottom - top;
        let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * 3);
        for y in top..bottom {
            let start = ((y * self.width + left) * 3) as usize;
            let end = start + (width as usize) * 3;
            rgb.extend_from_slice(&self.rgb[start..end]);
        }

        Self {
            rect: Rect::new(
                self.rect.left + left as i32,
                self.rect.top + top as i32,
                self.rect.left + right as i32,
                self.rect.top + bottom as i32,
            ),
            width,
            height,
            rgb,
        }
    }

    /// Crop away the left sidebar strip, keeping the content area
    #[must_use]
    pub fn content_area(&self, sidebar_px: u32) -> Self {
        self.crop(sidebar_px, 0, self.width, self.height)
    }

    /// Mean channel value over the whole buffer (0–255 scale).
    ///
    /// Used as a blank-region check: a region that rendered content sits
    /// strictly between "all black" and "all white".
    #[must_use]
    pub fn mean_brightness(&self) -> f64 {
        if self.rgb.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.rgb.iter().map(|&c| u64::from(c)).sum();
        sum as f64 / self.rgb.len() as f64
    }

    fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.rgb.clone())
    }
}

/// OS screenshot service seam.
///
/// `region = None` captures the full screen; otherwise the given
/// physical-pixel rectangle.
pub trait ScreenCapture {
    /// Capture a region (or the full screen) as a pixel buffer
    fn capture(&mut self, region: Option<Rect>) -> HarnessResult<PixelBuffer>;
}

/// One saved screenshot artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// File name inside the artifact directory
    pub file_name: String,
    /// File size in bytes
    pub bytes: u64,
}

/// Persists every captured step as `NN_description.png` for post-hoc human
/// inspection.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create the store, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> HarnessResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory the artifacts land in
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a buffer as `{name}.png`, returning the written path
    pub fn save(&self, name: &str, buffer: &PixelBuffer) -> HarnessResult<PathBuf> {
        let path = self.dir.join(format!("{name}.png"));
        let img = buffer
            .to_rgb_image()
            .ok_or_else(|| HarnessError::ArtifactError {
                name: name.to_string(),
                message: "buffer dimensions inconsistent with data".to_string(),
            })?;
        img.save(&path)?;
        tracing::debug!(artifact = %path.display(), width = buffer.width(), height = buffer.height(), "saved screenshot");
        Ok(path)
    }

    /// List saved PNG artifacts, sorted by file name, with byte sizes
    pub fn list(&self) -> HarnessResult<Vec<ArtifactEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.ends_with(".png") {
                continue;
            }
            entries.push(ArtifactEntry {
                file_name,
                bytes: entry.metadata()?.len(),
            });
        }
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }
}
