//! Result and error types for Mirada.

use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving the target application
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Target window not found after every discovery strategy was tried
    #[error("Could not find target window: {message}")]
    WindowNotFound {
        /// Which strategies were exhausted
        message: String,
    },

    /// Window geometry query failed
    #[error("Window geometry query failed: {message}")]
    GeometryError {
        /// Error message
        message: String,
    },

    /// Screen capture failed
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Input injection (mouse or keyboard) failed
    #[error("Input injection failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Artifact encoding/saving failed
    #[error("Artifact write failed for {name}: {message}")]
    ArtifactError {
        /// Artifact name (without extension)
        name: String,
        /// Error message
        message: String,
    },

    /// Invalid window-title pattern
    #[error("Invalid title pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Image encode/decode error
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
