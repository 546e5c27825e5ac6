//! Real OS services behind the library's collaborator traits.
//!
//! Capture goes through `xcap` on every platform. Window management, input
//! injection, and DPI context are Win32-only (the target application ships
//! on Windows); other platforms get stubs that fail the connect step with a
//! clear message.

mod screen;

#[cfg(windows)]
mod win32;
#[cfg(not(windows))]
mod unsupported;

pub use screen::XcapCapture;

#[cfg(windows)]
use win32 as imp;
#[cfg(not(windows))]
use unsupported as imp;

/// Window-management plus DPI context service for this platform
pub fn desktop() -> imp::Desktop {
    imp::Desktop::new()
}

/// Input-injection service for this platform
pub fn input() -> imp::Input {
    imp::Input::new()
}

/// Screen-capture service for this platform
pub fn capture() -> XcapCapture {
    XcapCapture::new()
}
