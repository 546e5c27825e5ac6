//! Collaborator traits for the OS services the harness drives.
//!
//! Mirada's core is pure logic; everything that actually touches the desktop
//! (window management, DPI queries, input injection) enters through these
//! seams. The `mirador` binary supplies real implementations; tests supply
//! fakes.

use crate::geometry::{Point, Rect};
use crate::result::{HarnessError, HarnessResult};

/// One window-discovery strategy.
///
/// Discovery tries a small fixed set of *independent* strategies in order;
/// this is not a retry loop. Each variant maps to one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowQuery {
    /// Match by process executable name (e.g. `hive.exe`)
    ProcessName(String),
    /// Match the window title against a regular expression
    TitlePattern(String),
    /// Scan all top-level windows for a title containing this substring
    /// (case-insensitive). Last-resort strategy.
    TitleContains(String),
}

impl WindowQuery {
    /// Short human-readable description, used in the exhaustion error
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ProcessName(name) => format!("process {name}"),
            Self::TitlePattern(re) => format!("title pattern {re}"),
            Self::TitleContains(s) => format!("desktop scan for '{s}'"),
        }
    }
}

/// OS window-management service (consumed read-only by the connect step)
pub trait WindowService {
    /// Opaque window handle
    type Handle;

    /// Resolve a window for one discovery strategy
    fn find_window(&self, query: &WindowQuery) -> HarnessResult<Self::Handle>;

    /// Absolute screen rectangle of the window, in physical pixels
    fn geometry(&self, handle: &Self::Handle) -> HarnessResult<Rect>;

    /// Bring the window to the foreground. Best effort; a focus failure is
    /// tolerated by callers because a click will raise the window anyway.
    fn focus(&self, handle: &Self::Handle) -> HarnessResult<()>;
}

/// A keystroke unit for [`InputService::send_keys`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Plain text entry, one character at a time
    Text(String),
    /// Select-all (Ctrl+A)
    SelectAll,
    /// Delete key
    Delete,
    /// Tab key (used to blur a field and trigger auto-save)
    Tab,
}

/// OS input-injection service
pub trait InputService {
    /// Left-click at an absolute physical-pixel position
    fn click(&mut self, at: Point) -> HarnessResult<()>;

    /// Wheel-scroll at a position; positive `wheel` scrolls up
    fn scroll(&mut self, at: Point, wheel: i32) -> HarnessResult<()>;

    /// Inject a key sequence in order
    fn send_keys(&mut self, keys: &[KeyAction]) -> HarnessResult<()>;
}

/// Process-wide DPI context
///
/// [`declare_awareness`](Self::declare_awareness) must be called before any
/// geometry or coordinate work so that window rectangles, captures, and
/// injected clicks all share one pixel space. Both operations are best
/// effort and never fail: a missing DPI value degrades to scale 1.0 in
/// [`crate::ScaleResolver`].
pub trait DpiContext {
    /// Declare per-monitor DPI awareness for this process. Returns whether
    /// the declaration took effect; `false` means coordinate math may be
    /// unreliable and is logged as a warning by callers.
    fn declare_awareness(&self) -> bool;

    /// Dots per logical inch of the primary monitor, if the OS exposes it
    fn primary_dpi(&self) -> Option<u32>;
}

/// Try each discovery strategy once, in order, returning the first window
/// found together with its geometry.
///
/// # Errors
///
/// Returns [`HarnessError::WindowNotFound`] listing every exhausted strategy
/// when none of them resolves a window. This is the only fatal error in a
/// run.
pub fn connect_window<W: WindowService>(
    service: &W,
    queries: &[WindowQuery],
) -> HarnessResult<(W::Handle, Rect)> {
    for query in queries {
        tracing::debug!(strategy = %query.describe(), "trying window discovery strategy");
        match service.find_window(query) {
            Ok(handle) => {
                let rect = service.geometry(&handle)?;
                tracing::info!(strategy = %query.describe(), %rect, "window found");
                return Ok((handle, rect));
            }
            Err(err) => {
                tracing::debug!(strategy = %query.describe(), %err, "strategy missed");
            }
        }
    }

    let tried = queries
        .iter()
        .map(WindowQuery::describe)
        .collect::<Vec<_>>()
        .join(", ");
    Err(HarnessError::WindowNotFound {
        message: format!("exhausted strategies: {tried}"),
    })
}
