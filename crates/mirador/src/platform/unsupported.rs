//! Stub desktop services for platforms without window automation.
//!
//! Capture still works everywhere via `xcap`; window discovery fails at the
//! connect step with a clear message, which is the run's fatal path.

use mirada::{
    DpiContext, HarnessError, HarnessResult, InputService, KeyAction, Point, Rect, WindowQuery,
    WindowService,
};

const UNSUPPORTED: &str = "window automation is only implemented on Windows";

/// Stub window-management and DPI service
#[derive(Debug, Default, Clone, Copy)]
pub struct Desktop;

impl Desktop {
    /// Create the stub
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WindowService for Desktop {
    type Handle = ();

    fn find_window(&self, query: &WindowQuery) -> HarnessResult<()> {
        Err(HarnessError::WindowNotFound {
            message: format!("{} ({UNSUPPORTED})", query.describe()),
        })
    }

    fn geometry(&self, _handle: &()) -> HarnessResult<Rect> {
        Err(HarnessError::GeometryError {
            message: UNSUPPORTED.to_string(),
        })
    }

    fn focus(&self, _handle: &()) -> HarnessResult<()> {
        Ok(())
    }
}

impl DpiContext for Desktop {
    fn declare_awareness(&self) -> bool {
        false
    }

    fn primary_dpi(&self) -> Option<u32> {
        None
    }
}

/// Stub input service
#[derive(Debug, Default, Clone, Copy)]
pub struct Input;

impl Input {
    /// Create the stub
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl InputService for Input {
    fn click(&mut self, _at: Point) -> HarnessResult<()> {
        Err(HarnessError::InputError {
            message: UNSUPPORTED.to_string(),
        })
    }

    fn scroll(&mut self, _at: Point, _wheel: i32) -> HarnessResult<()> {
        Err(HarnessError::InputError {
            message: UNSUPPORTED.to_string(),
        })
    }

    fn send_keys(&mut self, _keys: &[KeyAction]) -> HarnessResult<()> {
        Err(HarnessError::InputError {
            message: UNSUPPORTED.to_string(),
        })
    }
}
