//! Win32 window management, input injection, and DPI context.
//!
//! Input goes through `SendInput` so injected events land in the same
//! physical-pixel space as window rectangles and captures once per-monitor
//! DPI awareness has been declared.

#![allow(unsafe_code)]

use mirada::{
    DpiContext, HarnessError, HarnessResult, InputService, KeyAction, Point, Rect, WindowQuery,
    WindowService,
};
use std::time::Duration;
use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, BOOL, HWND, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Gdi::{GetDC, GetDeviceCaps, ReleaseDC, LOGPIXELSX};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::HiDpi::{SetProcessDpiAwareness, PROCESS_PER_MONITOR_DPI_AWARE};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_KEYUP, KEYEVENTF_UNICODE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_WHEEL, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY, VK_A, VK_CONTROL, VK_DELETE,
    VK_TAB,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowRect, GetWindowTextW, GetWindowThreadProcessId, IsWindowVisible,
    SetCursorPos, SetForegroundWindow, SetProcessDPIAware,
};

const WHEEL_DELTA: i32 = 120;
/// Pause between injected key events, matching the target's input debounce
const KEY_PAUSE: Duration = Duration::from_millis(30);

/// A resolved top-level window
#[derive(Debug, Clone, Copy)]
pub struct WindowHandle(HWND);

struct WindowRecord {
    hwnd: HWND,
    title: String,
    pid: u32,
}

extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // lparam carries the collection vector; enumeration never stops early.
    let records = unsafe { &mut *(lparam.0 as *mut Vec<WindowRecord>) };
    unsafe {
        if !IsWindowVisible(hwnd).as_bool() {
            return TRUE;
        }
        let mut buf = [0u16; 512];
        let len = GetWindowTextW(hwnd, &mut buf);
        let title = String::from_utf16_lossy(&buf[..len.max(0) as usize]);
        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut pid));
        records.push(WindowRecord { hwnd, title, pid });
    }
    TRUE
}

fn top_level_windows() -> Vec<WindowRecord> {
    let mut records: Vec<WindowRecord> = Vec::new();
    let lparam = LPARAM(std::ptr::addr_of_mut!(records) as isize);
    let _ = unsafe { EnumWindows(Some(enum_proc), lparam) };
    records
}

/// Lowercase executable file name of a process, e.g. `hive.exe`
fn process_image_name(pid: u32) -> Option<String> {
    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }.ok()?;
    let mut buf = [0u16; 1024];
    let mut size = buf.len() as u32;
    let result = unsafe {
        QueryFullProcessImageNameW(handle, PROCESS_NAME_WIN32, PWSTR(buf.as_mut_ptr()), &mut size)
    };
    unsafe {
        let _ = CloseHandle(handle);
    }
    result.ok()?;
    let path = String::from_utf16_lossy(&buf[..size as usize]);
    std::path::Path::new(&path)
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
}

/// Win32 window-management and DPI service
#[derive(Debug, Default, Clone, Copy)]
pub struct Desktop;

impl Desktop {
    /// Create the service
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WindowService for Desktop {
    type Handle = WindowHandle;

    fn find_window(&self, query: &WindowQuery) -> HarnessResult<WindowHandle> {
        let windows = top_level_windows();
        let found = match query {
            WindowQuery::ProcessName(name) => {
                let wanted = name.to_lowercase();
                windows
                    .into_iter()
                    .find(|w| process_image_name(w.pid).is_some_and(|img| img == wanted))
            }
            WindowQuery::TitlePattern(pattern) => {
                let re = regex::Regex::new(pattern)?;
                windows.into_iter().find(|w| re.is_match(&w.title))
            }
            WindowQuery::TitleContains(needle) => {
                let needle = needle.to_lowercase();
                windows
                    .into_iter()
                    .find(|w| w.title.to_lowercase().contains(&needle))
            }
        };

        found
            .map(|w| WindowHandle(w.hwnd))
            .ok_or_else(|| HarnessError::WindowNotFound {
                message: query.describe(),
            })
    }

    fn geometry(&self, handle: &WindowHandle) -> HarnessResult<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(handle.0, &mut rect) }.map_err(|e| HarnessError::GeometryError {
            message: e.to_string(),
        })?;
        Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn focus(&self, handle: &WindowHandle) -> HarnessResult<()> {
        // A refusal here is tolerable: the first injected click raises the
        // window anyway.
        let raised = unsafe { SetForegroundWindow(handle.0) };
        if !raised.as_bool() {
            tracing::debug!("SetForegroundWindow refused, relying on click-to-raise");
        }
        Ok(())
    }
}

impl DpiContext for Desktop {
    fn declare_awareness(&self) -> bool {
        // Per-monitor awareness first; fall back to system-level awareness.
        if unsafe { SetProcessDpiAwareness(PROCESS_PER_MONITOR_DPI_AWARE) }.is_ok() {
            return true;
        }
        unsafe { SetProcessDPIAware() }.as_bool()
    }

    fn primary_dpi(&self) -> Option<u32> {
        unsafe {
            let hdc = GetDC(None);
            if hdc.is_invalid() {
                return None;
            }
            let dpi = GetDeviceCaps(hdc, LOGPIXELSX);
            ReleaseDC(None, hdc);
            (dpi > 0).then_some(dpi as u32)
        }
    }
}

/// Win32 input injection over `SendInput`
#[derive(Debug, Default, Clone, Copy)]
pub struct Input;

impl Input {
    /// Create the service
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn move_cursor(at: Point) -> HarnessResult<()> {
        unsafe { SetCursorPos(at.x, at.y) }.map_err(|e| HarnessError::InputError {
            message: format!("SetCursorPos failed: {e}"),
        })?;
        std::thread::sleep(Duration::from_millis(10));
        Ok(())
    }
}

fn send(inputs: &[INPUT]) -> HarnessResult<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize == inputs.len() {
        Ok(())
    } else {
        Err(HarnessError::InputError {
            message: format!("SendInput injected {sent} of {} events", inputs.len()),
        })
    }
}

fn mouse(flags: MOUSE_EVENT_FLAGS, wheel_data: i32) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: wheel_data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn key(vk: VIRTUAL_KEY, up: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: 0,
                dwFlags: if up {
                    KEYEVENTF_KEYUP
                } else {
                    KEYBD_EVENT_FLAGS(0)
                },
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn unicode(scan: u16, up: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: scan,
                dwFlags: if up {
                    KEYEVENTF_UNICODE | KEYEVENTF_KEYUP
                } else {
                    KEYEVENTF_UNICODE
                },
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

impl InputService for Input {
    fn click(&mut self, at: Point) -> HarnessResult<()> {
        Self::move_cursor(at)?;
        send(&[
            mouse(MOUSEEVENTF_LEFTDOWN, 0),
            mouse(MOUSEEVENTF_LEFTUP, 0),
        ])
    }

    fn scroll(&mut self, at: Point, wheel: i32) -> HarnessResult<()> {
        Self::move_cursor(at)?;
        send(&[mouse(MOUSEEVENTF_WHEEL, wheel * WHEEL_DELTA)])
    }

    fn send_keys(&mut self, keys: &[KeyAction]) -> HarnessResult<()> {
        for action in keys {
            match action {
                KeyAction::Text(text) => {
                    for scan in text.encode_utf16() {
                        send(&[unicode(scan, false), unicode(scan, true)])?;
                        std::thread::sleep(KEY_PAUSE);
                    }
                }
                KeyAction::SelectAll => send(&[
                    key(VK_CONTROL, false),
                    key(VK_A, false),
                    key(VK_A, true),
                    key(VK_CONTROL, true),
                ])?,
                KeyAction::Delete => send(&[key(VK_DELETE, false), key(VK_DELETE, true)])?,
                KeyAction::Tab => send(&[key(VK_TAB, false), key(VK_TAB, true)])?,
            }
            std::thread::sleep(KEY_PAUSE);
        }
        Ok(())
    }
}
