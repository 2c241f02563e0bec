//! Windows host window adapter over a raw `HWND`.
//!
//! Bounds arrive in logical units and are converted to device pixels with
//! the current DPI scale.  Opacity uses a layered window; `WS_EX_LAYERED` is
//! added the first time it is needed.

#![cfg(target_os = "windows")]

use std::rc::Rc;

use dock_core::{LogicalRect, WindowHandle};
use tracing::warn;
use windows::Win32::Foundation::{COLORREF, HWND};
use windows::Win32::UI::WindowsAndMessaging::{
    SetLayeredWindowAttributes, SetWindowPos, ShowWindow, GWL_EXSTYLE, HWND_NOTOPMOST,
    HWND_TOPMOST, LWA_ALPHA, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE,
    SW_SHOWNOACTIVATE, WS_EX_LAYERED,
};
#[cfg(target_pointer_width = "64")]
use windows::Win32::UI::WindowsAndMessaging::{GetWindowLongPtrW, SetWindowLongPtrW};
#[cfg(target_pointer_width = "32")]
use windows::Win32::UI::WindowsAndMessaging::{GetWindowLongW, SetWindowLongW};

use crate::application::host_window::HostWindow;
use crate::application::screen_geometry::ScreenGeometryProvider;

/// [`HostWindow`] for a window created elsewhere (the UI toolkit owns it).
pub struct Win32HostWindow {
    hwnd: HWND,
    geometry: Rc<dyn ScreenGeometryProvider>,
    layered: bool,
}

impl Win32HostWindow {
    /// Wraps `handle`.  A zero handle is allowed and reported as not yet
    /// realised until [`set_handle`](Self::set_handle) is called.
    pub fn new(handle: WindowHandle, geometry: Rc<dyn ScreenGeometryProvider>) -> Self {
        Self {
            hwnd: HWND(handle.0 as *mut _),
            geometry,
            layered: false,
        }
    }

    pub fn set_handle(&mut self, handle: WindowHandle) {
        self.hwnd = HWND(handle.0 as *mut _);
        self.layered = false;
    }

    fn ensure_layered(&mut self) {
        if self.layered {
            return;
        }
        // SAFETY: `hwnd` is a window owned by this process.
        unsafe { add_layered_style(self.hwnd) };
        self.layered = true;
    }
}

/// Extended style with `WS_EX_LAYERED` set.
fn with_layered(ex_style: isize) -> isize {
    ex_style | WS_EX_LAYERED.0 as isize
}

// The pointer-sized accessors only exist on 64-bit targets.
#[cfg(target_pointer_width = "64")]
unsafe fn add_layered_style(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, with_layered(style));
}

#[cfg(target_pointer_width = "32")]
unsafe fn add_layered_style(hwnd: HWND) {
    let style = GetWindowLongW(hwnd, GWL_EXSTYLE);
    SetWindowLongW(hwnd, GWL_EXSTYLE, with_layered(style as isize) as i32);
}

impl HostWindow for Win32HostWindow {
    fn native_handle(&self) -> WindowHandle {
        WindowHandle(self.hwnd.0 as isize)
    }

    fn set_bounds(&mut self, bounds: LogicalRect) {
        let px = bounds.to_physical(self.geometry.dpi_scale());
        // SAFETY: `hwnd` is a window owned by this process; invalid handles
        // make the call fail, which is reported below.
        let result = unsafe {
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                px.left,
                px.top,
                px.width(),
                px.height(),
                SWP_NOZORDER | SWP_NOACTIVATE,
            )
        };
        if let Err(e) = result {
            warn!(error = %e, rect = ?px, "SetWindowPos failed");
        }
    }

    fn set_visible(&mut self, visible: bool) {
        let command = if visible { SW_SHOWNOACTIVATE } else { SW_HIDE };
        // SAFETY: see `set_bounds`.  The return value is the previous
        // visibility, not an error.
        let _ = unsafe { ShowWindow(self.hwnd, command) };
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        let after = if on_top { HWND_TOPMOST } else { HWND_NOTOPMOST };
        // SAFETY: see `set_bounds`.
        let result = unsafe {
            SetWindowPos(
                self.hwnd,
                after,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            )
        };
        if let Err(e) = result {
            warn!(error = %e, on_top, "SetWindowPos (z-order) failed");
        }
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.ensure_layered();
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        // SAFETY: see `set_bounds`.
        let result =
            unsafe { SetLayeredWindowAttributes(self.hwnd, COLORREF(0), alpha, LWA_ALPHA) };
        if let Err(e) = result {
            warn!(error = %e, alpha, "SetLayeredWindowAttributes failed");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
