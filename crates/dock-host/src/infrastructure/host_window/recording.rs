//! Host window that records every call instead of touching the OS.
//!
//! Used by the integration tests and by the headless demo binary.  Calls are
//! stored in order so tests can assert both the final state and the exact
//! sequence of bounds the window went through.

use dock_core::{LogicalRect, WindowHandle};

use crate::application::host_window::HostWindow;

/// One recorded call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCall {
    SetBounds(LogicalRect),
    SetVisible(bool),
    SetAlwaysOnTop(bool),
    SetOpacity(f64),
}

/// In-memory [`HostWindow`].
#[derive(Debug, Default)]
pub struct RecordingHostWindow {
    handle: WindowHandle,
    calls: Vec<HostCall>,
    bounds: Option<LogicalRect>,
    visible: bool,
    always_on_top: bool,
    opacity: f64,
}

impl RecordingHostWindow {
    pub fn new(handle: WindowHandle) -> Self {
        Self {
            handle,
            ..Self::default()
        }
    }

    /// Simulates the OS window being created (or not yet) by changing the
    /// handle [`HostWindow::native_handle`] returns.
    pub fn set_native_handle(&mut self, handle: WindowHandle) {
        self.handle = handle;
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Every rectangle passed to `set_bounds`, in order.
    pub fn bounds_history(&self) -> Vec<LogicalRect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::SetBounds(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn last_bounds(&self) -> Option<LogicalRect> {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Forgets the recorded calls; the current state is kept.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl HostWindow for RecordingHostWindow {
    fn native_handle(&self) -> WindowHandle {
        self.handle
    }

    fn set_bounds(&mut self, bounds: LogicalRect) {
        self.calls.push(HostCall::SetBounds(bounds));
        self.bounds = Some(bounds);
    }

    fn set_visible(&mut self, visible: bool) {
        self.calls.push(HostCall::SetVisible(visible));
        self.visible = visible;
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.calls.push(HostCall::SetAlwaysOnTop(on_top));
        self.always_on_top = on_top;
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.calls.push(HostCall::SetOpacity(opacity));
        self.opacity = opacity;
    }
}
