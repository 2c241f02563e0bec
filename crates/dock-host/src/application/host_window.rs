//! HostWindow port: the top-level window the dock positions.

use dock_core::{LogicalRect, WindowHandle};

/// The window being docked.
///
/// The dock only ever moves, shows, hides, and fades it; everything drawn
/// inside belongs to other subsystems.  Bounds are in logical units; the
/// adapter converts to device pixels.
#[cfg_attr(test, mockall::automock)]
pub trait HostWindow {
    /// Native handle, or an invalid (zero) handle if the OS window has not
    /// been created yet.
    fn native_handle(&self) -> WindowHandle;

    fn set_bounds(&mut self, bounds: LogicalRect);

    fn set_visible(&mut self, visible: bool);

    fn set_always_on_top(&mut self, on_top: bool);

    /// Whole-window opacity in `0.0..=1.0`.
    fn set_opacity(&mut self, opacity: f64);
}
