//! Recognises the handful of window messages the dock reacts to.
//!
//! The host window forwards its whole message stream to a single hook; this
//! classifier picks out the three codes that matter and ignores the rest, so
//! the hook stays cheap on the UI thread.

use super::appbar::AppBarNotification;

/// `WM_DISPLAYCHANGE`: display resolution changed.
pub const WM_DISPLAYCHANGE: u32 = 0x007E;

/// `WM_DPICHANGED`: the window's effective DPI changed.
pub const WM_DPICHANGED: u32 = 0x02E0;

/// A window message the dock subsystem must handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The reservation manager posted a notification on our callback id.
    Reservation(AppBarNotification),
    /// The primary display's resolution or arrangement changed.
    DisplayChanged,
    /// The DPI scale changed.
    DpiChanged,
}

/// Classifies a raw window message.
///
/// `callback_message` is the process-wide callback id, or `None` if no
/// registration has happened yet (in which case no message can be a
/// reservation notification).  Returns `None` for every message the dock
/// does not care about, including callback messages with unknown codes.
pub fn classify_window_message(
    message: u32,
    wparam: usize,
    callback_message: Option<u32>,
) -> Option<WindowEvent> {
    if callback_message.is_some_and(|id| id != 0 && id == message) {
        let code = u32::try_from(wparam).ok()?;
        return AppBarNotification::try_from(code)
            .ok()
            .map(WindowEvent::Reservation);
    }
    match message {
        WM_DISPLAYCHANGE => Some(WindowEvent::DisplayChanged),
        WM_DPICHANGED => Some(WindowEvent::DpiChanged),
        _ => None,
    }
}
