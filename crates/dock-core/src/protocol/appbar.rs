//! Message codes and data record exchanged with the reservation manager.
//!
//! The numeric values match the Windows shell's `SHAppBarMessage` contract
//! bit-for-bit so that the Win32 adapter can pass them through unchanged.
//! Only the four messages below are part of this subsystem's contract.
//!
//! # The four-step handshake
//!
//! 1. `NEW` associates the window handle with a callback message id.
//! 2. `QUERYPOS` submits a full-height candidate on the desired edge; the
//!    manager may move the near edge inward to avoid other bands.
//! 3. The client re-clamps the opposite edge to restore the exact width.
//! 4. `SETPOS` commits the final rectangle.
//!
//! Removal is a single `REMOVE` keyed by the same window handle.

use crate::domain::dock::ScreenEdge;
use crate::domain::geometry::{Rect, WindowHandle};

/// Name passed to `RegisterWindowMessage` to obtain the process-wide
/// callback message id.
pub const CALLBACK_MESSAGE_NAME: &str = "SidebarDock_AppBar_Callback";

// ── Message codes ─────────────────────────────────────────────────────────────

/// Messages sent to the reservation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AppBarMessage {
    /// `ABM_NEW`: register a new band owner.
    New = 0x0000_0000,
    /// `ABM_REMOVE`: release the band and unregister.
    Remove = 0x0000_0001,
    /// `ABM_QUERYPOS`: ask the manager to adjust a candidate rectangle.
    QueryPos = 0x0000_0002,
    /// `ABM_SETPOS`: commit a rectangle.
    SetPos = 0x0000_0003,
}

impl AppBarMessage {
    /// Numeric message code as passed to the shell.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for AppBarMessage {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(AppBarMessage::New),
            0x01 => Ok(AppBarMessage::Remove),
            0x02 => Ok(AppBarMessage::QueryPos),
            0x03 => Ok(AppBarMessage::SetPos),
            _ => Err(()),
        }
    }
}

/// Notification codes carried in `wParam` of the callback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AppBarNotification {
    /// `ABN_STATECHANGE`: taskbar auto-hide or always-on-top state changed.
    StateChange = 0x0000_0000,
    /// `ABN_POSCHANGED`: another band appeared, moved, or resized.
    PosChanged = 0x0000_0001,
    /// `ABN_FULLSCREENAPP`: a full-screen application opened or closed.
    FullScreenApp = 0x0000_0002,
    /// `ABN_WINDOWARRANGE`: the user is cascading/tiling windows.
    WindowArrange = 0x0000_0003,
}

impl TryFrom<u32> for AppBarNotification {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(AppBarNotification::StateChange),
            0x01 => Ok(AppBarNotification::PosChanged),
            0x02 => Ok(AppBarNotification::FullScreenApp),
            0x03 => Ok(AppBarNotification::WindowArrange),
            _ => Err(()),
        }
    }
}

// ── Edge codes ────────────────────────────────────────────────────────────────

/// `ABE_*` code for an edge.
pub fn edge_code(edge: ScreenEdge) -> u32 {
    match edge {
        ScreenEdge::Left => 0,
        ScreenEdge::Top => 1,
        ScreenEdge::Right => 2,
        ScreenEdge::Bottom => 3,
    }
}

/// Edge for an `ABE_*` code, or `None` for an unknown value.
pub fn edge_from_code(code: u32) -> Option<ScreenEdge> {
    match code {
        0 => Some(ScreenEdge::Left),
        1 => Some(ScreenEdge::Top),
        2 => Some(ScreenEdge::Right),
        3 => Some(ScreenEdge::Bottom),
        _ => None,
    }
}

// ── Data record ───────────────────────────────────────────────────────────────

/// Platform-neutral mirror of `APPBARDATA`.
///
/// The manager reads every field and may rewrite `rect` in response to
/// `QUERYPOS` and `SETPOS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppBarData {
    /// The window that owns the band.
    pub window: WindowHandle,
    /// Message id the manager posts notifications with.
    pub callback_message: u32,
    /// Edge the band attaches to.
    pub edge: ScreenEdge,
    /// Band rectangle in physical pixels.
    pub rect: Rect,
    /// Message-specific value; unused by the four messages of this contract.
    pub lparam: isize,
}

impl AppBarData {
    /// Creates a record for `window` with an empty rectangle on the right edge.
    pub fn new(window: WindowHandle, callback_message: u32) -> Self {
        Self {
            window,
            callback_message,
            edge: ScreenEdge::Right,
            rect: Rect::default(),
            lparam: 0,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_codes_match_shell_constants() {
        assert_eq!(AppBarMessage::New.code(), 0);
        assert_eq!(AppBarMessage::Remove.code(), 1);
        assert_eq!(AppBarMessage::QueryPos.code(), 2);
        assert_eq!(AppBarMessage::SetPos.code(), 3);
    }

    #[test]
    fn test_message_try_from_rejects_codes_outside_the_contract() {
        // ABM_GETSTATE (4) and ABM_WINDOWPOSCHANGED (9) are not part of the contract.
        assert_eq!(AppBarMessage::try_from(4), Err(()));
        assert_eq!(AppBarMessage::try_from(9), Err(()));
        assert_eq!(AppBarMessage::try_from(3), Ok(AppBarMessage::SetPos));
    }

    #[test]
    fn test_edge_codes_match_abe_constants() {
        assert_eq!(edge_code(ScreenEdge::Left), 0);
        assert_eq!(edge_code(ScreenEdge::Top), 1);
        assert_eq!(edge_code(ScreenEdge::Right), 2);
        assert_eq!(edge_code(ScreenEdge::Bottom), 3);
        assert_eq!(edge_from_code(2), Some(ScreenEdge::Right));
        assert_eq!(edge_from_code(7), None);
    }

    #[test]
    fn test_notification_try_from_maps_poschanged() {
        assert_eq!(
            AppBarNotification::try_from(1),
            Ok(AppBarNotification::PosChanged)
        );
        assert_eq!(AppBarNotification::try_from(42), Err(()));
    }

    #[test]
    fn test_app_bar_data_new_starts_with_empty_rect() {
        let data = AppBarData::new(WindowHandle(7), 0xC123);
        assert_eq!(data.window, WindowHandle(7));
        assert_eq!(data.callback_message, 0xC123);
        assert_eq!(data.rect, Rect::default());
        assert_eq!(data.lparam, 0);
    }
}
