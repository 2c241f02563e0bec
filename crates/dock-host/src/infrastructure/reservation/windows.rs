//! Windows reservation manager via `SHAppBarMessage`.
//!
//! Each [`AppBarMessage`] is passed through unchanged as the `ABM_*` code and
//! [`AppBarData`] is copied into an `APPBARDATA` for the call and back out
//! afterwards, so the shell's counter-proposal reaches the client.

#![cfg(target_os = "windows")]

use dock_core::protocol::appbar::{edge_code, edge_from_code};
use dock_core::{AppBarData, AppBarMessage, Rect};
use tracing::trace;
use windows::core::HSTRING;
use windows::Win32::Foundation::{HWND, LPARAM, RECT};
use windows::Win32::UI::Shell::{SHAppBarMessage, APPBARDATA};
use windows::Win32::UI::WindowsAndMessaging::RegisterWindowMessageW;

use crate::application::reservation_client::{ManagerError, ReservationManager};

/// Windows implementation of [`ReservationManager`].
pub struct WindowsReservationManager;

impl WindowsReservationManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsReservationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationManager for WindowsReservationManager {
    fn register_callback_message(&self, name: &str) -> Result<u32, ManagerError> {
        // SAFETY: the HSTRING is a valid null-terminated UTF-16 string that
        // outlives the call.
        let id = unsafe { RegisterWindowMessageW(&HSTRING::from(name)) };
        if id == 0 {
            return Err(ManagerError::Platform(format!(
                "RegisterWindowMessageW failed: {}",
                windows::core::Error::from_win32()
            )));
        }
        Ok(id)
    }

    fn send(&self, message: AppBarMessage, data: &mut AppBarData) -> Result<(), ManagerError> {
        let mut raw = to_appbardata(data);
        // SAFETY: `raw` is a fully initialised APPBARDATA on the stack with
        // `cbSize` set; the shell only reads and writes within it.
        let result = unsafe { SHAppBarMessage(message.code(), &mut raw) };
        trace!(?message, result, "SHAppBarMessage");

        // Only ABM_NEW reports failure through its return value; the others
        // always return TRUE.
        if message == AppBarMessage::New && result == 0 {
            return Err(ManagerError::Refused(message));
        }

        data.rect = Rect::new(raw.rc.left, raw.rc.top, raw.rc.right, raw.rc.bottom);
        if let Some(edge) = edge_from_code(raw.uEdge) {
            data.edge = edge;
        }
        Ok(())
    }
}

fn to_appbardata(data: &AppBarData) -> APPBARDATA {
    APPBARDATA {
        cbSize: std::mem::size_of::<APPBARDATA>() as u32,
        hWnd: HWND(data.window.0 as *mut _),
        uCallbackMessage: data.callback_message,
        uEdge: edge_code(data.edge),
        rc: RECT {
            left: data.rect.left,
            top: data.rect.top,
            right: data.rect.right,
            bottom: data.rect.bottom,
        },
        lParam: LPARAM(data.lparam),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dock_core::protocol::appbar::CALLBACK_MESSAGE_NAME;
    use dock_core::{ScreenEdge, WindowHandle};

    #[test]
    fn test_callback_message_id_is_in_registered_range() {
        let manager = WindowsReservationManager::new();
        let id = manager
            .register_callback_message(CALLBACK_MESSAGE_NAME)
            .expect("register");
        assert!((0xC000..=0xFFFF).contains(&id));
        assert_eq!(
            manager.register_callback_message(CALLBACK_MESSAGE_NAME).unwrap(),
            id
        );
    }

    #[test]
    fn test_appbardata_conversion_copies_every_field() {
        let data = AppBarData {
            edge: ScreenEdge::Left,
            rect: Rect::new(0, 0, 320, 1080),
            ..AppBarData::new(WindowHandle(0x1234), 0xC100)
        };
        let raw = to_appbardata(&data);
        assert_eq!(raw.cbSize as usize, std::mem::size_of::<APPBARDATA>());
        assert_eq!(raw.uCallbackMessage, 0xC100);
        assert_eq!(raw.uEdge, 0);
        assert_eq!(raw.rc.right, 320);
    }
}
