//! Windows primary display geometry via `GetSystemMetrics`,
//! `SystemParametersInfoW(SPI_GETWORKAREA)` and `GetDpiForSystem`.
//!
//! Every call goes to the OS; nothing is cached.

#![cfg(target_os = "windows")]

use dock_core::{DpiScale, Rect};
use tracing::warn;
use windows::Win32::Foundation::RECT;
use windows::Win32::UI::HiDpi::GetDpiForSystem;
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SystemParametersInfoW, SM_CXSCREEN, SM_CYSCREEN, SPI_GETWORKAREA,
    SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
};

use crate::application::screen_geometry::ScreenGeometryProvider;

/// Windows implementation of [`ScreenGeometryProvider`].
pub struct WindowsScreenGeometry;

impl WindowsScreenGeometry {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsScreenGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenGeometryProvider for WindowsScreenGeometry {
    fn primary_display_full_bounds(&self) -> Rect {
        // SAFETY: GetSystemMetrics has no preconditions.
        let (cx, cy) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        // The primary display's top-left corner is always the origin.
        Rect::new(0, 0, cx, cy)
    }

    fn primary_work_area(&self) -> Rect {
        let mut rc = RECT::default();
        // SAFETY: `rc` is a valid RECT that SPI_GETWORKAREA writes into.
        let result = unsafe {
            SystemParametersInfoW(
                SPI_GETWORKAREA,
                0,
                Some(&mut rc as *mut RECT as *mut _),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
        };
        match result {
            Ok(()) => Rect::new(rc.left, rc.top, rc.right, rc.bottom),
            Err(e) => {
                warn!(error = %e, "SPI_GETWORKAREA failed; using full display bounds");
                self.primary_display_full_bounds()
            }
        }
    }

    fn dpi_scale(&self) -> DpiScale {
        // SAFETY: GetDpiForSystem has no preconditions.
        DpiScale::from_dpi(unsafe { GetDpiForSystem() })
    }
}
