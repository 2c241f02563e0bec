//! ScreenGeometryProvider: physical bounds and DPI scale of the primary display.

use dock_core::{DisplayMetrics, DpiScale, LogicalRect, Rect};

/// Reads the primary display's geometry.
///
/// Implementations must query the OS on every call: the monitor
/// configuration and DPI can change while the dock is running, and callers
/// rely on never seeing a stale scale paired with a fresh rectangle.
pub trait ScreenGeometryProvider {
    /// Full physical bounds of the primary display, including areas other
    /// app bars have reserved.
    fn primary_display_full_bounds(&self) -> Rect;

    /// Physical bounds of the primary display minus reserved bands.
    fn primary_work_area(&self) -> Rect;

    /// Current DPI scale of the primary display.
    fn dpi_scale(&self) -> DpiScale;

    /// Reads all three values into one snapshot.
    fn display_metrics(&self) -> DisplayMetrics {
        DisplayMetrics {
            dpi_scale: self.dpi_scale(),
            full_bounds: self.primary_display_full_bounds(),
            work_area: self.primary_work_area(),
        }
    }

    /// The work area converted to logical units.
    fn logical_work_area(&self) -> LogicalRect {
        self.primary_work_area().to_logical(self.dpi_scale())
    }
}
