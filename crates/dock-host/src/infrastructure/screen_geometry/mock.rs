//! Settable screen geometry for tests and the headless demo.

use std::cell::Cell;

use dock_core::{DpiScale, Rect};

use crate::application::screen_geometry::ScreenGeometryProvider;

/// A primary display whose bounds, work area and DPI scale can be changed at
/// any time, e.g. to simulate a resolution or scaling change between calls.
#[derive(Debug)]
pub struct MockScreenGeometry {
    full_bounds: Cell<Rect>,
    work_area: Cell<Rect>,
    dpi_scale: Cell<DpiScale>,
}

impl MockScreenGeometry {
    pub fn new(full_bounds: Rect, work_area: Rect, dpi_scale: DpiScale) -> Self {
        Self {
            full_bounds: Cell::new(full_bounds),
            work_area: Cell::new(work_area),
            dpi_scale: Cell::new(dpi_scale),
        }
    }

    /// 1920×1080 at 100 % with a 40-pixel taskbar along the bottom.
    pub fn single_1080p() -> Self {
        Self::new(
            Rect::new(0, 0, 1920, 1080),
            Rect::new(0, 0, 1920, 1040),
            DpiScale::IDENTITY,
        )
    }

    pub fn set_full_bounds(&self, rect: Rect) {
        self.full_bounds.set(rect);
    }

    pub fn set_work_area(&self, rect: Rect) {
        self.work_area.set(rect);
    }

    pub fn set_dpi_scale(&self, scale: DpiScale) {
        self.dpi_scale.set(scale);
    }
}

impl Default for MockScreenGeometry {
    fn default() -> Self {
        Self::single_1080p()
    }
}

impl ScreenGeometryProvider for MockScreenGeometry {
    fn primary_display_full_bounds(&self) -> Rect {
        self.full_bounds.get()
    }

    fn primary_work_area(&self) -> Rect {
        self.work_area.get()
    }

    fn dpi_scale(&self) -> DpiScale {
        self.dpi_scale.get()
    }
}

#[cfg(test)]
mod tests {
    use dock_core::LogicalRect;

    use super::*;

    #[test]
    fn test_logical_work_area_divides_by_current_scale() {
        let geometry = MockScreenGeometry::new(
            Rect::new(0, 0, 2880, 1620),
            Rect::new(0, 0, 2880, 1560),
            DpiScale::new(1.5).unwrap(),
        );
        assert_eq!(
            geometry.logical_work_area(),
            LogicalRect::new(0.0, 0.0, 1920.0, 1040.0)
        );
    }

    #[test]
    fn test_display_metrics_reflect_latest_values() {
        let geometry = MockScreenGeometry::single_1080p();
        geometry.set_dpi_scale(DpiScale::new(2.0).unwrap());
        let metrics = geometry.display_metrics();
        assert_eq!(metrics.dpi_scale.factor(), 2.0);
        assert_eq!(metrics.full_bounds, Rect::new(0, 0, 1920, 1080));
    }
}
