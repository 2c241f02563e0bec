//! Screen geometry in physical (device pixel) and logical (DPI-independent) units.
//!
//! The reservation manager works exclusively in physical pixels, while the
//! host window is laid out in logical units.  The two are related by
//! `physical = logical × dpi_scale`.  Keeping them as two distinct types
//! ([`Rect`] and [`LogicalRect`]) makes it impossible to hand a physical
//! rectangle to an API that expects logical units without an explicit
//! conversion through a [`DpiScale`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dock::ScreenEdge;

/// Errors produced by geometry and edge validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    /// A dock band was requested on an edge other than Left or Right.
    ///
    /// This is a programming-contract violation and is reported before any
    /// call reaches the reservation manager.
    #[error("edge {0:?} cannot host a dock band; only Left and Right are supported")]
    EdgeUnsupported(ScreenEdge),

    /// A DPI scale of zero, a negative value, NaN or infinity was supplied.
    #[error("DPI scale must be finite and positive, got {0}")]
    InvalidDpiScale(f64),
}

/// Opaque native window handle.
///
/// On Windows this is the numeric value of an `HWND`; zero means "not yet
/// realised" (the window object exists but the OS window has not been
/// created).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// Returns `true` if the handle refers to a realised OS window.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

/// An axis-aligned rectangle in physical device pixels.
///
/// `right` and `bottom` are exclusive, matching the Win32 `RECT` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Creates a rectangle from its four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width in pixels (may be negative for a malformed rectangle).
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in pixels (may be negative for a malformed rectangle).
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Returns `true` if the rectangle has a non-positive width or height.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Converts to logical units using `scale`.
    ///
    /// The conversion divides without rounding, so
    /// `logical.to_physical(scale)` reconstructs `self` to within one pixel.
    pub fn to_logical(&self, scale: DpiScale) -> LogicalRect {
        LogicalRect {
            x: scale.to_logical(self.left),
            y: scale.to_logical(self.top),
            width: scale.to_logical(self.width()),
            height: scale.to_logical(self.height()),
        }
    }
}

/// An axis-aligned rectangle in logical (DPI-independent) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns `true` if the rectangle has a non-positive width or height.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Converts to physical pixels, rounding each edge to the nearest pixel.
    pub fn to_physical(&self, scale: DpiScale) -> Rect {
        Rect {
            left: scale.to_physical(self.x),
            top: scale.to_physical(self.y),
            right: scale.to_physical(self.right()),
            bottom: scale.to_physical(self.bottom()),
        }
    }
}

/// Ratio of physical pixels to logical units for a display.
///
/// `1.0` corresponds to 96 DPI, `1.5` to 144 DPI, and so on.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DpiScale(f64);

impl DpiScale {
    /// The 96-DPI identity scale.
    pub const IDENTITY: DpiScale = DpiScale(1.0);

    /// Validates and wraps a raw scale factor.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDpiScale`] unless `factor` is finite
    /// and strictly positive.
    pub fn new(factor: f64) -> Result<Self, GeometryError> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(GeometryError::InvalidDpiScale(factor))
        }
    }

    /// Builds a scale from a raw DPI value (96 DPI = 1.0).
    ///
    /// A DPI of zero (reported by some virtual displays) maps to the identity
    /// scale.
    pub fn from_dpi(dpi: u32) -> Self {
        if dpi == 0 {
            Self::IDENTITY
        } else {
            Self(f64::from(dpi) / 96.0)
        }
    }

    /// The raw scale factor.
    pub fn factor(&self) -> f64 {
        self.0
    }

    /// Logical length → physical pixels, rounded to the nearest pixel.
    pub fn to_physical(&self, logical: f64) -> i32 {
        (logical * self.0).round() as i32
    }

    /// Physical pixels → logical length.
    pub fn to_logical(&self, physical: i32) -> f64 {
        f64::from(physical) / self.0
    }
}

impl Default for DpiScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Snapshot of the primary display.
///
/// Always read fresh from a screen geometry provider; never cache one across
/// calls because the monitor configuration can change at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    /// Physical pixels per logical unit.
    pub dpi_scale: DpiScale,
    /// Full physical bounds of the primary display.
    pub full_bounds: Rect,
    /// Physical bounds minus the bands reserved by other app bars.
    pub work_area: Rect,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
