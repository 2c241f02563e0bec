//! Dock modes, edges, compact state, and the dock layout arithmetic.
//!
//! # The negotiation in one picture (for beginners)
//!
//! Docking on the right edge of a 1920×1080 display with a 320-pixel band:
//!
//! ```text
//!  proposal            manager's answer         re-clamped (committed)
//!  ┌────────┬───┐      ┌───────┬───┬─┐          ┌──────┬───┬─┐
//!  │        │   │      │       │   │T│          │      │   │T│
//!  │        │320│  →   │       │280│ │    →     │      │320│ │
//!  │        │   │      │       │   │ │          │      │   │ │
//!  └────────┴───┘      └───────┴───┴─┘          └──────┴───┴─┘
//!  left=1600           right moved to 1880       left=1560, right=1880
//! ```
//!
//! The manager may only move the *near* edge (the one touching the screen
//! border) inward to avoid another reserved band `T`.  The client then moves
//! the *opposite* edge by the same amount so the band keeps its exact width.

use serde::{Deserialize, Serialize};

use super::geometry::{GeometryError, LogicalRect, Rect};

/// Presentation mode of the panel.  Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Overlays other content; reserves no screen space.
    #[default]
    Floating,
    /// Reserves a band of the screen through the reservation manager.
    Docked,
}

impl Mode {
    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            Mode::Floating => Mode::Docked,
            Mode::Docked => Mode::Floating,
        }
    }
}

/// Any of the four screen edges, as understood by the reservation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenEdge {
    Left,
    Top,
    Right,
    Bottom,
}

/// The screen edges a dock band may attach to.
///
/// Top and Bottom are deliberately unrepresentable; converting them with
/// [`DockEdge::try_from`] fails with [`GeometryError::EdgeUnsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockEdge {
    Left,
    #[default]
    Right,
}

impl TryFrom<ScreenEdge> for DockEdge {
    type Error = GeometryError;

    fn try_from(edge: ScreenEdge) -> Result<Self, Self::Error> {
        match edge {
            ScreenEdge::Left => Ok(DockEdge::Left),
            ScreenEdge::Right => Ok(DockEdge::Right),
            other => Err(GeometryError::EdgeUnsupported(other)),
        }
    }
}

impl From<DockEdge> for ScreenEdge {
    fn from(edge: DockEdge) -> Self {
        match edge {
            DockEdge::Left => ScreenEdge::Left,
            DockEdge::Right => ScreenEdge::Right,
        }
    }
}

/// Compact/expanded width toggle.
///
/// Purely a presentation value: the reservation contract only ever sees the
/// resulting width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactState {
    pub is_compact: bool,
    /// Width in logical units while expanded.
    pub expanded_width: f64,
    /// Width in logical units while compact.
    pub compact_width: f64,
}

impl CompactState {
    pub fn new(expanded_width: f64, compact_width: f64) -> Self {
        Self {
            is_compact: false,
            expanded_width,
            compact_width,
        }
    }

    /// The width that applies to the current state.
    pub fn current_width(&self) -> f64 {
        if self.is_compact {
            self.compact_width
        } else {
            self.expanded_width
        }
    }

    /// Flips the state and returns the new target width.
    pub fn toggle(&mut self) -> f64 {
        self.is_compact = !self.is_compact;
        self.current_width()
    }
}

/// Builds the rectangle submitted with `QUERYPOS`: full height of `full_bounds`,
/// flush to `edge`, exactly `physical_width` wide.
///
/// Coordinates saturate at the `i32` range instead of overflowing.
pub fn docked_proposal(edge: DockEdge, physical_width: i32, full_bounds: Rect) -> Rect {
    match edge {
        DockEdge::Right => Rect::new(
            full_bounds.right.saturating_sub(physical_width),
            full_bounds.top,
            full_bounds.right,
            full_bounds.bottom,
        ),
        DockEdge::Left => Rect::new(
            full_bounds.left,
            full_bounds.top,
            full_bounds.left.saturating_add(physical_width),
            full_bounds.bottom,
        ),
    }
}

/// Restores the requested width after the manager's counter-proposal by
/// moving the edge opposite to `edge`.
///
/// The near edge, top and bottom chosen by the manager are kept as-is.
pub fn reclamp_opposite_edge(edge: DockEdge, negotiated: Rect, physical_width: i32) -> Rect {
    match edge {
        DockEdge::Right => Rect {
            left: negotiated.right.saturating_sub(physical_width),
            ..negotiated
        },
        DockEdge::Left => Rect {
            right: negotiated.left.saturating_add(physical_width),
            ..negotiated
        },
    }
}

/// Floating-mode placement: flush to `edge` of the work area, top-aligned,
/// full work-area height, `width` wide.
pub fn floating_rect(edge: DockEdge, work_area: LogicalRect, width: f64) -> LogicalRect {
    let x = match edge {
        DockEdge::Right => work_area.right() - width,
        DockEdge::Left => work_area.x,
    };
    LogicalRect::new(x, work_area.y, width, work_area.height)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: Rect = Rect::new(0, 0, 1920, 1080);

    #[test]
    fn test_mode_default_is_floating() {
        assert_eq!(Mode::default(), Mode::Floating);
    }

    #[test]
    fn test_mode_toggled_flips_between_modes() {
        assert_eq!(Mode::Floating.toggled(), Mode::Docked);
        assert_eq!(Mode::Docked.toggled(), Mode::Floating);
    }

    #[test]
    fn test_dock_edge_try_from_rejects_top_and_bottom() {
        assert_eq!(
            DockEdge::try_from(ScreenEdge::Top),
            Err(GeometryError::EdgeUnsupported(ScreenEdge::Top))
        );
        assert_eq!(
            DockEdge::try_from(ScreenEdge::Bottom),
            Err(GeometryError::EdgeUnsupported(ScreenEdge::Bottom))
        );
        assert_eq!(DockEdge::try_from(ScreenEdge::Left), Ok(DockEdge::Left));
        assert_eq!(DockEdge::try_from(ScreenEdge::Right), Ok(DockEdge::Right));
    }

    #[test]
    fn test_docked_proposal_on_right_edge_is_flush_and_full_height() {
        let rect = docked_proposal(DockEdge::Right, 320, FULL_HD);
        assert_eq!(rect, Rect::new(1600, 0, 1920, 1080));
    }

    #[test]
    fn test_docked_proposal_on_left_edge_starts_at_screen_left() {
        let rect = docked_proposal(DockEdge::Left, 320, FULL_HD);
        assert_eq!(rect, Rect::new(0, 0, 320, 1080));
    }

    #[test]
    fn test_reclamp_right_edge_moves_left_to_preserve_width() {
        // Arrange: manager moved the right edge inward by 40 px
        let negotiated = Rect::new(1600, 0, 1880, 1080);

        // Act
        let committed = reclamp_opposite_edge(DockEdge::Right, negotiated, 320);

        // Assert
        assert_eq!(committed, Rect::new(1560, 0, 1880, 1080));
        assert_eq!(committed.width(), 320);
    }

    #[test]
    fn test_reclamp_left_edge_moves_right_to_preserve_width() {
        let negotiated = Rect::new(48, 0, 320, 1040);
        let committed = reclamp_opposite_edge(DockEdge::Left, negotiated, 320);
        assert_eq!(committed, Rect::new(48, 0, 368, 1040));
    }

    #[test]
    fn test_oversized_width_saturates_instead_of_overflowing() {
        let huge = i32::MAX;
        let proposal = docked_proposal(DockEdge::Right, huge, Rect::new(-10, 0, 1920, 1080));
        assert_eq!(proposal.left, 1920 - i32::MAX);

        let left = docked_proposal(DockEdge::Left, huge, Rect::new(10, 0, 1920, 1080));
        assert_eq!(left.right, i32::MAX);

        let reclamped = reclamp_opposite_edge(DockEdge::Right, Rect::new(0, 0, -10, 1080), huge);
        assert_eq!(reclamped.left, i32::MIN);
    }

    #[test]
    fn test_floating_rect_right_edge_is_flush_with_work_area() {
        let work_area = LogicalRect::new(0.0, 0.0, 1920.0, 1040.0);
        let rect = floating_rect(DockEdge::Right, work_area, 320.0);
        assert_eq!(rect, LogicalRect::new(1600.0, 0.0, 320.0, 1040.0));
    }

    #[test]
    fn test_floating_rect_left_edge_respects_work_area_offset() {
        // A vertical taskbar on the left pushes the work area to x = 48.
        let work_area = LogicalRect::new(48.0, 0.0, 1872.0, 1080.0);
        let rect = floating_rect(DockEdge::Left, work_area, 60.0);
        assert_eq!(rect, LogicalRect::new(48.0, 0.0, 60.0, 1080.0));
    }

    #[test]
    fn test_compact_state_toggle_returns_new_target_width() {
        let mut state = CompactState::new(320.0, 60.0);
        assert_eq!(state.current_width(), 320.0);
        assert_eq!(state.toggle(), 60.0);
        assert!(state.is_compact);
        assert_eq!(state.toggle(), 320.0);
        assert!(!state.is_compact);
    }
}
