//! Integration tests for the dock-core geometry arithmetic.
//!
//! These tests sweep the public API across the display scales and widths the
//! dock actually meets, checking the invariants the host relies on: exact
//! width after re-clamp and loss-free physical ↔ logical conversion.

use dock_core::{
    docked_proposal, reclamp_opposite_edge, DockEdge, DpiScale, LogicalRect, Rect,
};

const SCALES: [f64; 4] = [1.0, 1.25, 1.5, 2.0];

#[test]
fn test_reclamp_preserves_width_for_any_near_edge_shrink() {
    let full = Rect::new(0, 0, 1920, 1080);
    for edge in [DockEdge::Left, DockEdge::Right] {
        for shrink in [0, 1, 16, 40, 100] {
            for width in [shrink + 1, 60, 320, 640] {
                // Arrange: manager pulls the near edge inward by `shrink` px
                let proposal = docked_proposal(edge, width, full);
                let negotiated = match edge {
                    DockEdge::Right => Rect {
                        right: proposal.right - shrink,
                        ..proposal
                    },
                    DockEdge::Left => Rect {
                        left: proposal.left + shrink,
                        ..proposal
                    },
                };

                // Act
                let committed = reclamp_opposite_edge(edge, negotiated, width);

                // Assert
                assert_eq!(
                    committed.width(),
                    width,
                    "edge={edge:?} shrink={shrink} width={width}"
                );
                assert_eq!(committed.height(), 1080);
            }
        }
    }
}

#[test]
fn test_physical_rect_survives_logical_round_trip_within_one_pixel() {
    let rects = [
        Rect::new(1600, 0, 1920, 1080),
        Rect::new(1560, 0, 1880, 1080),
        Rect::new(0, 0, 60, 1040),
        Rect::new(2477, 13, 2877, 1427),
        Rect::new(-1920, 0, -1600, 1200),
    ];
    for factor in SCALES {
        let scale = DpiScale::new(factor).expect("valid scale");
        for rect in rects {
            let back = rect.to_logical(scale).to_physical(scale);
            for (a, b) in [
                (rect.left, back.left),
                (rect.top, back.top),
                (rect.right, back.right),
                (rect.bottom, back.bottom),
            ] {
                assert!(
                    (a - b).abs() <= 1,
                    "scale={factor} rect={rect:?} reconstructed={back:?}"
                );
            }
        }
    }
}

#[test]
fn test_logical_width_times_scale_equals_physical_width() {
    for factor in SCALES {
        let scale = DpiScale::new(factor).expect("valid scale");
        let physical = Rect::new(1500, 0, 1900, 1000);
        let logical: LogicalRect = physical.to_logical(scale);
        let reconstructed = logical.width * factor;
        assert!((reconstructed - 400.0).abs() <= 1.0, "scale={factor}");
    }
}

#[test]
fn test_edge_swap_scenario_commits_expected_rectangle() {
    // Right edge, 320 px, 1920×1080, manager returns the proposal unchanged.
    let proposal = docked_proposal(DockEdge::Right, 320, Rect::new(0, 0, 1920, 1080));
    let committed = reclamp_opposite_edge(DockEdge::Right, proposal, 320);
    assert_eq!(committed, Rect::new(1600, 0, 1920, 1080));
}
