//! Domain entities for Sidebar-Dock.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.  Nothing in here talks to the shell, reads the monitor
//! configuration, or moves a window; it only answers questions such as
//! "given these screen bounds and this DPI scale, which rectangle should a
//! 320-unit band on the right edge occupy?".
//!
//! Code in the outer layers (the `dock-host` application and infrastructure
//! layers) depends on the domain, but the domain never depends on them.

/// Physical and logical rectangles, DPI scale, and window handles.
pub mod geometry;

/// Dock modes, edges, compact state, and the dock layout arithmetic.
///
/// See [`dock::docked_proposal`] and [`dock::reclamp_opposite_edge`] for the
/// core of the negotiation with the reservation manager.
pub mod dock;
