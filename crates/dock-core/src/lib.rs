//! # dock-core
//!
//! Shared library for Sidebar-Dock containing the screen geometry types, the
//! dock/presentation domain values, and the wire contract spoken with the
//! shell's screen-reservation manager.
//!
//! It has zero dependencies on OS APIs or UI frameworks: everything here can
//! be compiled and tested on any platform.
//!
//! # Architecture overview (for beginners)
//!
//! Sidebar-Dock turns an ordinary top-level window into a panel attached to
//! the left or right edge of the primary display.  It can run in two modes:
//!
//! - **Floating** – the panel overlaps other windows and reserves nothing.
//! - **Docked** – the panel asks the shell to *reserve* a band of the screen
//!   (the same mechanism a taskbar uses) so maximised windows are laid out
//!   around it.
//!
//! This crate (`dock-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure geometry and dock rules: physical vs. logical
//!   rectangles, DPI scaling, the docked proposal / re-clamp arithmetic and
//!   the floating rectangle.
//!
//! - **`protocol`** – The message codes and data record exchanged with the
//!   reservation manager (`NEW`, `QUERYPOS`, `SETPOS`, `REMOVE`), plus the
//!   classifier that recognises the few window messages the dock reacts to.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `dock_core::Rect` instead of `dock_core::domain::geometry::Rect`.
pub use domain::dock::{
    docked_proposal, floating_rect, reclamp_opposite_edge, CompactState, DockEdge, Mode,
    ScreenEdge,
};
pub use domain::geometry::{
    DisplayMetrics, DpiScale, GeometryError, LogicalRect, Rect, WindowHandle,
};
pub use protocol::appbar::{AppBarData, AppBarMessage, AppBarNotification};
pub use protocol::window_message::{classify_window_message, WindowEvent};
