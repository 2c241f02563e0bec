//! Application layer use cases for the dock host.
//!
//! Everything here runs on the UI thread and talks to the OS only through
//! the port traits ([`screen_geometry::ScreenGeometryProvider`],
//! [`reservation_client::ReservationManager`], [`host_window::HostWindow`]).
//! The infrastructure layer supplies the Win32 and in-memory implementations.
//!
//! # Sub-modules
//!
//! - **`screen_geometry`** – Port for primary display bounds, work area and
//!   DPI scale.
//!
//! - **`reservation_client`** – The registration handshake with the shell's
//!   reservation manager, plus the process-wide callback message registry.
//!
//! - **`dock_controller`** – The Floating/Docked state machine.  Owns a
//!   reservation client only while docked and always has Floating as a safe
//!   fallback.
//!
//! - **`presentation`** – Compact/expanded toggle and transitions.
//!
//! - **`host_window`** – Port for the window being positioned.
//!
//! - **`sidebar`** – The orchestrator exposed to settings pages and the main
//!   window: mode, width, compact toggle, show/hide, and the message hook.

pub mod dock_controller;
pub mod host_window;
pub mod presentation;
pub mod reservation_client;
pub mod screen_geometry;
pub mod sidebar;
