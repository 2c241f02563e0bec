//! dock-host library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does dock-host do? (for beginners)
//!
//! The host turns an ordinary top-level window into a panel attached to the
//! left or right edge of the primary display.  In **Docked** mode it asks the
//! shell to reserve a band of the screen, exactly like a taskbar does, so
//! maximised windows shrink to make room.  In **Floating** mode it simply sits
//! on top of other windows.
//!
//! The work is split into:
//!
//! 1. `ReservationClient` – the register → query → re-clamp → commit
//!    handshake with the shell's reservation manager.
//! 2. `DockController` – the Floating/Docked state machine with automatic
//!    fallback to Floating when the shell refuses or returns a useless
//!    rectangle.
//! 3. `PresentationController` – compact/expanded width toggle and the
//!    entrance, exit, and resize transitions.
//! 4. `SidebarWindow` – wires the three together with the host window and
//!    its message stream.

/// Application layer: dock use cases and the ports they depend on.
pub mod application;

/// Infrastructure layer: OS adapters, in-memory doubles, and config storage.
pub mod infrastructure;
