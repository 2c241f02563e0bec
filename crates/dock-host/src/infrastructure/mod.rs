//! Infrastructure layer for the dock host.
//!
//! Contains the OS-facing adapters behind the application ports, their
//! in-memory doubles, and the preferences file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `dock_core`, but MUST NOT be imported by the `application` or domain
//! layers outside of tests.
//!
//! # Sub-modules
//!
//! - **`reservation`** – `ReservationManager` implementations.  On Windows
//!   the adapter forwards to `SHAppBarMessage`; `MockReservationManager`
//!   simulates the shell's band table in memory.
//!
//! - **`screen_geometry`** – Primary display bounds, work area and DPI.
//!   `GetSystemMetrics` / `SPI_GETWORKAREA` / `GetDpiForSystem` on Windows,
//!   a settable `MockScreenGeometry` everywhere.
//!
//! - **`host_window`** – `HostWindow` implementations: an `HWND` adapter on
//!   Windows and a `RecordingHostWindow` that logs every call.
//!
//! - **`storage`** – TOML preferences (`config.toml`).

pub mod host_window;
pub mod reservation;
pub mod screen_geometry;
pub mod storage;
