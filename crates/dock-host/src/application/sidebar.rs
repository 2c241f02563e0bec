//! SidebarWindow: the entry point settings pages and the main window use.
//!
//! Owns the host window, the [`DockController`], and the
//! [`PresentationController`], and keeps them consistent:
//!
//! - mode changes go through the dock and are then applied to the window;
//! - `show()`/`hide()` play the entrance and exit transitions;
//! - `hide()` always releases the reservation, and `show()` re-applies the
//!   mode the user asked for;
//! - the host's message stream is fed to
//!   [`handle_window_message`](SidebarWindow::handle_window_message).
//!
//! Failures never escape as errors.  Each method returns the mode actually
//! in effect, and every fallback is also published as a
//! [`DockEvent::ModeApplied`].

use std::sync::mpsc::Receiver;
use std::time::Duration;

use dock_core::{classify_window_message, DockEdge, Mode, ScreenEdge, WindowEvent};
use tracing::{debug, info, warn};

use super::dock_controller::{DockController, DockError, DockEvent};
use super::host_window::HostWindow;
use super::presentation::{PresentationController, TransitionKind};

/// The docked panel, ready to be driven by the UI thread.
pub struct SidebarWindow<H: HostWindow> {
    host: H,
    dock: DockController,
    presentation: PresentationController,
    /// What the user asked for; may differ from the dock's actual mode.
    requested_mode: Mode,
    visible: bool,
    closed: bool,
}

impl<H: HostWindow> SidebarWindow<H> {
    pub fn new(
        host: H,
        mut dock: DockController,
        presentation: PresentationController,
        requested_mode: Mode,
    ) -> Self {
        // Starts hidden: nothing is announced before the first show.
        dock.release();
        Self {
            host,
            dock,
            presentation,
            requested_mode,
            visible: false,
            closed: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn dock(&self) -> &DockController {
        &self.dock
    }

    pub fn presentation(&self) -> &PresentationController {
        &self.presentation
    }

    /// Subscribes to [`DockEvent`]s, e.g. to persist the applied mode.
    pub fn subscribe(&mut self) -> Receiver<DockEvent> {
        self.dock.subscribe()
    }

    pub fn current_mode(&self) -> Mode {
        self.dock.current_mode()
    }

    pub fn requested_mode(&self) -> Mode {
        self.requested_mode
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_compact(&self) -> bool {
        self.presentation.is_compact()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Called once the OS window exists.  Replays a deferred dock request.
    pub fn on_window_realized(&mut self) {
        let handle = self.host.native_handle();
        let result = self.dock.attach_window(handle);
        self.report(result);
        self.presentation.apply_committed(&self.dock, &mut self.host);
    }

    /// Requests `mode`.  While hidden the request is only recorded and
    /// applied on the next [`show`](Self::show).
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        if self.closed {
            return self.dock.current_mode();
        }
        info!(?mode, "mode requested");
        self.requested_mode = mode;
        if !self.visible {
            return self.dock.current_mode();
        }
        let result = self.dock.set_mode(mode).map(|_| ());
        self.report(result);
        self.presentation.apply_committed(&self.dock, &mut self.host);
        self.dock.current_mode()
    }

    /// Flips the mode in effect, or the recorded request while hidden.
    pub fn toggle_mode(&mut self) -> Mode {
        let from = if self.visible {
            self.dock.current_mode()
        } else {
            self.requested_mode
        };
        self.set_mode(from.toggled())
    }

    /// Sets the width of the current compact/expanded state.  Widths that
    /// are not finite and positive are ignored.
    pub fn set_width(&mut self, width: f64) -> Mode {
        let result = self
            .presentation
            .set_width(width, &mut self.dock, &mut self.host);
        self.report(result);
        self.dock.current_mode()
    }

    /// Moves the panel to another edge.  Top and Bottom are rejected and
    /// leave everything unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DockError::EdgeUnsupported`] for Top/Bottom.
    pub fn set_edge(&mut self, edge: ScreenEdge) -> Result<DockEdge, DockError> {
        match self.dock.set_edge(edge) {
            Err(e @ DockError::EdgeUnsupported(_)) => return Err(e),
            other => self.report(other.map(|_| ())),
        }
        self.presentation.apply_committed(&self.dock, &mut self.host);
        Ok(self.dock.edge())
    }

    /// Flips compact/expanded.  Returns the new compact flag.
    pub fn toggle_compact(&mut self) -> bool {
        let result = self
            .presentation
            .toggle_compact(&mut self.dock, &mut self.host)
            .map(|_| ());
        self.report(result);
        self.presentation.is_compact()
    }

    /// Shows the window and applies the requested mode.
    ///
    /// Registration needs a realised window, so the window is first placed
    /// at the floating rectangle and made visible, then the mode is applied
    /// and the entrance played at the final geometry.
    pub fn show(&mut self) -> Mode {
        if self.closed || self.visible {
            return self.dock.current_mode();
        }
        self.host.set_bounds(self.dock.floating_rect());
        self.host.set_visible(true);
        self.visible = true;

        let handle = self.host.native_handle();
        let attached = self.dock.attach_window(handle);
        self.report(attached);
        let applied = self.dock.set_mode(self.requested_mode).map(|_| ());
        self.report(applied);

        self.presentation.entrance(&self.dock, &mut self.host);
        info!(mode = ?self.dock.current_mode(), "sidebar shown");
        self.dock.current_mode()
    }

    /// Releases any reservation and hides the window.
    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        let mode = self.dock.current_mode();
        self.dock.release();
        self.visible = false;
        if !self.presentation.exit(mode, self.dock.edge(), &mut self.host) {
            self.host.set_visible(false);
        }
        info!(?mode, "sidebar hidden");
    }

    /// Emergency path: releases the reservation and hides the window at
    /// once.  Never fails; safe to call repeatedly.
    pub fn force_close(&mut self) {
        if self.closed {
            return;
        }
        warn!("force closing sidebar");
        self.shutdown();
    }

    /// Orderly close: same release sequence as [`force_close`](Self::force_close)
    /// without the warning.  The window cannot be shown again.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        info!("closing sidebar");
        self.shutdown();
    }

    /// Feeds one message from the host's window procedure.
    ///
    /// Returns `true` if the message was one the dock handles.
    pub fn handle_window_message(&mut self, message: u32, wparam: usize) -> bool {
        let Some(event) = classify_window_message(message, wparam, self.dock.callback_message())
        else {
            return false;
        };
        debug!(?event, "window message");
        match event {
            WindowEvent::Reservation(notification) => {
                self.dock.on_reservation_notice(notification);
            }
            WindowEvent::DisplayChanged | WindowEvent::DpiChanged => {
                self.dock.on_display_changed();
            }
        }
        self.presentation.apply_committed(&self.dock, &mut self.host);
        true
    }

    /// Advances transitions by `dt`.  Hides the window when an exit
    /// transition completes.
    pub fn tick(&mut self, dt: Duration) {
        if self.presentation.tick(dt, &mut self.host) == Some(TransitionKind::Exit) {
            self.host.set_visible(false);
        }
    }

    fn shutdown(&mut self) {
        self.dock.release();
        self.presentation.cancel();
        self.host.set_visible(false);
        self.visible = false;
        self.closed = true;
    }

    fn report(&self, result: Result<(), DockError>) {
        match result {
            Ok(()) => {}
            Err(DockError::NotReady) => debug!("dock request deferred until realised"),
            Err(e) => warn!(error = %e, mode = ?self.dock.current_mode(), "dock request not satisfied"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
