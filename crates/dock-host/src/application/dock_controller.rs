//! DockController: the Floating/Docked state machine.
//!
//! # Transition table (for beginners)
//!
//! ```text
//! Floating ──set_mode(Docked)──> Docked        register; on failure stay Floating
//! Docked   ──set_mode(Floating)─> Floating     unregister + drop the client
//! Docked   ──PosChanged────────> Docked        re-commit; degenerate ⇒ Floating
//! either   ──set_width/set_edge─> same         Docked: re-commit, Floating: recompute
//! ```
//!
//! The controller starts Floating and owns a [`ReservationClient`] only while
//! Docked.  Every geometry change, including forced fallbacks, is announced to
//! subscribers as a [`DockEvent::ModeApplied`] carrying the mode that was
//! *actually* applied, which may differ from the one requested.
//!
//! # Re-dock hysteresis
//!
//! A forced fallback (rejection or degenerate rectangle) starts a cooldown.
//! `set_mode(Docked)` inside that window is refused with
//! [`DockError::CoolingDown`] so a shell that keeps returning an unusable
//! rectangle cannot make the panel flap between modes.  A zero cooldown
//! disables the check.
//!
//! # Released controllers
//!
//! After [`DockController::release`] the window is hidden.  Width, edge and
//! display changes still update the geometry but announce nothing until the
//! next [`DockController::set_mode`].

use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use dock_core::{
    floating_rect, AppBarNotification, DockEdge, GeometryError, LogicalRect, Mode, ScreenEdge,
    WindowHandle,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::reservation_client::{
    CallbackMessageRegistry, ReservationClient, ReservationError, ReservationEvent,
    ReservationManager,
};
use super::screen_geometry::ScreenGeometryProvider;

/// Default re-dock cooldown after a forced fallback.
pub const DEFAULT_REDOCK_COOLDOWN: Duration = Duration::from_secs(2);

// ── Errors and events ─────────────────────────────────────────────────────────

/// Outcome of a mode or geometry request that did not produce Docked.
///
/// None of these are fatal: the controller is always left in a usable mode.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DockError {
    /// The host window has no native handle yet; the request is kept and
    /// replayed by [`DockController::attach_window`].
    #[error("host window is not realised yet; request deferred")]
    NotReady,

    /// The reservation could not be made or kept; the controller fell back to
    /// Floating.
    #[error("fell back to floating: {cause}")]
    Fallback {
        #[source]
        cause: ReservationError,
    },

    /// A forced fallback happened too recently to retry docking.
    #[error("docking refused for another {remaining:?} after a forced fallback")]
    CoolingDown { remaining: Duration },

    /// Top or Bottom was requested.
    #[error(transparent)]
    EdgeUnsupported(#[from] GeometryError),

    /// A width that is not finite and positive; nothing changes.
    #[error("width must be finite and greater than zero, got {0}")]
    InvalidWidth(f64),
}

/// Checks a requested band width in logical units.
///
/// # Errors
///
/// [`DockError::InvalidWidth`] for NaN, infinite, zero or negative widths.
pub fn validate_width(width: f64) -> Result<f64, DockError> {
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(DockError::InvalidWidth(width))
    }
}

/// Why a request ended in Floating instead of Docked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCause {
    RegistrationRejected,
    DegenerateGeometry,
    CoolingDown,
}

/// Notification sent to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DockEvent {
    /// Geometry was committed.  `rect` is in logical units.
    ModeApplied {
        mode: Mode,
        rect: LogicalRect,
        fallback: Option<FallbackCause>,
    },
}

/// Construction parameters for [`DockController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockSettings {
    pub edge: DockEdge,
    /// Requested band width in logical units.
    pub width: f64,
    pub redock_cooldown: Duration,
}

impl Default for DockSettings {
    fn default() -> Self {
        Self {
            edge: DockEdge::Right,
            width: 320.0,
            redock_cooldown: DEFAULT_REDOCK_COOLDOWN,
        }
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// The Floating/Docked state machine for one host window.
pub struct DockController {
    manager: Rc<dyn ReservationManager>,
    geometry: Rc<dyn ScreenGeometryProvider>,
    registry: Rc<CallbackMessageRegistry>,

    mode: Mode,
    edge: DockEdge,
    width: f64,
    rect: LogicalRect,
    window: WindowHandle,

    /// Present only while Docked.
    client: Option<ReservationClient>,
    notices_tx: Sender<ReservationEvent>,
    notices_rx: Receiver<ReservationEvent>,
    observers: Vec<Sender<DockEvent>>,

    /// Mode requested before the window was realised.
    pending: Option<Mode>,
    last_fallback: Option<Instant>,
    redock_cooldown: Duration,
    /// Set by `release`, cleared by `set_mode`.
    released: bool,
}

impl DockController {
    /// Creates a controller in Floating mode.  No reservation is made until
    /// [`set_mode`](Self::set_mode) asks for Docked.
    pub fn new(
        manager: Rc<dyn ReservationManager>,
        geometry: Rc<dyn ScreenGeometryProvider>,
        registry: Rc<CallbackMessageRegistry>,
        settings: DockSettings,
    ) -> Self {
        let (notices_tx, notices_rx) = mpsc::channel();
        let mut controller = Self {
            manager,
            geometry,
            registry,
            mode: Mode::Floating,
            edge: settings.edge,
            width: settings.width,
            rect: LogicalRect::default(),
            window: WindowHandle::default(),
            client: None,
            notices_tx,
            notices_rx,
            observers: Vec::new(),
            pending: None,
            last_fallback: None,
            redock_cooldown: settings.redock_cooldown,
            released: false,
        };
        controller.rect = controller.floating_rect();
        controller
    }

    /// Registers a new observer of [`DockEvent`]s.
    pub fn subscribe(&mut self) -> Receiver<DockEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        rx
    }

    /// Supplies the host window's native handle and replays a request that
    /// was deferred with [`DockError::NotReady`].
    ///
    /// # Errors
    ///
    /// Returns the replayed request's error, if any.
    pub fn attach_window(&mut self, window: WindowHandle) -> Result<(), DockError> {
        if !window.is_valid() {
            return Ok(());
        }
        self.window = window;
        match self.pending.take() {
            Some(mode) => {
                debug!(?mode, "replaying deferred mode request");
                self.set_mode(mode).map(|_| ())
            }
            None => Ok(()),
        }
    }

    /// The mode actually in effect.
    pub fn current_mode(&self) -> Mode {
        self.mode
    }

    /// The authoritative window rectangle in logical units.
    pub fn current_rect(&self) -> LogicalRect {
        self.rect
    }

    pub fn edge(&self) -> DockEdge {
        self.edge
    }

    /// Requested width in logical units.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns `true` while a reservation is live.
    pub fn is_reserved(&self) -> bool {
        self.client.as_ref().is_some_and(ReservationClient::is_registered)
    }

    /// The process-wide callback message id, once one has been registered.
    pub fn callback_message(&self) -> Option<u32> {
        self.registry.get()
    }

    /// Where the window sits in Floating mode: flush to the edge of the
    /// current work area.
    pub fn floating_rect(&self) -> LogicalRect {
        floating_rect(self.edge, self.geometry.logical_work_area(), self.width)
    }

    /// Switches to `mode`.
    ///
    /// Requesting the mode already in effect does nothing.  Returns the
    /// committed rectangle.
    ///
    /// # Errors
    ///
    /// - [`DockError::NotReady`]: Docked was requested before the window was
    ///   realised; the request is replayed on [`attach_window`](Self::attach_window).
    /// - [`DockError::Fallback`]: registration failed; now Floating.
    /// - [`DockError::CoolingDown`]: a recent forced fallback blocks docking;
    ///   still Floating.
    pub fn set_mode(&mut self, mode: Mode) -> Result<LogicalRect, DockError> {
        self.released = false;
        match mode {
            Mode::Floating => {
                self.pending = None;
                if self.mode == Mode::Floating && self.client.is_none() {
                    self.rect = self.floating_rect();
                    return Ok(self.rect);
                }
                self.enter_floating(None);
                Ok(self.rect)
            }
            Mode::Docked => {
                if self.mode == Mode::Docked && self.is_reserved() {
                    return Ok(self.rect);
                }
                self.enter_docked()
            }
        }
    }

    /// Switches to the other mode.
    ///
    /// # Errors
    ///
    /// See [`set_mode`](Self::set_mode).
    pub fn toggle_mode(&mut self) -> Result<LogicalRect, DockError> {
        self.set_mode(self.mode.toggled())
    }

    /// Changes the requested width and re-applies the geometry.
    ///
    /// # Errors
    ///
    /// [`DockError::InvalidWidth`] (nothing changes), or
    /// [`DockError::Fallback`] if the re-commit fails while Docked.
    pub fn set_width(&mut self, width: f64) -> Result<LogicalRect, DockError> {
        let width = validate_width(width)?;
        self.width = width;
        if let Some(client) = self.client.as_mut() {
            client.set_width(width);
        }
        self.reapply()
    }

    /// Moves the band to another edge.
    ///
    /// # Errors
    ///
    /// [`DockError::EdgeUnsupported`] for Top/Bottom (nothing changes), or
    /// [`DockError::Fallback`] if the re-commit fails while Docked.
    pub fn set_edge(&mut self, edge: ScreenEdge) -> Result<LogicalRect, DockError> {
        let edge = DockEdge::try_from(edge)?;
        self.edge = edge;
        if let Some(client) = self.client.as_mut() {
            client
                .set_edge(edge.into())
                .map_err(|cause| DockError::Fallback { cause })?;
        }
        self.reapply()
    }

    /// Re-reserves the band at a new width: one `REMOVE`, then one fresh
    /// registration.  Used for the docked compact/expanded toggle, where
    /// resizing a live band would make the other bands reflow repeatedly.
    ///
    /// In Floating mode this is the same as [`set_width`](Self::set_width).
    ///
    /// # Errors
    ///
    /// [`DockError::InvalidWidth`] (nothing changes), or
    /// [`DockError::Fallback`] if the new registration fails.
    pub fn reregister_with_width(&mut self, width: f64) -> Result<LogicalRect, DockError> {
        let width = validate_width(width)?;
        let Some(client) = self.client.as_mut() else {
            return self.set_width(width);
        };
        self.width = width;
        client.unregister();
        let result = client.register(self.edge.into(), width);
        match result {
            Ok(_) => {
                self.drain_notices();
                self.emit(None);
                Ok(self.rect)
            }
            Err(cause) => Err(self.fallback(cause)),
        }
    }

    /// Reacts to a notification posted by the reservation manager.
    pub fn on_reservation_notice(&mut self, notification: AppBarNotification) {
        match notification {
            AppBarNotification::PosChanged if self.mode == Mode::Docked => {
                debug!("another band moved; re-committing");
                // A failure has already been turned into a fallback event.
                let _ = self.reapply();
            }
            AppBarNotification::FullScreenApp => {
                debug!("full-screen application state changed");
            }
            other => debug!(?other, "reservation notice ignored"),
        }
    }

    /// Re-applies the geometry after a resolution or DPI change.
    pub fn on_display_changed(&mut self) {
        info!(mode = ?self.mode, "display configuration changed");
        let _ = self.reapply();
    }

    /// Drops any reservation and returns to Floating without notifying
    /// subscribers.  Idempotent; also run on drop.
    pub fn release(&mut self) {
        self.released = true;
        self.pending = None;
        if let Some(mut client) = self.client.take() {
            client.unregister();
        }
        self.mode = Mode::Floating;
        self.rect = self.floating_rect();
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn enter_docked(&mut self) -> Result<LogicalRect, DockError> {
        if !self.window.is_valid() {
            debug!("docking deferred until the window is realised");
            self.pending = Some(Mode::Docked);
            return Err(DockError::NotReady);
        }

        if let Some(remaining) = self.cooldown_remaining() {
            info!(?remaining, "docking refused during re-dock cooldown");
            self.rect = self.floating_rect();
            self.emit(Some(FallbackCause::CoolingDown));
            return Err(DockError::CoolingDown { remaining });
        }

        let mut client = ReservationClient::new(
            Rc::clone(&self.manager),
            Rc::clone(&self.geometry),
            Rc::clone(&self.registry),
            self.notices_tx.clone(),
        );
        client.initialize(self.window);
        match client.register(self.edge.into(), self.width) {
            Ok(_) => {
                self.client = Some(client);
                self.mode = Mode::Docked;
                self.drain_notices();
                info!(edge = ?self.edge, width = self.width, "docked");
                self.emit(None);
                Ok(self.rect)
            }
            Err(cause) => {
                drop(client);
                Err(self.fallback(cause))
            }
        }
    }

    fn enter_floating(&mut self, cause: Option<FallbackCause>) {
        if let Some(mut client) = self.client.take() {
            client.unregister();
        }
        self.mode = Mode::Floating;
        self.rect = self.floating_rect();
        debug!(rect = ?self.rect, "floating");
        self.emit(cause);
    }

    /// Docked: re-commit; Floating: recompute.
    fn reapply(&mut self) -> Result<LogicalRect, DockError> {
        let Some(client) = self.client.as_mut() else {
            self.rect = self.floating_rect();
            self.emit(None);
            return Ok(self.rect);
        };
        if let Err(cause) = client.set_position() {
            return Err(self.fallback(cause));
        }
        self.drain_notices();
        if let Some(rect) = self.client.as_ref().and_then(ReservationClient::committed_rect) {
            if rect.is_degenerate() {
                return Err(self.fallback(ReservationError::DegenerateGeometry(rect)));
            }
        }
        self.emit(None);
        Ok(self.rect)
    }

    /// Pulls committed rectangles out of the client's notification channel.
    fn drain_notices(&mut self) {
        let scale = self.geometry.dpi_scale();
        while let Ok(ReservationEvent::PositionChanged { committed }) = self.notices_rx.try_recv()
        {
            self.rect = committed.to_logical(scale);
        }
    }

    fn fallback(&mut self, cause: ReservationError) -> DockError {
        let kind = match cause {
            ReservationError::DegenerateGeometry(_) => FallbackCause::DegenerateGeometry,
            _ => FallbackCause::RegistrationRejected,
        };
        warn!(error = %cause, "reservation unavailable; falling back to floating");
        // Stale notices from the failed client must not overwrite the
        // floating rectangle.
        while self.notices_rx.try_recv().is_ok() {}
        self.last_fallback = Some(Instant::now());
        self.enter_floating(Some(kind));
        DockError::Fallback { cause }
    }

    fn cooldown_remaining(&self) -> Option<Duration> {
        let at = self.last_fallback?;
        let remaining = self.redock_cooldown.checked_sub(at.elapsed())?;
        (!remaining.is_zero()).then_some(remaining)
    }

    fn emit(&mut self, fallback: Option<FallbackCause>) {
        if self.released {
            debug!(mode = ?self.mode, "released; geometry change not announced");
            return;
        }
        let event = DockEvent::ModeApplied {
            mode: self.mode,
            rect: self.rect,
            fallback,
        };
        self.observers.retain(|tx| tx.send(event).is_ok());
    }
}

impl Drop for DockController {
    fn drop(&mut self) {
        self.release();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
