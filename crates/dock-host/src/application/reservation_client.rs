//! ReservationClient: the register → negotiate → commit handshake with the
//! shell's screen-reservation manager.
//!
//! # Protocol walk-through (for beginners)
//!
//! A reservation is a band of the screen that the shell keeps free of other
//! windows.  Getting one takes four calls (see `dock_core::protocol::appbar`):
//!
//! ```text
//! ReservationClient                          ReservationManager
//! ───────────────────────────────────────────────────────────────
//! NEW      (window, callback id)      ──>    remembers the window
//! QUERYPOS (full-height candidate)    ──>    moves the near edge inward
//!          <── adjusted rectangle             if another band is in the way
//! (re-clamp opposite edge to keep the exact width)
//! SETPOS   (final rectangle)          ──>    reserves the band
//! ...
//! REMOVE   (window)                   ──>    band released
//! ```
//!
//! Every OS failure is converted into a [`ReservationError`] at this layer;
//! nothing here panics, and the caller always has Floating mode to fall back
//! to.
//!
//! # Ownership rules
//!
//! - At most one live registration per client.  [`ReservationClient::register`]
//!   is the only path that creates one and always retires the previous one
//!   first.
//! - [`ReservationClient::unregister`] is idempotent and is also run from
//!   `Drop`, so a client can never leak its band by going out of scope.

use std::cell::OnceCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use dock_core::protocol::appbar::CALLBACK_MESSAGE_NAME;
use dock_core::{
    docked_proposal, reclamp_opposite_edge, AppBarData, AppBarMessage, DockEdge, GeometryError,
    LogicalRect, Rect, ScreenEdge, WindowHandle,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::screen_geometry::ScreenGeometryProvider;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure reported by a [`ReservationManager`] implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ManagerError {
    /// The manager answered the message with a refusal (e.g. `NEW` returned
    /// FALSE because of policy or resource limits).
    #[error("reservation manager refused {0:?}")]
    Refused(AppBarMessage),

    /// The underlying OS call failed.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Outcome of a failed reservation operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReservationError {
    /// The host window has no valid native handle yet.
    #[error("host window is not realised yet")]
    NotReady,

    /// The manager refused to register or position the band.
    #[error("reservation rejected: {0}")]
    RegistrationRejected(#[source] ManagerError),

    /// The committed rectangle has a non-positive width or height.
    #[error("reservation manager committed a degenerate rectangle {0:?}")]
    DegenerateGeometry(Rect),

    /// Top or Bottom was requested.
    #[error(transparent)]
    EdgeUnsupported(#[from] GeometryError),
}

// ── Ports ─────────────────────────────────────────────────────────────────────

/// Capability interface over the shell's reservation manager.
///
/// The Win32 adapter forwards to `SHAppBarMessage`; the in-memory double
/// records every call so tests can count `NEW` versus `REMOVE`.
pub trait ReservationManager {
    /// Obtains the system-wide message id registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Platform`] if the OS cannot allocate an id.
    fn register_callback_message(&self, name: &str) -> Result<u32, ManagerError>;

    /// Sends one of the four contract messages.  The manager may rewrite
    /// `data.rect` for `QUERYPOS` and `SETPOS`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Refused`] when the manager rejects the message.
    fn send(&self, message: AppBarMessage, data: &mut AppBarData) -> Result<(), ManagerError>;
}

/// Notification emitted after every successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationEvent {
    /// A rectangle (physical pixels) has just been committed.
    PositionChanged { committed: Rect },
}

// ── Process-wide callback message id ──────────────────────────────────────────

/// Holds the process-wide callback message id.
///
/// The id is obtained from the manager on first use and never released.
/// One registry is created per process and shared (via `Rc`) by every
/// [`ReservationClient`]; since all clients live on the UI thread, a plain
/// [`OnceCell`] is enough.
#[derive(Debug, Default)]
pub struct CallbackMessageRegistry {
    id: OnceCell<u32>,
}

impl CallbackMessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id, if a registration has already obtained it.
    pub fn get(&self) -> Option<u32> {
        self.id.get().copied()
    }

    /// Returns the id, registering it with `manager` the first time.
    ///
    /// # Errors
    ///
    /// Propagates the manager's failure; nothing is cached in that case so the
    /// next call retries.
    pub fn get_or_register(&self, manager: &dyn ReservationManager) -> Result<u32, ManagerError> {
        if let Some(id) = self.id.get() {
            return Ok(*id);
        }
        let id = manager.register_callback_message(CALLBACK_MESSAGE_NAME)?;
        debug!(id, "callback message registered");
        Ok(*self.id.get_or_init(|| id))
    }
}

// ── Reservation client ────────────────────────────────────────────────────────

/// Identity of one live registration.
///
/// Deliberately neither `Clone` nor `Copy`: exactly one exists per
/// registration and it is owned by the client that created it.
#[derive(Debug)]
struct ReservationHandle {
    data: AppBarData,
    edge: DockEdge,
}

/// Performs the reservation handshake for one host window.
pub struct ReservationClient {
    manager: Rc<dyn ReservationManager>,
    geometry: Rc<dyn ScreenGeometryProvider>,
    registry: Rc<CallbackMessageRegistry>,
    events: Sender<ReservationEvent>,
    window: Option<WindowHandle>,
    edge: DockEdge,
    /// Requested width in logical units.
    width: f64,
    handle: Option<ReservationHandle>,
    /// Last committed rectangle; survives `unregister`.
    committed: Option<Rect>,
}

impl ReservationClient {
    /// Creates an unbound client.  Call [`initialize`](Self::initialize)
    /// before registering.
    pub fn new(
        manager: Rc<dyn ReservationManager>,
        geometry: Rc<dyn ScreenGeometryProvider>,
        registry: Rc<CallbackMessageRegistry>,
        events: Sender<ReservationEvent>,
    ) -> Self {
        Self {
            manager,
            geometry,
            registry,
            events,
            window: None,
            edge: DockEdge::default(),
            width: 0.0,
            handle: None,
            committed: None,
        }
    }

    /// Binds the client to a native window handle.
    ///
    /// An invalid (zero) handle leaves the client unbound; call again once the
    /// window has been realised.  Until then every operation that needs the
    /// window fails with [`ReservationError::NotReady`].
    pub fn initialize(&mut self, window: WindowHandle) {
        if window.is_valid() {
            self.window = Some(window);
        } else {
            debug!("window not realised yet; reservation binding deferred");
        }
    }

    /// Returns `true` once bound to a valid window.
    pub fn is_ready(&self) -> bool {
        self.window.is_some()
    }

    /// Returns `true` while a registration is live.
    pub fn is_registered(&self) -> bool {
        self.handle.is_some()
    }

    pub fn edge(&self) -> DockEdge {
        self.edge
    }

    /// Requested width in logical units.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Changes the requested width; takes effect at the next commit.
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Changes the edge; takes effect at the next commit.
    ///
    /// # Errors
    ///
    /// Fails fast with [`ReservationError::EdgeUnsupported`] for Top/Bottom.
    pub fn set_edge(&mut self, edge: ScreenEdge) -> Result<(), ReservationError> {
        self.edge = DockEdge::try_from(edge)?;
        Ok(())
    }

    /// Registers the window and commits a band of `width` logical units on
    /// `edge`.
    ///
    /// Any previous registration is removed first, so repeated calls never
    /// stack bands.  Returns the committed rectangle in physical pixels.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::EdgeUnsupported`] before anything is sent.
    /// - [`ReservationError::NotReady`] if no valid window is bound.
    /// - [`ReservationError::RegistrationRejected`] if the manager refuses.
    /// - [`ReservationError::DegenerateGeometry`] if the commit is unusable.
    ///
    /// On every error the client is left unregistered.
    pub fn register(&mut self, edge: ScreenEdge, width: f64) -> Result<Rect, ReservationError> {
        let edge = DockEdge::try_from(edge)?;
        let window = self.window.ok_or(ReservationError::NotReady)?;

        if self.handle.is_some() {
            self.unregister();
        }
        self.edge = edge;
        self.width = width;

        let callback_message = self
            .registry
            .get_or_register(self.manager.as_ref())
            .map_err(ReservationError::RegistrationRejected)?;

        let mut data = AppBarData::new(window, callback_message);
        data.edge = edge.into();
        self.manager
            .send(AppBarMessage::New, &mut data)
            .map_err(|e| {
                warn!(error = %e, "reservation manager refused registration");
                ReservationError::RegistrationRejected(e)
            })?;
        self.handle = Some(ReservationHandle { data, edge });
        info!(?edge, width, "registered with reservation manager");

        match self.commit() {
            Ok(rect) => Ok(rect),
            Err(e) => {
                self.unregister();
                Err(e)
            }
        }
    }

    /// Recomputes and recommits the band without re-registering.
    ///
    /// Used when the width, the edge, or the display metrics change while
    /// docked.  Does nothing if not registered.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::RegistrationRejected`] or
    /// [`ReservationError::DegenerateGeometry`]; the registration itself is
    /// kept so the caller decides whether to release it.
    pub fn set_position(&mut self) -> Result<(), ReservationError> {
        if self.handle.is_none() {
            return Ok(());
        }
        self.commit().map(|_| ())
    }

    /// Last committed rectangle converted to logical units with the *current*
    /// DPI scale, or `None` if nothing has been committed yet.
    pub fn reserved_rect(&self) -> Option<LogicalRect> {
        self.committed
            .map(|rect| rect.to_logical(self.geometry.dpi_scale()))
    }

    /// Last committed rectangle in physical pixels.
    pub fn committed_rect(&self) -> Option<Rect> {
        self.committed
    }

    /// Releases the band.  Safe to call when not registered.
    ///
    /// The local registration is dropped even if the manager reports an
    /// error: the handle must not outlive a `REMOVE` attempt.
    pub fn unregister(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        match self.manager.send(AppBarMessage::Remove, &mut handle.data) {
            Ok(()) => info!(edge = ?handle.edge, "reservation released"),
            Err(e) => warn!(error = %e, "REMOVE failed; reservation dropped locally"),
        }
    }

    /// QUERYPOS → re-clamp → SETPOS for the current edge and width.
    fn commit(&mut self) -> Result<Rect, ReservationError> {
        let metrics = self.geometry.display_metrics();
        let physical_width = metrics.dpi_scale.to_physical(self.width);
        let edge = self.edge;
        let Some(handle) = self.handle.as_mut() else {
            return Err(ReservationError::NotReady);
        };

        handle.edge = edge;
        handle.data.edge = edge.into();
        handle.data.rect = docked_proposal(edge, physical_width, metrics.full_bounds);
        debug!(
            dpi_scale = metrics.dpi_scale.factor(),
            logical_width = self.width,
            physical_width,
            proposal = ?handle.data.rect,
            "querying position"
        );

        self.manager
            .send(AppBarMessage::QueryPos, &mut handle.data)
            .map_err(ReservationError::RegistrationRejected)?;
        handle.data.rect = reclamp_opposite_edge(edge, handle.data.rect, physical_width);
        self.manager
            .send(AppBarMessage::SetPos, &mut handle.data)
            .map_err(ReservationError::RegistrationRejected)?;

        let committed = handle.data.rect;
        self.committed = Some(committed);
        if committed.is_degenerate() {
            return Err(ReservationError::DegenerateGeometry(committed));
        }
        debug!(?committed, "reservation committed");

        // The controller owns the receiver; if it has gone away there is no
        // one left to notify.
        let _ = self
            .events
            .send(ReservationEvent::PositionChanged { committed });
        Ok(committed)
    }
}

impl Drop for ReservationClient {
    fn drop(&mut self) {
        self.unregister();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use dock_core::DpiScale;

    use super::*;
    use crate::infrastructure::reservation::MockReservationManager;
    use crate::infrastructure::screen_geometry::MockScreenGeometry;

    struct Fixture {
        manager: Rc<MockReservationManager>,
        geometry: Rc<MockScreenGeometry>,
        registry: Rc<CallbackMessageRegistry>,
        events: Receiver<ReservationEvent>,
        client: ReservationClient,
    }

    fn fixture() -> Fixture {
        let manager = Rc::new(MockReservationManager::new());
        let geometry = Rc::new(MockScreenGeometry::single_1080p());
        let registry = Rc::new(CallbackMessageRegistry::new());
        let (tx, rx) = mpsc::channel();
        let mut client = ReservationClient::new(
            Rc::clone(&manager) as Rc<dyn ReservationManager>,
            Rc::clone(&geometry) as Rc<dyn ScreenGeometryProvider>,
            Rc::clone(&registry),
            tx,
        );
        client.initialize(WindowHandle(0x100));
        Fixture {
            manager,
            geometry,
            registry,
            events: rx,
            client,
        }
    }

    #[test]
    fn test_register_before_initialize_fails_with_not_ready() {
        // Arrange
        let manager = Rc::new(MockReservationManager::new());
        let (tx, _rx) = mpsc::channel();
        let mut client = ReservationClient::new(
            Rc::clone(&manager) as Rc<dyn ReservationManager>,
            Rc::new(MockScreenGeometry::single_1080p()),
            Rc::new(CallbackMessageRegistry::new()),
            tx,
        );
        client.initialize(WindowHandle(0));

        // Act
        let result = client.register(ScreenEdge::Right, 320.0);

        // Assert
        assert_eq!(result, Err(ReservationError::NotReady));
        assert_eq!(manager.count(AppBarMessage::New), 0);
    }

    #[test]
    fn test_register_on_right_edge_commits_flush_band() {
        // Arrange
        let mut f = fixture();

        // Act
        let committed = f.client.register(ScreenEdge::Right, 320.0).unwrap();

        // Assert
        assert_eq!(committed, Rect::new(1600, 0, 1920, 1080));
        assert!(f.client.is_registered());
        assert_eq!(
            f.manager.log(),
            vec![
                AppBarMessage::New,
                AppBarMessage::QueryPos,
                AppBarMessage::SetPos
            ]
        );
    }

    #[test]
    fn test_register_with_manager_shrink_preserves_width() {
        // Arrange: manager pulls the right edge in to 1880
        let mut f = fixture();
        f.manager.set_near_edge_inset(40);

        // Act
        let committed = f.client.register(ScreenEdge::Right, 320.0).unwrap();

        // Assert
        assert_eq!(committed, Rect::new(1560, 0, 1880, 1080));
    }

    #[test]
    fn test_register_top_edge_fails_fast_without_contacting_manager() {
        let mut f = fixture();
        let result = f.client.register(ScreenEdge::Top, 320.0);
        assert_eq!(
            result,
            Err(ReservationError::EdgeUnsupported(
                GeometryError::EdgeUnsupported(ScreenEdge::Top)
            ))
        );
        assert!(f.manager.log().is_empty());
        assert!(f.registry.get().is_none());
    }

    #[test]
    fn test_register_rejected_by_manager_returns_error_and_stays_unregistered() {
        let mut f = fixture();
        f.manager.refuse_registration(true);

        let result = f.client.register(ScreenEdge::Right, 320.0);

        assert!(matches!(
            result,
            Err(ReservationError::RegistrationRejected(ManagerError::Refused(
                AppBarMessage::New
            )))
        ));
        assert!(!f.client.is_registered());
        assert_eq!(f.manager.live_registrations(), 0);
    }

    #[test]
    fn test_repeated_register_keeps_exactly_one_live_registration() {
        let mut f = fixture();
        for n in 1..=5 {
            f.client.register(ScreenEdge::Right, 320.0).unwrap();
            let new = f.manager.count(AppBarMessage::New);
            let remove = f.manager.count(AppBarMessage::Remove);
            assert_eq!(new, n);
            assert_eq!(new - remove, 1, "after {n} registrations");
        }
        assert_eq!(f.manager.live_registrations(), 1);
    }

    #[test]
    fn test_callback_message_id_is_registered_once_and_shared() {
        // Arrange: a second client sharing the same registry
        let mut f = fixture();
        let (tx, _rx) = mpsc::channel();
        let mut other = ReservationClient::new(
            Rc::clone(&f.manager) as Rc<dyn ReservationManager>,
            Rc::clone(&f.geometry) as Rc<dyn ScreenGeometryProvider>,
            Rc::clone(&f.registry),
            tx,
        );
        other.initialize(WindowHandle(0x200));

        // Act
        f.client.register(ScreenEdge::Right, 320.0).unwrap();
        other.register(ScreenEdge::Left, 200.0).unwrap();

        // Assert
        assert_eq!(f.manager.callback_registrations(), 1);
        assert!(f.registry.get().is_some());
    }

    #[test]
    fn test_unregister_when_not_registered_is_a_no_op() {
        let mut f = fixture();
        f.client.unregister();
        f.client.unregister();
        assert!(f.manager.log().is_empty());
        assert!(!f.client.is_registered());
    }

    #[test]
    fn test_set_position_when_not_registered_does_nothing() {
        let mut f = fixture();
        assert_eq!(f.client.set_position(), Ok(()));
        assert!(f.manager.log().is_empty());
    }

    #[test]
    fn test_set_position_recommits_new_width_without_new() {
        let mut f = fixture();
        f.client.register(ScreenEdge::Right, 320.0).unwrap();

        f.client.set_width(60.0);
        f.client.set_position().unwrap();

        assert_eq!(f.manager.count(AppBarMessage::New), 1);
        assert_eq!(f.client.committed_rect(), Some(Rect::new(1860, 0, 1920, 1080)));
    }

    #[test]
    fn test_every_commit_emits_position_changed() {
        let mut f = fixture();
        f.client.register(ScreenEdge::Right, 320.0).unwrap();
        f.client.set_position().unwrap();

        let events: Vec<_> = f.events.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            ReservationEvent::PositionChanged {
                committed: Rect::new(1600, 0, 1920, 1080)
            }
        );
    }

    #[test]
    fn test_degenerate_commit_on_register_is_reported_and_released() {
        let mut f = fixture();
        f.manager.collapse_height(true);

        let result = f.client.register(ScreenEdge::Right, 320.0);

        assert!(matches!(result, Err(ReservationError::DegenerateGeometry(_))));
        assert!(!f.client.is_registered());
        assert_eq!(f.manager.live_registrations(), 0);
    }

    #[test]
    fn test_reserved_rect_reads_current_dpi_scale() {
        // Arrange: commit at 100 %, then the display switches to 200 %
        let mut f = fixture();
        f.client.register(ScreenEdge::Right, 320.0).unwrap();
        f.geometry.set_dpi_scale(DpiScale::new(2.0).unwrap());

        // Act
        let logical = f.client.reserved_rect().unwrap();

        // Assert
        assert_eq!(logical, LogicalRect::new(800.0, 0.0, 160.0, 540.0));
    }

    #[test]
    fn test_register_at_150_percent_uses_physical_width() {
        let mut f = fixture();
        f.geometry.set_dpi_scale(DpiScale::new(1.5).unwrap());

        let committed = f.client.register(ScreenEdge::Left, 320.0).unwrap();

        assert_eq!(committed, Rect::new(0, 0, 480, 1080));
        let logical = f.client.reserved_rect().unwrap();
        assert_eq!(logical.width, 320.0);
    }

    #[test]
    fn test_set_edge_bottom_is_rejected() {
        let mut f = fixture();
        assert!(matches!(
            f.client.set_edge(ScreenEdge::Bottom),
            Err(ReservationError::EdgeUnsupported(_))
        ));
        assert_eq!(f.client.edge(), DockEdge::Right);
    }

    #[test]
    fn test_drop_releases_live_registration() {
        let f = fixture();
        let manager = Rc::clone(&f.manager);
        let mut client = f.client;
        client.register(ScreenEdge::Right, 320.0).unwrap();

        drop(client);

        assert_eq!(manager.live_registrations(), 0);
        assert_eq!(manager.count(AppBarMessage::Remove), 1);
    }
}
