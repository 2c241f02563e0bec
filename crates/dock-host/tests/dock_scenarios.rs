//! End-to-end dock scenarios: a `SidebarWindow` driven against the in-memory
//! shell and a recording host window.

use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use dock_core::{AppBarMessage, CompactState, LogicalRect, Mode, Rect, WindowHandle};
use dock_host::application::dock_controller::{
    DockController, DockEvent, DockSettings, FallbackCause,
};
use dock_host::application::presentation::{PresentationController, PresentationSettings};
use dock_host::application::reservation_client::{CallbackMessageRegistry, ReservationManager};
use dock_host::application::screen_geometry::ScreenGeometryProvider;
use dock_host::application::sidebar::SidebarWindow;
use dock_host::infrastructure::host_window::{HostCall, RecordingHostWindow};
use dock_host::infrastructure::reservation::MockReservationManager;
use dock_host::infrastructure::screen_geometry::MockScreenGeometry;
use dock_host::infrastructure::storage::config::AppConfig;

struct Harness {
    manager: Rc<MockReservationManager>,
    geometry: Rc<MockScreenGeometry>,
    registry: Rc<CallbackMessageRegistry>,
}

impl Harness {
    fn new() -> Self {
        Self {
            manager: Rc::new(MockReservationManager::new()),
            geometry: Rc::new(MockScreenGeometry::single_1080p()),
            registry: Rc::new(CallbackMessageRegistry::new()),
        }
    }

    fn sidebar(
        &self,
        window: isize,
        mode: Mode,
        cooldown: Duration,
    ) -> SidebarWindow<RecordingHostWindow> {
        let dock = DockController::new(
            Rc::clone(&self.manager) as Rc<dyn ReservationManager>,
            Rc::clone(&self.geometry) as Rc<dyn ScreenGeometryProvider>,
            Rc::clone(&self.registry),
            DockSettings {
                redock_cooldown: cooldown,
                ..DockSettings::default()
            },
        );
        let presentation = PresentationController::new(
            CompactState::new(320.0, 60.0),
            PresentationSettings::default(),
        );
        SidebarWindow::new(
            RecordingHostWindow::new(WindowHandle(window)),
            dock,
            presentation,
            mode,
        )
    }
}

fn settle(sidebar: &mut SidebarWindow<RecordingHostWindow>) {
    while sidebar.presentation().is_animating() {
        sidebar.tick(Duration::from_millis(16));
    }
}

fn applied_modes(events: &Receiver<DockEvent>) -> Vec<Mode> {
    events
        .try_iter()
        .map(|DockEvent::ModeApplied { mode, .. }| mode)
        .collect()
}

#[test]
fn test_rejected_registration_never_moves_window_to_reserved_band() {
    // Arrange
    let harness = Harness::new();
    harness.manager.refuse_registration(true);
    let mut sidebar = harness.sidebar(0x10, Mode::Docked, Duration::ZERO);

    // Act
    sidebar.show();
    settle(&mut sidebar);

    // Assert
    assert_eq!(sidebar.current_mode(), Mode::Floating);
    let floating = sidebar.dock().floating_rect();
    assert_eq!(sidebar.host().last_bounds(), Some(floating));
    // The docked band would be 1080 tall; every placement used the work area.
    assert!(sidebar
        .host()
        .bounds_history()
        .iter()
        .all(|rect| rect.height == 1040.0));
    assert_eq!(harness.manager.live_registrations(), 0);
}

#[test]
fn test_compact_toggle_while_docked_is_one_remove_then_one_new() {
    // Arrange
    let harness = Harness::new();
    let mut sidebar = harness.sidebar(0x10, Mode::Docked, Duration::ZERO);
    sidebar.show();
    harness.manager.clear_log();
    sidebar.host_mut().clear();

    // Act
    sidebar.toggle_compact();

    // Assert
    let log = harness.manager.log();
    let removes: Vec<_> = log
        .iter()
        .enumerate()
        .filter(|(_, m)| **m == AppBarMessage::Remove)
        .collect();
    let news: Vec<_> = log
        .iter()
        .enumerate()
        .filter(|(_, m)| **m == AppBarMessage::New)
        .collect();
    assert_eq!(removes.len(), 1);
    assert_eq!(news.len(), 1);
    assert!(removes[0].0 < news[0].0, "REMOVE must precede NEW");
    assert_eq!(
        harness.manager.committed_rect(WindowHandle(0x10)),
        Some(Rect::new(1860, 0, 1920, 1080))
    );

    // Exactly one placement, already at the compact width.
    let bounds = sidebar.host().bounds_history();
    assert_eq!(bounds, vec![LogicalRect::new(1860.0, 0.0, 60.0, 1080.0)]);
}

#[test]
fn test_second_panel_on_same_edge_stacks_and_first_is_notified() {
    // Arrange: panel A docks first
    let harness = Harness::new();
    let mut a = harness.sidebar(0xA, Mode::Docked, Duration::ZERO);
    let mut b = harness.sidebar(0xB, Mode::Docked, Duration::ZERO);
    a.show();
    harness.manager.take_notifications();

    // Act: panel B docks on the same edge
    b.show();
    let posted = harness.manager.take_notifications();
    for notice in posted.iter().filter(|n| n.window == WindowHandle(0xA)) {
        a.handle_window_message(notice.callback_message, notice.notification as usize);
    }

    // Assert
    assert_eq!(
        harness.manager.committed_rect(WindowHandle(0xA)),
        Some(Rect::new(1600, 0, 1920, 1080))
    );
    assert_eq!(
        harness.manager.committed_rect(WindowHandle(0xB)),
        Some(Rect::new(1280, 0, 1600, 1080))
    );
    assert!(posted.iter().any(|n| n.window == WindowHandle(0xA)));
    assert_eq!(a.current_mode(), Mode::Docked);
    assert_eq!(b.host().last_bounds().map(|r| r.width), Some(320.0));
}

#[test]
fn test_forced_fallback_blocks_redock_during_cooldown() {
    // Arrange
    let harness = Harness::new();
    let mut sidebar = harness.sidebar(0x10, Mode::Docked, Duration::from_secs(60));
    let events = sidebar.subscribe();
    harness.manager.collapse_height(true);
    sidebar.show();

    // Act: the shell recovers but the user retries right away
    harness.manager.collapse_height(false);
    let mode = sidebar.set_mode(Mode::Docked);

    // Assert
    assert_eq!(mode, Mode::Floating);
    assert_eq!(harness.manager.live_registrations(), 0);
    let fallbacks: Vec<_> = events
        .try_iter()
        .filter_map(|DockEvent::ModeApplied { fallback, .. }| fallback)
        .collect();
    assert_eq!(
        fallbacks,
        vec![FallbackCause::DegenerateGeometry, FallbackCause::CoolingDown]
    );
}

#[test]
fn test_every_geometry_commit_is_announced_with_actual_mode() {
    let harness = Harness::new();
    let mut sidebar = harness.sidebar(0x10, Mode::Floating, Duration::ZERO);
    let events = sidebar.subscribe();

    sidebar.show();
    sidebar.set_mode(Mode::Docked);
    sidebar.toggle_compact();
    sidebar.set_mode(Mode::Floating);

    assert_eq!(
        applied_modes(&events),
        vec![Mode::Docked, Mode::Docked, Mode::Floating]
    );
}

#[test]
fn test_hide_show_cycle_never_leaks_a_reservation() {
    let harness = Harness::new();
    let mut sidebar = harness.sidebar(0x10, Mode::Docked, Duration::ZERO);

    for _ in 0..4 {
        sidebar.show();
        assert_eq!(harness.manager.live_registrations(), 1);
        sidebar.hide();
        settle(&mut sidebar);
        assert_eq!(harness.manager.live_registrations(), 0);
    }
    assert_eq!(
        harness.manager.count(AppBarMessage::New),
        harness.manager.count(AppBarMessage::Remove)
    );
}

#[test]
fn test_dropping_sidebar_releases_reservation() {
    let harness = Harness::new();
    {
        let mut sidebar = harness.sidebar(0x10, Mode::Docked, Duration::ZERO);
        sidebar.show();
        assert_eq!(harness.manager.live_registrations(), 1);
    }
    assert_eq!(harness.manager.live_registrations(), 0);
}

#[test]
fn test_floating_show_hide_plays_full_transition_sequence() {
    let harness = Harness::new();
    let mut sidebar = harness.sidebar(0x10, Mode::Floating, Duration::ZERO);

    sidebar.show();
    settle(&mut sidebar);
    sidebar.hide();
    settle(&mut sidebar);

    let calls = sidebar.host().calls();
    assert_eq!(calls.first(), Some(&HostCall::SetBounds(sidebar.dock().floating_rect())));
    assert!(calls.contains(&HostCall::SetAlwaysOnTop(true)));
    assert_eq!(calls.last(), Some(&HostCall::SetVisible(false)));
    assert_eq!(sidebar.host().opacity(), 0.0);
}

#[test]
fn test_config_drives_start_compact_and_edge() {
    // Arrange
    let harness = Harness::new();
    let cfg: AppConfig = toml::from_str(
        r#"
[dock]
mode = "docked"
edge = "left"
start_compact = true
"#,
    )
    .expect("config");
    let dock = DockController::new(
        Rc::clone(&harness.manager) as Rc<dyn ReservationManager>,
        Rc::clone(&harness.geometry) as Rc<dyn ScreenGeometryProvider>,
        Rc::clone(&harness.registry),
        cfg.dock_settings(),
    );
    let presentation =
        PresentationController::new(cfg.compact_state(), cfg.presentation_settings());
    let mut sidebar = SidebarWindow::new(
        RecordingHostWindow::new(WindowHandle(0x10)),
        dock,
        presentation,
        cfg.dock.mode,
    );

    // Act
    sidebar.show();

    // Assert
    assert!(sidebar.is_compact());
    assert_eq!(
        harness.manager.committed_rect(WindowHandle(0x10)),
        Some(Rect::new(0, 0, 60, 1080))
    );
}
