//! Sidebar-Dock host entry point.
//!
//! Runs the docking subsystem end-to-end.  By default it drives a headless
//! scenario against the in-memory shell so the whole flow (docking,
//! compact toggle, display change, hide) can be watched in the log on any
//! platform.  On Windows, `--live-hwnd` attaches to an existing top-level
//! window and docks it for real until Enter is pressed.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load AppConfig (config.toml) + CLI overrides
//!  └─ SidebarWindow::new(host, DockController, PresentationController)
//!  └─ scenario: show → toggle_compact ×2 → WM_DISPLAYCHANGE → hide
//!  └─ drain DockEvent::ModeApplied → persist the applied mode (--persist)
//! ```

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dock_core::protocol::window_message::WM_DISPLAYCHANGE;
use dock_core::{DockEdge, DpiScale, Mode, Rect, WindowHandle};
use dock_host::application::dock_controller::{DockController, DockEvent};
use dock_host::application::host_window::HostWindow;
use dock_host::application::presentation::PresentationController;
use dock_host::application::reservation_client::{CallbackMessageRegistry, ReservationManager};
use dock_host::application::screen_geometry::ScreenGeometryProvider;
use dock_host::application::sidebar::SidebarWindow;
use dock_host::infrastructure::host_window::RecordingHostWindow;
use dock_host::infrastructure::reservation::MockReservationManager;
use dock_host::infrastructure::screen_geometry::MockScreenGeometry;
use dock_host::infrastructure::storage::config::{self, AppConfig};

/// Frame interval used to drive transitions.
const FRAME: Duration = Duration::from_millis(16);

/// Height of the simulated taskbar along the bottom of the display, in
/// logical units.
const SIMULATED_TASKBAR_HEIGHT: f64 = 40.0;

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Floating,
    Docked,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Floating => Mode::Floating,
            ModeArg::Docked => Mode::Docked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EdgeArg {
    Left,
    Right,
}

impl From<EdgeArg> for DockEdge {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Left => DockEdge::Left,
            EdgeArg::Right => DockEdge::Right,
        }
    }
}

/// Screen-reservation and adaptive docking for the Sidebar-Dock panel.
#[derive(Debug, Parser)]
#[command(
    name = "sidebar-dock",
    about = "Docks a panel window to a screen edge, reserving space like a taskbar",
    version
)]
struct Cli {
    /// Path to config.toml.  Defaults to the platform config directory.
    #[arg(long, env = "SIDEBAR_DOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Requested mode; overrides `dock.mode` from the config file.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Edge to attach to; overrides `dock.edge`.
    #[arg(long, value_enum)]
    edge: Option<EdgeArg>,

    /// DPI scale of the simulated display (1.0 = 96 DPI).
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Pixels the simulated shell keeps free at the near edge (another band
    /// already docked there).
    #[arg(long, default_value_t = 0)]
    taskbar_inset: i32,

    /// Make the simulated shell refuse every registration.
    #[arg(long)]
    refuse: bool,

    /// Write the applied mode back to the config file.
    #[arg(long)]
    persist: bool,

    /// Dock an existing window (HWND as a decimal number) with the real shell.
    ///
    /// The window's messages go to its own process, so shell position
    /// changes and display or DPI changes are not followed in this mode.
    #[cfg(target_os = "windows")]
    #[arg(long)]
    live_hwnd: Option<isize>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => config::config_file_path().context("locating config.toml")?,
    };
    let mut cfg = config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(mode) = cli.mode {
        cfg.dock.mode = mode.into();
    }
    if let Some(edge) = cli.edge {
        cfg.dock.edge = edge.into();
    }

    // RUST_LOG wins over the config file's log level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level)),
        )
        .init();

    info!(
        config = %config_path.display(),
        mode = ?cfg.dock.mode,
        edge = ?cfg.dock.edge,
        "Sidebar-Dock starting"
    );

    #[cfg(target_os = "windows")]
    if let Some(hwnd) = cli.live_hwnd {
        let applied = live::run(&cfg, WindowHandle(hwnd))?;
        return persist(&cli, &config_path, &mut cfg, applied);
    }

    let applied = run_simulated(&cli, &cfg)?;
    persist(&cli, &config_path, &mut cfg, applied)
}

/// Drives the scripted scenario against the in-memory shell.
///
/// Returns the last mode the dock reported as applied.
fn run_simulated(cli: &Cli, cfg: &AppConfig) -> anyhow::Result<Option<Mode>> {
    let scale = DpiScale::new(cli.scale).context("--scale")?;
    let width = scale.to_physical(1920.0);
    let height = scale.to_physical(1080.0);
    let geometry = Rc::new(MockScreenGeometry::new(
        Rect::new(0, 0, width, height),
        Rect::new(0, 0, width, height - scale.to_physical(SIMULATED_TASKBAR_HEIGHT)),
        scale,
    ));
    let manager = Rc::new(MockReservationManager::new());
    manager.set_near_edge_inset(cli.taskbar_inset);
    manager.refuse_registration(cli.refuse);

    let host = RecordingHostWindow::new(WindowHandle(0x0001_0001));
    let mut sidebar = build_sidebar(
        host,
        Rc::clone(&manager) as Rc<dyn ReservationManager>,
        geometry,
        cfg,
    );
    let events = sidebar.subscribe();

    sidebar.show();
    settle(&mut sidebar);
    info!(bounds = ?sidebar.host().last_bounds(), "shown");

    for _ in 0..2 {
        let compact = sidebar.toggle_compact();
        settle(&mut sidebar);
        info!(compact, bounds = ?sidebar.host().last_bounds(), "compact toggled");
    }

    sidebar.handle_window_message(WM_DISPLAYCHANGE, 32);
    let applied = drain(&events);

    sidebar.hide();
    settle(&mut sidebar);
    sidebar.close();

    info!(
        new = manager.count(dock_core::AppBarMessage::New),
        remove = manager.count(dock_core::AppBarMessage::Remove),
        live = manager.live_registrations(),
        "shell message totals"
    );
    Ok(applied)
}

fn build_sidebar<H: HostWindow>(
    host: H,
    manager: Rc<dyn ReservationManager>,
    geometry: Rc<dyn ScreenGeometryProvider>,
    cfg: &AppConfig,
) -> SidebarWindow<H> {
    let dock = DockController::new(
        manager,
        geometry,
        Rc::new(CallbackMessageRegistry::new()),
        cfg.dock_settings(),
    );
    let presentation =
        PresentationController::new(cfg.compact_state(), cfg.presentation_settings());
    SidebarWindow::new(host, dock, presentation, cfg.dock.mode)
}

/// Ticks until no transition is running.
fn settle<H: HostWindow>(sidebar: &mut SidebarWindow<H>) {
    while sidebar.presentation().is_animating() {
        sidebar.tick(FRAME);
    }
}

/// Logs every pending event and returns the last applied mode.
fn drain(events: &Receiver<DockEvent>) -> Option<Mode> {
    let mut last = None;
    for event in events.try_iter() {
        let DockEvent::ModeApplied {
            mode,
            rect,
            fallback,
        } = event;
        match fallback {
            Some(cause) => warn!(?mode, ?rect, ?cause, "mode applied after fallback"),
            None => info!(?mode, ?rect, "mode applied"),
        }
        last = Some(mode);
    }
    last
}

fn persist(
    cli: &Cli,
    path: &std::path::Path,
    cfg: &mut AppConfig,
    applied: Option<Mode>,
) -> anyhow::Result<()> {
    let Some(mode) = applied else {
        return Ok(());
    };
    if !cli.persist || cfg.dock.mode == mode {
        return Ok(());
    }
    cfg.dock.mode = mode;
    config::save_to(path, cfg).with_context(|| format!("saving {}", path.display()))?;
    info!(?mode, path = %path.display(), "applied mode saved");
    Ok(())
}

// ── Live mode (Windows) ───────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
mod live {
    use super::*;
    use dock_host::infrastructure::host_window::windows::Win32HostWindow;
    use dock_host::infrastructure::reservation::windows::WindowsReservationManager;
    use dock_host::infrastructure::screen_geometry::windows::WindowsScreenGeometry;

    /// Docks `hwnd` with the real shell until Enter is pressed.
    ///
    /// `hwnd` usually belongs to another process, which receives its window
    /// messages; the reservation callback and display changes therefore
    /// never reach `handle_window_message` here.  An embedding UI feeds its
    /// own window procedure into that hook instead.
    pub(super) fn run(cfg: &AppConfig, hwnd: WindowHandle) -> anyhow::Result<Option<Mode>> {
        let geometry: Rc<dyn ScreenGeometryProvider> = Rc::new(WindowsScreenGeometry::new());
        let host = Win32HostWindow::new(hwnd, Rc::clone(&geometry));
        let mut sidebar = build_sidebar(
            host,
            Rc::new(WindowsReservationManager::new()),
            geometry,
            cfg,
        );
        let events = sidebar.subscribe();

        sidebar.show();
        settle(&mut sidebar);
        let applied = drain(&events);
        info!("press Enter to release the reservation and exit");

        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("reading stdin")?;
        sidebar.close();
        Ok(applied)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
