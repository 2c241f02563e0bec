//! PresentationController: compact/expanded width toggle and window
//! transitions.
//!
//! # Two resize styles
//!
//! - **Docked**: no animation.  The band is released, re-reserved at the new
//!   width, and the window is moved once to the committed rectangle.
//!   Animating a live reservation would make every other band on the screen
//!   reflow on each frame.
//! - **Floating**: width and left edge interpolate from their current values
//!   to the target with a cubic ease-out.  No shared OS state is touched.
//!
//! # Entrance and exit
//!
//! Docked windows appear and disappear immediately at full opacity.  Floating
//! windows slide in from `slide_offset` logical units beyond their edge while
//! fading in, and leave the same way.
//!
//! Transitions are driven by [`PresentationController::tick`]: the host's
//! frame timer calls it with the elapsed time and the controller pushes the
//! interpolated frame to the window.

use std::time::Duration;

use dock_core::{CompactState, DockEdge, LogicalRect, Mode};
use tracing::debug;

use super::dock_controller::{validate_width, DockController, DockError};
use super::host_window::HostWindow;

// ── Easing ────────────────────────────────────────────────────────────────────

/// Progress curves, mapping `t ∈ [0, 1]` to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// `1 − (1 − t)²`
    QuadraticOut,
    /// `1 − (1 − t)³`
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => 1.0 - (1.0 - t).powi(2),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// One animated scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Track {
    from: f64,
    to: f64,
    duration: Duration,
    easing: Easing,
}

impl Track {
    fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    fn constant(value: f64) -> Self {
        Self::new(value, value, Duration::ZERO, Easing::Linear)
    }

    fn value_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * self.easing.apply(t)
    }
}

// ── Transitions ───────────────────────────────────────────────────────────────

/// What the window looks like at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub rect: LogicalRect,
    pub opacity: f64,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            rect: LogicalRect::default(),
            opacity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Entrance,
    Exit,
    Resize,
}

/// An in-flight animation of the window's left edge, width, and opacity.
/// Top and height are fixed for the whole transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    kind: TransitionKind,
    base: LogicalRect,
    x: Track,
    width: Track,
    opacity: Track,
    elapsed: Duration,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Total length: the longest of the three tracks.
    pub fn duration(&self) -> Duration {
        self.x
            .duration
            .max(self.width.duration)
            .max(self.opacity.duration)
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration()
    }

    pub fn sample(&self) -> Frame {
        Frame {
            rect: LogicalRect::new(
                self.x.value_at(self.elapsed),
                self.base.y,
                self.width.value_at(self.elapsed),
                self.base.height,
            ),
            opacity: self.opacity.value_at(self.elapsed),
        }
    }
}

/// Durations and distances for the transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationSettings {
    /// Distance, in logical units, a Floating window travels on entrance/exit.
    pub slide_offset: f64,
    pub entrance_slide: Duration,
    pub entrance_fade: Duration,
    pub resize: Duration,
    pub exit: Duration,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            slide_offset: 50.0,
            entrance_slide: Duration::from_millis(250),
            entrance_fade: Duration::from_millis(200),
            resize: Duration::from_millis(200),
            exit: Duration::from_millis(200),
        }
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Owns [`CompactState`] and the active transition.  Holds no OS resources;
/// geometry always comes from the [`DockController`] passed in.
pub struct PresentationController {
    compact: CompactState,
    settings: PresentationSettings,
    active: Option<Transition>,
    frame: Frame,
    shown: bool,
}

impl PresentationController {
    pub fn new(compact: CompactState, settings: PresentationSettings) -> Self {
        Self {
            compact,
            settings,
            active: None,
            frame: Frame::default(),
            shown: false,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.compact.is_compact
    }

    pub fn compact_state(&self) -> CompactState {
        self.compact
    }

    /// Width for the current compact/expanded state.
    pub fn current_width(&self) -> f64 {
        self.compact.current_width()
    }

    /// The last frame pushed to the window.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_transition(&self) -> Option<&Transition> {
        self.active.as_ref()
    }

    /// Plays the entrance for the dock's current mode.
    pub fn entrance(&mut self, dock: &DockController, host: &mut dyn HostWindow) {
        self.shown = true;
        let target = dock.current_rect();
        host.set_always_on_top(dock.current_mode() == Mode::Floating);

        if dock.current_mode() == Mode::Docked {
            self.active = None;
            self.push_frame(
                Frame {
                    rect: target,
                    opacity: 1.0,
                },
                host,
            );
            return;
        }

        let start_x = target.x + self.outward(dock.edge());
        let transition = Transition {
            kind: TransitionKind::Entrance,
            base: target,
            x: Track::new(
                start_x,
                target.x,
                self.settings.entrance_slide,
                Easing::QuadraticOut,
            ),
            width: Track::constant(target.width),
            opacity: Track::new(0.0, 1.0, self.settings.entrance_fade, Easing::Linear),
            elapsed: Duration::ZERO,
        };
        debug!(from = start_x, to = target.x, "floating entrance");
        self.start(transition, host);
    }

    /// Starts the exit for `mode`.
    ///
    /// Returns `true` if a transition was started; the caller hides the
    /// window once [`tick`](Self::tick) reports [`TransitionKind::Exit`].
    /// Returns `false` if the window should be hidden right away.
    pub fn exit(&mut self, mode: Mode, edge: DockEdge, host: &mut dyn HostWindow) -> bool {
        self.shown = false;
        if mode == Mode::Docked || self.settings.exit.is_zero() {
            self.active = None;
            self.frame.opacity = 0.0;
            return false;
        }
        let from = self.frame;
        let transition = Transition {
            kind: TransitionKind::Exit,
            base: from.rect,
            x: Track::new(
                from.rect.x,
                from.rect.x + self.outward(edge),
                self.settings.exit,
                Easing::QuadraticOut,
            ),
            width: Track::constant(from.rect.width),
            opacity: Track::new(from.opacity, 0.0, self.settings.exit, Easing::Linear),
            elapsed: Duration::ZERO,
        };
        self.start(transition, host);
        true
    }

    /// Flips compact/expanded and resizes the window.
    ///
    /// Returns the new width.
    ///
    /// # Errors
    ///
    /// Returns the dock's error if re-reserving at the new width failed; the
    /// dock has then fallen back to Floating and the window has been moved
    /// to the floating rectangle.
    pub fn toggle_compact(
        &mut self,
        dock: &mut DockController,
        host: &mut dyn HostWindow,
    ) -> Result<f64, DockError> {
        let width = self.compact.toggle();
        debug!(compact = self.compact.is_compact, width, "compact toggled");

        if dock.current_mode() == Mode::Docked {
            self.active = None;
            let result = dock.reregister_with_width(width);
            self.apply_committed(dock, host);
            return result.map(|_| width);
        }

        let from = self.frame.rect;
        let result = dock.set_width(width);
        if !self.shown || self.settings.resize.is_zero() {
            self.apply_committed(dock, host);
            return result.map(|_| width);
        }
        let target = dock.current_rect();
        let transition = Transition {
            kind: TransitionKind::Resize,
            base: target,
            x: Track::new(from.x, target.x, self.settings.resize, Easing::CubicOut),
            width: Track::new(from.width, target.width, self.settings.resize, Easing::CubicOut),
            opacity: Track::constant(1.0),
            elapsed: Duration::ZERO,
        };
        self.start(transition, host);
        result.map(|_| width)
    }

    /// Sets the width of the current compact/expanded state and applies it
    /// without animation.
    ///
    /// # Errors
    ///
    /// [`DockError::InvalidWidth`] leaves both widths untouched.  Otherwise
    /// returns the dock's error if the re-commit failed while Docked.
    pub fn set_width(
        &mut self,
        width: f64,
        dock: &mut DockController,
        host: &mut dyn HostWindow,
    ) -> Result<(), DockError> {
        let width = validate_width(width)?;
        if self.compact.is_compact {
            self.compact.compact_width = width;
        } else {
            self.compact.expanded_width = width;
        }
        let result = dock.set_width(width);
        self.apply_committed(dock, host);
        result.map(|_| ())
    }

    /// Snaps the window to the dock's committed rectangle, cancelling any
    /// transition.  Does nothing while hidden.
    pub fn apply_committed(&mut self, dock: &DockController, host: &mut dyn HostWindow) {
        if !self.shown {
            return;
        }
        self.active = None;
        host.set_always_on_top(dock.current_mode() == Mode::Floating);
        self.push_frame(
            Frame {
                rect: dock.current_rect(),
                opacity: 1.0,
            },
            host,
        );
    }

    /// Drops the active transition and forgets the window was shown.
    pub fn cancel(&mut self) {
        self.active = None;
        self.shown = false;
    }

    /// Advances the active transition by `dt` and pushes the new frame.
    ///
    /// Returns the kind of transition that just finished, if any.
    pub fn tick(&mut self, dt: Duration, host: &mut dyn HostWindow) -> Option<TransitionKind> {
        let transition = self.active.as_mut()?;
        transition.advance(dt);
        let frame = transition.sample();
        let finished = transition.is_finished().then_some(transition.kind);
        self.push_frame(frame, host);
        if finished.is_some() {
            self.active = None;
        }
        finished
    }

    fn start(&mut self, transition: Transition, host: &mut dyn HostWindow) {
        let first = transition.sample();
        self.active = Some(transition);
        self.push_frame(first, host);
    }

    fn push_frame(&mut self, frame: Frame, host: &mut dyn HostWindow) {
        self.frame = frame;
        host.set_bounds(frame.rect);
        host.set_opacity(frame.opacity);
    }

    /// Signed distance pointing off-screen from `edge`.
    fn outward(&self, edge: DockEdge) -> f64 {
        match edge {
            DockEdge::Right => self.settings.slide_offset,
            DockEdge::Left => -self.settings.slide_offset,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
