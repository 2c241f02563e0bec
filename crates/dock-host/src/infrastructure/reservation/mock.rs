//! In-memory reservation manager for tests and the headless demo.
//!
//! # Why a simulated shell?
//!
//! The real reservation manager is global, shared by every process on the
//! machine, and leaks bands if a test crashes mid-way.  It also cannot be
//! told to misbehave.  `MockReservationManager` keeps its own band table and
//! follows the same rules the shell does:
//!
//! - `NEW` fails if the window is already registered.
//! - `QUERYPOS` moves the near edge inward past every band registered earlier
//!   on the same edge, plus an optional fixed inset standing in for a taskbar.
//! - `SETPOS` stores the rectangle as given and posts `POSCHANGED` to every
//!   other band; `REMOVE` does the same after dropping the band.
//!
//! Every message is logged in order so tests can count `NEW` against
//! `REMOVE`.
//!
//! # Failure knobs
//!
//! - [`refuse_registration`](MockReservationManager::refuse_registration):
//!   `NEW` returns [`ManagerError::Refused`].
//! - [`collapse_height`](MockReservationManager::collapse_height):
//!   `QUERYPOS` answers with a zero-height rectangle.
//! - [`fail_remove`](MockReservationManager::fail_remove): `REMOVE` reports a
//!   platform error (the band is still dropped, as the shell does on a dead
//!   window).
//!
//! The type uses `RefCell`/`Cell` interior mutability because every client
//! lives on the UI thread and shares the manager through an `Rc`.

use std::cell::RefCell;
use std::collections::BTreeMap;

use dock_core::{AppBarData, AppBarMessage, AppBarNotification, Rect, ScreenEdge, WindowHandle};

use crate::application::reservation_client::{ManagerError, ReservationManager};

/// First id handed out by `register_callback_message`; the shell allocates
/// registered messages from `0xC000` upwards.
const FIRST_CALLBACK_ID: u32 = 0xC000;

/// A notification the simulated shell would have posted to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedNotification {
    pub window: WindowHandle,
    pub callback_message: u32,
    pub notification: AppBarNotification,
}

#[derive(Debug, Clone, Copy)]
struct Band {
    /// Registration sequence number; earlier bands sit closer to the edge.
    order: u64,
    edge: ScreenEdge,
    callback_message: u32,
    rect: Option<Rect>,
}

#[derive(Debug, Default)]
struct ShellState {
    log: Vec<(AppBarMessage, WindowHandle)>,
    bands: BTreeMap<isize, Band>,
    callback_ids: BTreeMap<String, u32>,
    callback_calls: usize,
    next_order: u64,
    posted: Vec<PostedNotification>,
    near_edge_inset: i32,
    refuse_registration: bool,
    collapse_height: bool,
    fail_remove: bool,
}

/// Simulated shell band table.
#[derive(Debug, Default)]
pub struct MockReservationManager {
    state: RefCell<ShellState>,
}

impl MockReservationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulls the near edge of every `QUERYPOS` answer inward by `inset`
    /// pixels, like a taskbar sitting on that edge.
    pub fn set_near_edge_inset(&self, inset: i32) {
        self.state.borrow_mut().near_edge_inset = inset;
    }

    pub fn refuse_registration(&self, refuse: bool) {
        self.state.borrow_mut().refuse_registration = refuse;
    }

    pub fn collapse_height(&self, collapse: bool) {
        self.state.borrow_mut().collapse_height = collapse;
    }

    pub fn fail_remove(&self, fail: bool) {
        self.state.borrow_mut().fail_remove = fail;
    }

    /// Every message received, in order.
    pub fn log(&self) -> Vec<AppBarMessage> {
        self.state.borrow().log.iter().map(|(m, _)| *m).collect()
    }

    /// Number of times `message` was received.
    pub fn count(&self, message: AppBarMessage) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|(m, _)| *m == message)
            .count()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    /// Number of windows currently holding a registration.
    pub fn live_registrations(&self) -> usize {
        self.state.borrow().bands.len()
    }

    /// Number of `register_callback_message` calls received.
    pub fn callback_registrations(&self) -> usize {
        self.state.borrow().callback_calls
    }

    /// The rectangle last committed by `window`, if it is registered and has
    /// committed one.
    pub fn committed_rect(&self, window: WindowHandle) -> Option<Rect> {
        self.state
            .borrow()
            .bands
            .get(&window.0)
            .and_then(|band| band.rect)
    }

    /// Drains the notifications posted since the last call.
    pub fn take_notifications(&self) -> Vec<PostedNotification> {
        std::mem::take(&mut self.state.borrow_mut().posted)
    }
}

impl ShellState {
    fn query_pos(&self, data: &mut AppBarData) {
        let mut rect = data.rect;
        let order = self
            .bands
            .get(&data.window.0)
            .map_or(u64::MAX, |band| band.order);
        let others = self
            .bands
            .values()
            .filter(|band| band.order < order && band.edge == data.edge)
            .filter_map(|band| band.rect);
        match data.edge {
            ScreenEdge::Right => {
                rect.right -= self.near_edge_inset;
                for other in others {
                    rect.right = rect.right.min(other.left);
                }
            }
            ScreenEdge::Left => {
                rect.left += self.near_edge_inset;
                for other in others {
                    rect.left = rect.left.max(other.right);
                }
            }
            ScreenEdge::Top => {
                rect.top += self.near_edge_inset;
                for other in others {
                    rect.top = rect.top.max(other.bottom);
                }
            }
            ScreenEdge::Bottom => {
                rect.bottom -= self.near_edge_inset;
                for other in others {
                    rect.bottom = rect.bottom.min(other.top);
                }
            }
        }
        if self.collapse_height {
            rect.bottom = rect.top;
        }
        data.rect = rect;
    }

    fn notify_others(&mut self, changed: WindowHandle) {
        let posted = self
            .bands
            .iter()
            .filter(|(window, _)| **window != changed.0)
            .map(|(window, band)| PostedNotification {
                window: WindowHandle(*window),
                callback_message: band.callback_message,
                notification: AppBarNotification::PosChanged,
            })
            .collect::<Vec<_>>();
        self.posted.extend(posted);
    }
}

impl ReservationManager for MockReservationManager {
    fn register_callback_message(&self, name: &str) -> Result<u32, ManagerError> {
        let mut state = self.state.borrow_mut();
        state.callback_calls += 1;
        let next = FIRST_CALLBACK_ID + state.callback_ids.len() as u32;
        Ok(*state.callback_ids.entry(name.to_string()).or_insert(next))
    }

    fn send(&self, message: AppBarMessage, data: &mut AppBarData) -> Result<(), ManagerError> {
        let mut state = self.state.borrow_mut();
        state.log.push((message, data.window));
        let registered = state.bands.contains_key(&data.window.0);

        match message {
            AppBarMessage::New => {
                if state.refuse_registration || registered {
                    return Err(ManagerError::Refused(AppBarMessage::New));
                }
                let order = state.next_order;
                state.next_order += 1;
                state.bands.insert(
                    data.window.0,
                    Band {
                        order,
                        edge: data.edge,
                        callback_message: data.callback_message,
                        rect: None,
                    },
                );
                Ok(())
            }
            AppBarMessage::Remove => {
                let removed = state.bands.remove(&data.window.0);
                if removed.is_some_and(|band| band.rect.is_some()) {
                    state.notify_others(data.window);
                }
                if state.fail_remove {
                    return Err(ManagerError::Platform("simulated REMOVE failure".to_string()));
                }
                Ok(())
            }
            AppBarMessage::QueryPos => {
                if !registered {
                    return Err(ManagerError::Refused(AppBarMessage::QueryPos));
                }
                state.query_pos(data);
                Ok(())
            }
            AppBarMessage::SetPos => {
                let Some(band) = state.bands.get_mut(&data.window.0) else {
                    return Err(ManagerError::Refused(AppBarMessage::SetPos));
                };
                band.edge = data.edge;
                band.rect = Some(data.rect);
                state.notify_others(data.window);
                Ok(())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
