use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::cache::PresenceCache;
use super::publisher::PositionPublisher;
use super::reconcile::{online_count, reconcile};
use super::PresenceApi;
use crate::config::OfficeConfig;
use crate::error::OfficeError;
use crate::types::{Position, User};
use crate::util::clamp_position;

const EVENT_CHANNEL_CAPACITY: usize = 64;

// ── Events ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "message")]
pub enum ViewState {
    Loading,
    Ready,
    Error(String),
}

impl ViewState {
    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum OfficeEvent {
    StateChanged { state: ViewState },
    RosterUpdated { members: usize, online: usize },
    PositionCommitted { x: f64, y: f64 },
    Error { message: String },
}

// ── State ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct OfficeSettings {
    pub space_id: String,
    pub debounce: Duration,
    pub poll_interval: Duration,
}

impl From<&OfficeConfig> for OfficeSettings {
    fn from(config: &OfficeConfig) -> Self {
        Self {
            space_id: config.space_id.clone(),
            debounce: config.debounce(),
            poll_interval: config.poll_interval(),
        }
    }
}

struct Floor {
    state: ViewState,
    cache: PresenceCache,
    local: User,
}

struct Shared {
    api: Arc<dyn PresenceApi>,
    space_id: String,
    floor: Mutex<Floor>,
    in_flight: AtomicBool,
    events: broadcast::Sender<OfficeEvent>,
}

/// Clears the single-flight flag even if the fetch future is dropped mid-way.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlightGuard(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Shared {
    fn floor(&self) -> MutexGuard<'_, Floor> {
        self.floor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: OfficeEvent) {
        let _ = self.events.send(event);
    }

    fn set_state(&self, state: ViewState) {
        let changed = {
            let mut floor = self.floor();
            let changed = floor.state != state;
            floor.state = state.clone();
            changed
        };
        if changed {
            self.emit(OfficeEvent::StateChanged { state });
        }
    }

    fn fail(&self, err: &OfficeError) {
        let message = err.user_message();
        tracing::warn!(space = %self.space_id, "presence fetch failed: {message}");
        self.set_state(ViewState::Error(message.clone()));
        self.emit(OfficeEvent::Error { message });
    }

    /// Fetches the roster unless a fetch is already running.
    /// Returns `false` when skipped.
    ///
    /// The flight is over before the outcome is published, so a listener may
    /// retry as soon as it sees the error.
    async fn refresh(&self) -> bool {
        let Some(flight) = FlightGuard::acquire(&self.in_flight) else {
            tracing::debug!(space = %self.space_id, "roster fetch already in flight, skipping");
            return false;
        };

        let outcome = match self.api.list_members(&self.space_id).await {
            Ok(members) => {
                let mut floor = self.floor();
                floor.cache.replace(&members);
                let roster = reconcile(floor.cache.members(), &floor.local);
                Ok((roster.len(), online_count(&roster)))
            }
            Err(e) => Err(e),
        };
        drop(flight);

        match outcome {
            Ok((total, online)) => {
                tracing::debug!(space = %self.space_id, members = total, online, "roster refreshed");
                self.set_state(ViewState::Ready);
                self.emit(OfficeEvent::RosterUpdated {
                    members: total,
                    online,
                });
            }
            Err(e) => self.fail(&e),
        }
        true
    }
}

/// A mounted office floor: enters the space, keeps its roster fresh and
/// publishes the local actor's drags.
///
/// The view owns both of its timers (poll interval and drag debounce).
/// [`unmount`](Self::unmount) cancels them and leaves the space; dropping the
/// view cancels them without the leave call.
pub struct OfficeView {
    shared: Arc<Shared>,
    publisher: PositionPublisher,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl OfficeView {
    /// Enters the space and starts polling. Must run inside a Tokio runtime.
    pub fn mount(api: Arc<dyn PresenceApi>, local: User, settings: OfficeSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            api: api.clone(),
            space_id: settings.space_id.clone(),
            floor: Mutex::new(Floor {
                state: ViewState::Loading,
                cache: PresenceCache::new(),
                local: local.clone(),
            }),
            in_flight: AtomicBool::new(false),
            events: events.clone(),
        });

        let commit_events = events;
        let publisher = PositionPublisher::new(
            api,
            settings.space_id.clone(),
            local.id.clone(),
            settings.debounce,
            Arc::new(move |presence| {
                let _ = commit_events.send(OfficeEvent::PositionCommitted {
                    x: presence.position.x,
                    y: presence.position.y,
                });
            }),
        );

        tracing::info!(space = %settings.space_id, user = %local.id, "mounting office view");
        let poller = tokio::spawn(run_poller(shared.clone(), settings.poll_interval));

        Self {
            shared,
            publisher,
            poller: Mutex::new(Some(poller)),
        }
    }

    pub fn space_id(&self) -> &str {
        &self.shared.space_id
    }

    pub fn state(&self) -> ViewState {
        self.shared.floor().state.clone()
    }

    /// `true` only while nothing has been fetched yet. A retry after a
    /// roster has landed does not count as loading.
    pub fn is_loading(&self) -> bool {
        let floor = self.shared.floor();
        floor.state == ViewState::Loading && !floor.cache.has_synced()
    }

    pub fn roster(&self) -> Vec<User> {
        let floor = self.shared.floor();
        reconcile(floor.cache.members(), &floor.local)
    }

    pub fn online_count(&self) -> usize {
        online_count(&self.roster())
    }

    pub fn local_user(&self) -> User {
        self.shared.floor().local.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OfficeEvent> {
        self.shared.events.subscribe()
    }

    /// Moves the local avatar. The roster reflects the new position at once;
    /// the service hears about it after the debounce window.
    pub fn drag_to(&self, x: f64, y: f64) -> Position {
        let position = clamp_position(x, y);
        self.shared.floor().local.position = Some(position);
        self.publisher.push(position);
        position
    }

    /// Leaves the error state and fetches the roster once more.
    /// Does nothing unless the view is in the error state.
    pub async fn retry(&self) -> bool {
        {
            let floor = self.shared.floor();
            if !floor.state.is_error() {
                return false;
            }
        }
        tracing::info!(space = %self.shared.space_id, "retrying roster fetch");
        self.shared.set_state(ViewState::Loading);
        self.shared.refresh().await
    }

    /// Out-of-band refresh; skipped while another fetch is running.
    pub async fn refresh(&self) -> bool {
        self.shared.refresh().await
    }

    /// Cancels both timers and tells the service we left. Never fails.
    pub async fn unmount(self) {
        self.teardown();
        let space = self.shared.space_id.clone();
        match self.shared.api.leave_space(&space).await {
            Ok(_) => tracing::info!(%space, "left space"),
            Err(e) => tracing::warn!(%space, "leave space failed: {}", e.user_message()),
        }
    }

    fn teardown(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = poller.take() {
            handle.abort();
        }
        self.publisher.cancel();
    }
}

impl Drop for OfficeView {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_poller(shared: Arc<Shared>, period: Duration) {
    match shared.api.enter_space(&shared.space_id).await {
        Ok(_) => {
            tracing::info!(space = %shared.space_id, "entered space");
            shared.refresh().await;
        }
        Err(e) => shared.fail(&e),
    }

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if shared.floor().state.is_error() {
            continue;
        }
        shared.refresh().await;
    }
}
