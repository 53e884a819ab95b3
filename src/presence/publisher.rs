use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::PresenceApi;
use crate::types::{MemberPresence, Position, PositionUpdate};

/// Invoked with the service's record after a position was accepted.
pub type CommitCallback = Arc<dyn Fn(MemberPresence) + Send + Sync>;

/// A scheduled send: the task plus whether its quiet window already elapsed.
struct Pending {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// State shared by every send task of one publisher.
struct Outbox {
    api: Arc<dyn PresenceApi>,
    on_commit: CommitCallback,
    /// Generation of the most recent push.
    latest: AtomicU64,
    /// Held for the duration of one `update_position` call.
    in_order: tokio::sync::Mutex<()>,
    closed: AtomicBool,
}

/// Debounced sender of the local actor's position.
///
/// Every [`push`](Self::push) restarts the quiet window; only the position
/// still current when the window elapses is sent. A send whose window has
/// already elapsed is left to finish. Sends reach the service one at a time
/// in push order, and only the newest push is reported through `on_commit`.
/// Failed sends are logged and dropped.
///
/// The publisher owns its timer task. [`cancel`](Self::cancel) (also run on
/// drop) aborts it, so nothing is transmitted after teardown.
pub struct PositionPublisher {
    outbox: Arc<Outbox>,
    space_id: String,
    user_id: String,
    window: Duration,
    pending: Mutex<Option<Pending>>,
}

impl PositionPublisher {
    pub fn new(
        api: Arc<dyn PresenceApi>,
        space_id: impl Into<String>,
        user_id: impl Into<String>,
        window: Duration,
        on_commit: CommitCallback,
    ) -> Self {
        Self {
            outbox: Arc::new(Outbox {
                api,
                on_commit,
                latest: AtomicU64::new(0),
                in_order: tokio::sync::Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
            space_id: space_id.into(),
            user_id: user_id.into(),
            window,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `position` for sending. Must run inside a Tokio runtime.
    pub fn push(&self, position: Position) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if self.outbox.closed.load(Ordering::SeqCst) {
            return;
        }

        if let Some(previous) = pending.take() {
            if !previous.fired.load(Ordering::SeqCst) {
                previous.handle.abort();
            }
        }

        let generation = self.outbox.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let fired = Arc::new(AtomicBool::new(false));
        let update = PositionUpdate {
            space_id: self.space_id.clone(),
            zone_id: None,
            x: position.x,
            y: position.y,
            user_id: self.user_id.clone(),
        };
        let handle = tokio::spawn(send_after(
            self.outbox.clone(),
            update,
            generation,
            self.window,
            fired.clone(),
        ));
        *pending = Some(Pending { handle, fired });
    }

    /// `true` while a position is waiting out its quiet window.
    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending
            .as_ref()
            .is_some_and(|p| !p.fired.load(Ordering::SeqCst) && !p.handle.is_finished())
    }

    /// Aborts any scheduled or running send and refuses further pushes.
    pub fn cancel(&self) {
        self.outbox.closed.store(true, Ordering::SeqCst);
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.handle.abort();
        }
    }
}

impl Drop for PositionPublisher {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn send_after(
    outbox: Arc<Outbox>,
    update: PositionUpdate,
    generation: u64,
    window: Duration,
    fired: Arc<AtomicBool>,
) {
    tokio::time::sleep(window).await;
    fired.store(true, Ordering::SeqCst);

    let _turn = outbox.in_order.lock().await;
    if outbox.closed.load(Ordering::SeqCst) {
        return;
    }
    match outbox.api.update_position(&update).await {
        Ok(presence) if outbox.latest.load(Ordering::SeqCst) == generation => {
            tracing::debug!(x = update.x, y = update.y, "position committed");
            (outbox.on_commit)(presence);
        }
        Ok(_) => {
            tracing::debug!(x = update.x, y = update.y, "superseded position committed");
        }
        Err(e) => {
            tracing::warn!(x = update.x, y = update.y, "position update failed: {}", e.user_message());
        }
    }
}
