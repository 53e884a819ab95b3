//! Live position tracking and presence synchronization for the office view.
//!
//! - [`publisher`]: debounced outbound position updates for the local actor.
//! - [`cache`]: last polled roster of a space.
//! - [`reconcile`]: merges the polled roster with the authoritative local user.
//! - [`office`]: the mounted office view tying the pieces to the poll loop.

use async_trait::async_trait;

use crate::api::SpaceService;
use crate::error::Result;
use crate::types::{MemberPresence, PositionUpdate, SuccessResponse};

pub mod cache;
pub mod office;
pub mod publisher;
pub mod reconcile;

pub use cache::PresenceCache;
pub use office::{OfficeEvent, OfficeSettings, OfficeView, ViewState};
pub use publisher::PositionPublisher;
pub use reconcile::{online_count, reconcile};

/// The four presence calls the office view depends on.
#[async_trait]
pub trait PresenceApi: Send + Sync + 'static {
    async fn enter_space(&self, space_id: &str) -> Result<MemberPresence>;
    async fn leave_space(&self, space_id: &str) -> Result<SuccessResponse>;
    async fn list_members(&self, space_id: &str) -> Result<Vec<MemberPresence>>;
    async fn update_position(&self, update: &PositionUpdate) -> Result<MemberPresence>;
}

#[async_trait]
impl PresenceApi for SpaceService {
    async fn enter_space(&self, space_id: &str) -> Result<MemberPresence> {
        SpaceService::enter_space(self, space_id).await
    }

    async fn leave_space(&self, space_id: &str) -> Result<SuccessResponse> {
        SpaceService::leave_space(self, space_id).await
    }

    async fn list_members(&self, space_id: &str) -> Result<Vec<MemberPresence>> {
        SpaceService::list_members(self, space_id).await
    }

    async fn update_position(&self, update: &PositionUpdate) -> Result<MemberPresence> {
        SpaceService::update_position(self, update).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::error::OfficeError;
    use crate::types::{Position, PresenceStatus};

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Enter,
        Leave,
        List,
        Update(Position),
    }

    /// Scriptable in-process stand-in for the presence endpoints.
    #[derive(Default)]
    pub struct MockPresence {
        pub members: Mutex<Vec<MemberPresence>>,
        pub fail_enter: Mutex<Option<u16>>,
        pub fail_list: Mutex<Option<u16>>,
        pub fail_update: Mutex<Option<u16>>,
        pub fail_leave: Mutex<Option<u16>>,
        pub list_delay: Mutex<Option<Duration>>,
        /// Per-call latency for `update_position`, consumed front to back.
        pub update_delays: Mutex<VecDeque<Duration>>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockPresence {
        pub fn with_members(members: Vec<MemberPresence>) -> Self {
            let mock = Self::default();
            *mock.members.lock().unwrap() = members;
            mock
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, wanted: fn(&Call) -> bool) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| wanted(c)).count()
        }

        pub fn updates(&self) -> Vec<Position> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Update(p) => Some(p),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn check(slot: &Mutex<Option<u16>>) -> Result<()> {
            match *slot.lock().unwrap() {
                Some(status) => Err(OfficeError::status(status, None)),
                None => Ok(()),
            }
        }
    }

    pub fn presence(user_id: &str, x: f64, y: f64) -> MemberPresence {
        MemberPresence {
            id: format!("p-{user_id}"),
            user_id: user_id.to_string(),
            space_id: "main".to_string(),
            zone_id: None,
            position: Position::new(x, y),
            status: PresenceStatus::Online,
            last_active: chrono::Utc::now(),
        }
    }

    #[async_trait]
    impl PresenceApi for MockPresence {
        async fn enter_space(&self, space_id: &str) -> Result<MemberPresence> {
            self.record(Call::Enter);
            Self::check(&self.fail_enter)?;
            let mut confirmation = presence("me", 50.0, 50.0);
            confirmation.space_id = space_id.to_string();
            Ok(confirmation)
        }

        async fn leave_space(&self, _space_id: &str) -> Result<SuccessResponse> {
            self.record(Call::Leave);
            Self::check(&self.fail_leave)?;
            Ok(SuccessResponse {
                success: true,
                message: None,
            })
        }

        async fn list_members(&self, _space_id: &str) -> Result<Vec<MemberPresence>> {
            self.record(Call::List);
            let delay = *self.list_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Self::check(&self.fail_list)?;
            Ok(self.members.lock().unwrap().clone())
        }

        async fn update_position(&self, update: &PositionUpdate) -> Result<MemberPresence> {
            self.record(Call::Update(Position::new(update.x, update.y)));
            let delay = self.update_delays.lock().unwrap().pop_front();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Self::check(&self.fail_update)?;
            Ok(presence(&update.user_id, update.x, update.y))
        }
    }
}
