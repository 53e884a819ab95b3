use serde::Serialize;

use super::ApiClient;
use crate::error::Result;
use crate::types::{
    MemberPresence, PositionUpdate, PresenceStatus, SpaceDraft, SuccessResponse, User,
    VirtualSpace, VirtualSpaceZone,
};

/// Virtual-space endpoints: spaces, zones, membership and presence.
#[derive(Clone, Debug)]
pub struct SpaceService {
    api: ApiClient,
}

#[derive(Serialize)]
struct StatusBody {
    status: PresenceStatus,
}

impl SpaceService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_spaces(&self) -> Result<Vec<VirtualSpace>> {
        self.api.get(&["virtual-spaces"]).await
    }

    pub async fn get_space(&self, space_id: &str) -> Result<VirtualSpace> {
        self.api.get(&["virtual-spaces", space_id]).await
    }

    pub async fn list_members(&self, space_id: &str) -> Result<Vec<MemberPresence>> {
        self.api.get(&["virtual-spaces", space_id, "members"]).await
    }

    pub async fn update_position(&self, update: &PositionUpdate) -> Result<MemberPresence> {
        self.api
            .put_json(&["virtual-spaces", "position"], update)
            .await
    }

    pub async fn enter_space(&self, space_id: &str) -> Result<MemberPresence> {
        self.api.post(&["virtual-spaces", space_id, "enter"]).await
    }

    pub async fn leave_space(&self, space_id: &str) -> Result<SuccessResponse> {
        self.api.post(&["virtual-spaces", space_id, "leave"]).await
    }

    pub async fn list_zones(&self, space_id: &str) -> Result<Vec<VirtualSpaceZone>> {
        self.api.get(&["virtual-spaces", space_id, "zones"]).await
    }

    pub async fn create_space(&self, draft: &SpaceDraft) -> Result<VirtualSpace> {
        self.api.post_json(&["virtual-spaces"], draft).await
    }

    pub async fn update_space(&self, space_id: &str, draft: &SpaceDraft) -> Result<VirtualSpace> {
        self.api.put_json(&["virtual-spaces", space_id], draft).await
    }

    pub async fn delete_space(&self, space_id: &str) -> Result<SuccessResponse> {
        self.api.delete(&["virtual-spaces", space_id]).await
    }

    pub async fn users_in_space(&self, space_id: &str) -> Result<Vec<User>> {
        self.api.get(&["virtual-spaces", space_id, "users"]).await
    }

    /// Only `online`, `away` and `busy` may be set; `offline` is server-derived.
    pub async fn update_status(
        &self,
        space_id: &str,
        status: PresenceStatus,
    ) -> Result<MemberPresence> {
        if status == PresenceStatus::Offline {
            return Err(crate::error::OfficeError::Validation(
                "Status cannot be set to offline".into(),
            ));
        }
        self.api
            .put_json(&["virtual-spaces", space_id, "status"], &StatusBody { status })
            .await
    }
}
