use serde::Serialize;

use super::ApiClient;
use crate::error::Result;
use crate::types::{
    MeetingParticipant, MeetingRoom, MeetingUpdate, NewMeeting, ParticipantStatusUpdate,
    RecordingStarted, RecordingStopped, SuccessResponse,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LockBody {
    is_locked: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostBody<'a> {
    new_host_id: &'a str,
}

#[derive(Clone, Debug)]
pub struct MeetingService {
    api: ApiClient,
}

impl MeetingService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn rooms(&self) -> Result<Vec<MeetingRoom>> {
        self.api.get(&["meetings", "rooms"]).await
    }

    pub async fn room(&self, meeting_id: &str) -> Result<MeetingRoom> {
        self.api.get(&["meetings", "rooms", meeting_id]).await
    }

    pub async fn create_room(&self, meeting: &NewMeeting) -> Result<MeetingRoom> {
        self.api.post_json(&["meetings", "rooms"], meeting).await
    }

    pub async fn update_room(&self, meeting_id: &str, update: &MeetingUpdate) -> Result<MeetingRoom> {
        self.api
            .put_json(&["meetings", "rooms", meeting_id], update)
            .await
    }

    pub async fn delete_room(&self, meeting_id: &str) -> Result<SuccessResponse> {
        self.api.delete(&["meetings", "rooms", meeting_id]).await
    }

    pub async fn join(&self, meeting_id: &str) -> Result<MeetingParticipant> {
        self.api.post(&["meetings", "rooms", meeting_id, "join"]).await
    }

    pub async fn leave(&self, meeting_id: &str) -> Result<SuccessResponse> {
        self.api.post(&["meetings", "rooms", meeting_id, "leave"]).await
    }

    pub async fn update_participant_status(
        &self,
        meeting_id: &str,
        update: &ParticipantStatusUpdate,
    ) -> Result<MeetingParticipant> {
        self.api
            .put_json(
                &["meetings", "rooms", meeting_id, "participant", "status"],
                update,
            )
            .await
    }

    pub async fn set_locked(&self, meeting_id: &str, is_locked: bool) -> Result<MeetingRoom> {
        self.api
            .put_json(
                &["meetings", "rooms", meeting_id, "lock"],
                &LockBody { is_locked },
            )
            .await
    }

    pub async fn remove_participant(
        &self,
        meeting_id: &str,
        participant_id: &str,
    ) -> Result<SuccessResponse> {
        self.api
            .delete(&["meetings", "rooms", meeting_id, "participants", participant_id])
            .await
    }

    pub async fn transfer_host(&self, meeting_id: &str, new_host_id: &str) -> Result<SuccessResponse> {
        self.api
            .put_json(
                &["meetings", "rooms", meeting_id, "host"],
                &HostBody { new_host_id },
            )
            .await
    }

    pub async fn invite(&self, meeting_id: &str, email: &str) -> Result<SuccessResponse> {
        self.api
            .post_json(
                &["meetings", "rooms", meeting_id, "invite"],
                &serde_json::json!({ "email": email }),
            )
            .await
    }

    pub async fn start_recording(&self, meeting_id: &str) -> Result<RecordingStarted> {
        self.api
            .post(&["meetings", "rooms", meeting_id, "recording", "start"])
            .await
    }

    pub async fn stop_recording(&self, meeting_id: &str) -> Result<RecordingStopped> {
        self.api
            .post(&["meetings", "rooms", meeting_id, "recording", "stop"])
            .await
    }

    pub async fn participants(&self, meeting_id: &str) -> Result<Vec<MeetingParticipant>> {
        self.api
            .get(&["meetings", "rooms", meeting_id, "participants"])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn room_json(locked: bool) -> serde_json::Value {
        serde_json::json!({
            "id": "standup",
            "name": "Daily standup",
            "capacity": 8,
            "isLocked": locked,
            "participants": []
        })
    }

    #[tokio::test]
    async fn test_lock_toggle() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/meetings/rooms/standup/lock"))
            .and(body_json(serde_json::json!({"isLocked": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(room_json(true)))
            .expect(1)
            .mount(&server)
            .await;

        let meetings = MeetingService::new(client_for(&server).await);
        let room = meetings.set_locked("standup", true).await.unwrap();
        assert!(room.is_locked);
        assert_eq!(room.capacity, 8);
    }

    #[tokio::test]
    async fn test_participant_status_sends_only_set_flags() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/meetings/rooms/standup/participant/status"))
            .and(body_json(serde_json::json!({"hasMic": false, "hasHandRaised": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pa1",
                "meetingId": "standup",
                "userId": "u1",
                "user": {"id": "u1", "name": "Ada"},
                "isHost": false,
                "isSpeaking": false,
                "hasMic": false,
                "hasCamera": true,
                "hasHandRaised": true,
                "joinedAt": "2025-06-15T10:30:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let meetings = MeetingService::new(client_for(&server).await);
        let participant = meetings
            .update_participant_status(
                "standup",
                &ParticipantStatusUpdate {
                    has_mic: Some(false),
                    has_hand_raised: Some(true),
                    ..ParticipantStatusUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(participant.has_hand_raised);
    }

    #[tokio::test]
    async fn test_recording_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/meetings/rooms/standup/recording/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "recordingId": "rec-1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/meetings/rooms/standup/recording/stop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "recordingUrl": "https://cdn.example.com/rec-1.mp4"
            })))
            .mount(&server)
            .await;

        let meetings = MeetingService::new(client_for(&server).await);
        assert_eq!(meetings.start_recording("standup").await.unwrap().recording_id, "rec-1");
        assert!(meetings
            .stop_recording("standup")
            .await
            .unwrap()
            .recording_url
            .ends_with("rec-1.mp4"));
    }

    #[tokio::test]
    async fn test_conflict_phrase() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/meetings/rooms/standup/join"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let meetings = MeetingService::new(client_for(&server).await);
        let err = meetings.join("standup").await.unwrap_err();
        assert_eq!(err.user_message(), "Resource conflict, please check and retry");
    }
}
