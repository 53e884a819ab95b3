use std::sync::Arc;

use crate::api::{ApiClient, AuthService, ChatService, MeetingService, SpaceService};
use crate::config::OfficeConfig;
use crate::error::{OfficeError, Result};
use crate::presence::{OfficeSettings, OfficeView};
use crate::session::SessionHandle;

/// Everything a host needs for one logged-in (or logging-in) user: the
/// session and a service per API area, all sharing one transport.
#[derive(Clone, Debug)]
pub struct OfficeClient {
    config: OfficeConfig,
    pub auth: AuthService,
    pub chat: ChatService,
    pub meetings: MeetingService,
    pub spaces: SpaceService,
    session: SessionHandle,
}

impl OfficeClient {
    /// Sets up the session store under the configured data directory and the
    /// shared HTTP transport.
    pub fn new(config: OfficeConfig) -> Result<Self> {
        let session = match config.data_dir() {
            Some(dir) => SessionHandle::with_store(dir.join("session.json")),
            None => SessionHandle::in_memory(),
        };
        Self::with_session(config, session)
    }

    pub fn with_session(config: OfficeConfig, session: SessionHandle) -> Result<Self> {
        let api = ApiClient::new(&config, session.clone())?;
        Ok(Self {
            auth: AuthService::new(api.clone()),
            chat: ChatService::new(api.clone()),
            meetings: MeetingService::new(api.clone()),
            spaces: SpaceService::new(api),
            session,
            config,
        })
    }

    pub fn config(&self) -> &OfficeConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Mounts the configured office floor for the logged-in user.
    pub async fn mount_office(&self) -> Result<OfficeView> {
        let user = self
            .session
            .user()
            .await
            .ok_or_else(|| OfficeError::Validation("Log in before entering the office".into()))?;
        Ok(OfficeView::mount(
            Arc::new(self.spaces.clone()),
            user,
            OfficeSettings::from(&self.config),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_mount_requires_login() {
        let client = OfficeClient::with_session(OfficeConfig::default(), SessionHandle::in_memory()).unwrap();
        let err = client.mount_office().await.err().unwrap();
        assert!(matches!(err, OfficeError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_then_mount_enters_space() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok",
                "user": {"id": "u1", "name": "Ada", "status": "online"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/virtual-spaces/main-virtual-office/enter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "userId": "u1", "spaceId": "main-virtual-office",
                "position": {"x": 50, "y": 50}, "status": "online",
                "lastActive": "2025-06-15T10:30:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/virtual-spaces/main-virtual-office/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/virtual-spaces/main-virtual-office/leave"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let config = OfficeConfig {
            api_base_url: format!("{}/api/v1", server.uri()),
            ..OfficeConfig::default()
        };
        let client = OfficeClient::with_session(config, SessionHandle::in_memory()).unwrap();
        client
            .auth
            .login(&crate::api::LoginRequest {
                email: "ada@example.com".into(),
                password: "secret1".into(),
                remember_me: false,
            })
            .await
            .unwrap();

        let office = client.mount_office().await.unwrap();
        let mut events = office.subscribe();
        while let Ok(event) = events.recv().await {
            if matches!(event, crate::presence::OfficeEvent::RosterUpdated { .. }) {
                break;
            }
        }
        let roster = office.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, "u1");
        office.unmount().await;
    }
}
