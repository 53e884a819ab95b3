//! Thin typed wrappers over the office REST service.
//!
//! [`ApiClient`] owns the transport concerns shared by every call (base URL,
//! timeout, bearer token, request ids, status mapping); the service structs
//! in the submodules are flat lists of endpoints on top of it.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::OfficeConfig;
use crate::error::{OfficeError, Result};
use crate::session::SessionHandle;
use crate::util::generate_request_id;

pub mod auth;
pub mod chat;
pub mod meeting;
pub mod space;

pub use auth::{AuthService, LoginRequest, RegisterRequest};
pub use chat::{ChatService, SendMessageRequest};
pub use meeting::MeetingService;
pub use space::SpaceService;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(config: &OfficeConfig, session: SessionHandle) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            OfficeError::Custom(format!("Invalid API base URL {}: {e}", config.api_base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(OfficeError::Custom(format!(
                "Invalid API base URL {}",
                config.api_base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.execute(self.http.request(Method::GET, self.url(segments)))
            .await
    }

    pub async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.http.get(self.url(segments)).query(query))
            .await
    }

    /// POST without a body.
    pub async fn post<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.execute(self.http.post(self.url(segments))).await
    }

    pub async fn post_json<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.http.post(self.url(segments)).json(body))
            .await
    }

    pub async fn put_json<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.http.put(self.url(segments)).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.execute(self.http.delete(self.url(segments))).await
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let request_id = generate_request_id();
        let mut builder = builder.header("X-Request-Id", &request_id);
        if let Some(token) = self.session.token().await {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%request_id, "request failed: {e}");
            OfficeError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%request_id, status = status.as_u16(), url = %response.url(), "ok");
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::warn!(
            %request_id,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "service rejected request"
        );

        if status == StatusCode::UNAUTHORIZED {
            // Any 401 invalidates the stored credentials.
            self.session.clear().await;
        }

        Err(OfficeError::status(status.as_u16(), message))
    }
}

/// Pulls a human-readable message out of an error body, if the service sent one.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value[*key].as_str())
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}
