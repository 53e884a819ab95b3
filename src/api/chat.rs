use serde::Serialize;

use super::ApiClient;
use crate::error::{OfficeError, Result};
use crate::types::{
    ChatChannel, Message, MessageType, NewChannel, SuccessResponse, TranslationRequest,
    TranslationResponse, User,
};

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug)]
pub struct SendMessageRequest {
    pub channel_id: String,
    pub content: String,
    pub kind: Option<MessageType>,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    content: &'a str,
    #[serde(rename = "type")]
    kind: MessageType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetLanguage<'a> {
    target_language: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberBody<'a> {
    user_id: &'a str,
}

#[derive(Clone, Debug)]
pub struct ChatService {
    api: ApiClient,
}

impl ChatService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn channels(&self) -> Result<Vec<ChatChannel>> {
        self.api.get(&["chat", "channels"]).await
    }

    pub async fn channel(&self, channel_id: &str) -> Result<ChatChannel> {
        self.api.get(&["chat", "channels", channel_id]).await
    }

    /// One page of history; `None` uses 50 messages from offset 0.
    pub async fn messages(
        &self,
        channel_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Message>> {
        let query = [
            ("limit", limit.unwrap_or(DEFAULT_PAGE_SIZE)),
            ("offset", offset.unwrap_or(0)),
        ];
        self.api
            .get_with_query(&["chat", "channels", channel_id, "messages"], &query)
            .await
    }

    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<Message> {
        if request.content.trim().is_empty() {
            return Err(OfficeError::Validation("Message cannot be empty".into()));
        }
        let body = MessageBody {
            content: &request.content,
            kind: request.kind.unwrap_or_default(),
        };
        self.api
            .post_json(&["chat", "channels", &request.channel_id, "messages"], &body)
            .await
    }

    pub async fn delete_message(&self, message_id: &str) -> Result<SuccessResponse> {
        self.api.delete(&["chat", "messages", message_id]).await
    }

    pub async fn update_message(&self, message_id: &str, content: &str) -> Result<Message> {
        self.api
            .put_json(
                &["chat", "messages", message_id],
                &serde_json::json!({ "content": content }),
            )
            .await
    }

    pub async fn create_channel(&self, channel: &NewChannel) -> Result<ChatChannel> {
        self.api.post_json(&["chat", "channels"], channel).await
    }

    pub async fn join_channel(&self, channel_id: &str) -> Result<SuccessResponse> {
        self.api.post(&["chat", "channels", channel_id, "join"]).await
    }

    pub async fn leave_channel(&self, channel_id: &str) -> Result<SuccessResponse> {
        self.api.post(&["chat", "channels", channel_id, "leave"]).await
    }

    pub async fn translate_message(
        &self,
        message_id: &str,
        target_language: &str,
    ) -> Result<TranslationResponse> {
        self.api
            .post_json(
                &["chat", "messages", message_id, "translate"],
                &TargetLanguage { target_language },
            )
            .await
    }

    pub async fn translate_text(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        self.api.post_json(&["chat", "translate"], request).await
    }

    pub async fn add_member(&self, channel_id: &str, user_id: &str) -> Result<SuccessResponse> {
        self.api
            .post_json(
                &["chat", "channels", channel_id, "members"],
                &MemberBody { user_id },
            )
            .await
    }

    pub async fn remove_member(&self, channel_id: &str, user_id: &str) -> Result<SuccessResponse> {
        self.api
            .delete(&["chat", "channels", channel_id, "members", user_id])
            .await
    }

    pub async fn members(&self, channel_id: &str) -> Result<Vec<User>> {
        self.api.get(&["chat", "channels", channel_id, "members"]).await
    }
}
