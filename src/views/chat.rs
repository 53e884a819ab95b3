use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{MessageTranslation, User};

/// One line in the team chat as the view renders it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLine {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<MessageTranslation>,
    pub timestamp: DateTime<Utc>,
}

impl ChatLine {
    pub fn is_translated(&self) -> bool {
        self.original.is_some()
    }
}

/// Local state of the team chat page.
#[derive(Debug)]
pub struct ChatView {
    current_user: User,
    lines: Vec<ChatLine>,
    input: String,
    auto_translate: bool,
    next_id: u64,
}

impl ChatView {
    pub fn new(current_user: User) -> Self {
        Self {
            current_user,
            lines: Vec::new(),
            input: String::new(),
            auto_translate: true,
            next_id: 1,
        }
    }

    /// Starts from the sample conversation shown before any history loads.
    pub fn with_sample_history(current_user: User) -> Self {
        let mut view = Self::new(current_user);
        let now = Utc::now();
        view.lines = vec![
            ChatLine {
                id: "1".into(),
                user_id: "2".into(),
                user_name: "Sarah Johnson".into(),
                user_avatar: "👩‍💻".into(),
                content: "早上好！今天的站会几点开始？".into(),
                original: Some(MessageTranslation {
                    content: "Good morning! What time is the standup today?".into(),
                    language: "en".into(),
                }),
                timestamp: now - chrono::Duration::minutes(30),
            },
            ChatLine {
                id: "2".into(),
                user_id: "4".into(),
                user_name: "Maria Garcia".into(),
                user_avatar: "👩‍🎨".into(),
                content: "I just updated the design mocks, have a look".into(),
                original: None,
                timestamp: now - chrono::Duration::minutes(15),
            },
            ChatLine {
                id: "3".into(),
                user_id: "3".into(),
                user_name: "Li Ming".into(),
                user_avatar: "👨‍💻".into(),
                content: "The API is deployed, testing can start".into(),
                original: None,
                timestamp: now - chrono::Duration::minutes(5),
            },
        ];
        view.next_id = 4;
        view
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn auto_translate(&self) -> bool {
        self.auto_translate
    }

    pub fn toggle_auto_translate(&mut self) -> bool {
        self.auto_translate = !self.auto_translate;
        self.auto_translate
    }

    pub fn is_own(&self, line: &ChatLine) -> bool {
        line.user_id == self.current_user.id
    }

    /// Appends the input as a message from the current user and clears it.
    /// Blank input is ignored.
    pub fn send(&mut self) -> Option<&ChatLine> {
        if self.input.trim().is_empty() {
            return None;
        }
        let content = std::mem::take(&mut self.input);
        let line = ChatLine {
            id: self.next_id.to_string(),
            user_id: self.current_user.id.clone(),
            user_name: self.current_user.name.clone(),
            user_avatar: self.current_user.avatar.clone(),
            content,
            original: None,
            timestamp: Utc::now(),
        };
        self.next_id += 1;
        self.lines.push(line);
        self.lines.last()
    }

    /// Enter sends; Shift+Enter is a newline in the input.
    pub fn key_enter(&mut self, shift: bool) -> bool {
        if shift {
            self.input.push('\n');
            return false;
        }
        self.send().is_some()
    }
}

/// `HH:MM` label next to each message, in UTC.
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PresenceStatus;

    fn me() -> User {
        User {
            id: "1".into(),
            name: "Ada".into(),
            email: String::new(),
            avatar: "🦊".into(),
            avatar_type: None,
            role: String::new(),
            status: PresenceStatus::Online,
            position: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_send_appends_and_clears() {
        let mut chat = ChatView::with_sample_history(me());
        chat.set_input("Standup at ten");
        let sent = chat.send().cloned().unwrap();

        assert_eq!(sent.id, "4");
        assert_eq!(sent.user_name, "Ada");
        assert_eq!(sent.user_avatar, "🦊");
        assert!(chat.is_own(&sent));
        assert!(chat.input().is_empty());
        assert_eq!(chat.lines().len(), 4);
        assert!(chat.lines()[0].is_translated());
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut chat = ChatView::new(me());
        chat.set_input("   \n");
        assert!(chat.send().is_none());
        assert!(chat.lines().is_empty());
        assert_eq!(chat.input(), "   \n");
    }

    #[test]
    fn test_enter_and_shift_enter() {
        let mut chat = ChatView::new(me());
        chat.set_input("line one");
        assert!(!chat.key_enter(true));
        assert_eq!(chat.input(), "line one\n");
        assert!(chat.key_enter(false));
        assert_eq!(chat.lines()[0].content, "line one\n");
    }

    #[test]
    fn test_toggle_auto_translate() {
        let mut chat = ChatView::new(me());
        assert!(chat.auto_translate());
        assert!(!chat.toggle_auto_translate());
        assert!(chat.toggle_auto_translate());
    }

    #[test]
    fn test_format_time() {
        let ts: DateTime<Utc> = "2025-06-15T09:05:00Z".parse().unwrap();
        assert_eq!(format_time(&ts), "09:05");
    }
}
