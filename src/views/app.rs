use serde::Serialize;

use crate::session::Session;
use crate::types::{Position, PresenceStatus, User};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    #[default]
    Office,
    Meeting,
    Chat,
}

/// Top-level navigation state: who is logged in and which page is showing.
#[derive(Debug, Default)]
pub struct AppShell {
    current_user: Option<User>,
    active: ActiveView,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a remembered session, if it carries a user.
    pub fn from_session(session: &Session) -> Self {
        let mut shell = Self::new();
        if let (true, Some(user)) = (session.is_authenticated(), session.user.clone()) {
            shell.login(user);
        }
        shell
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// A freshly logged-in user is online, has not picked an avatar yet and
    /// starts on the office floor.
    pub fn login(&mut self, mut user: User) {
        user.status = PresenceStatus::Online;
        user.avatar = String::new();
        user.avatar_type = None;
        self.current_user = Some(user);
        self.active = ActiveView::Office;
    }

    /// Clears local state. Callers clear the service session separately, and
    /// this runs regardless of whether that succeeded.
    pub fn logout(&mut self) {
        self.current_user = None;
        self.active = ActiveView::Office;
    }

    pub fn active(&self) -> ActiveView {
        self.active
    }

    pub fn navigate(&mut self, view: ActiveView) {
        if self.is_authenticated() {
            self.active = view;
        }
    }

    /// The colleagues panel sits beside the office and meeting pages only.
    pub fn shows_side_panel(&self) -> bool {
        self.active != ActiveView::Chat
    }

    pub fn set_position(&mut self, position: Position) {
        if let Some(user) = self.current_user.as_mut() {
            user.position = Some(position);
        }
    }

    /// Applies profile edits while keeping identity and email.
    pub fn update_profile(&mut self, edited: User) {
        if let Some(user) = self.current_user.as_mut() {
            *user = User {
                id: user.id.clone(),
                email: user.email.clone(),
                position: user.position,
                ..edited
            };
        }
    }
}
