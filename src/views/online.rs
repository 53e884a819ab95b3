use crate::types::User;

/// Side panel listing colleagues, with search and a quick-meeting picker.
#[derive(Debug, Default)]
pub struct OnlinePanel {
    users: Vec<User>,
    query: String,
    selected: Vec<String>,
}

impl OnlinePanel {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    /// Swaps in a fresh roster, dropping selections of users who left.
    pub fn set_users(&mut self, users: Vec<User>) {
        self.selected.retain(|id| users.iter().any(|u| &u.id == id));
        self.users = users;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Users whose name or role contains the query, ignoring case.
    pub fn filtered(&self) -> Vec<&User> {
        let needle = self.query.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || u.name.to_lowercase().contains(&needle)
                    || u.role.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn toggle(&mut self, user_id: &str) -> bool {
        if let Some(idx) = self.selected.iter().position(|id| id == user_id) {
            self.selected.remove(idx);
            false
        } else {
            self.selected.push(user_id.to_string());
            true
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Hands back the invitees and clears the picker; `None` when nobody is picked.
    pub fn start_quick_meeting(&mut self) -> Option<Vec<String>> {
        if self.selected.is_empty() {
            return None;
        }
        let invitees = std::mem::take(&mut self.selected);
        tracing::info!(count = invitees.len(), "inviting colleagues to a quick meeting");
        Some(invitees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PresenceStatus;

    fn user(id: &str, name: &str, role: &str, status: PresenceStatus) -> User {
        User {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            avatar: String::new(),
            avatar_type: None,
            role: role.into(),
            status,
            position: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn panel() -> OnlinePanel {
        OnlinePanel::new(vec![
            user("2", "Sarah Johnson", "Frontend Developer", PresenceStatus::Online),
            user("3", "Li Ming", "Backend Developer", PresenceStatus::Busy),
            user("6", "John Smith", "DevOps Engineer", PresenceStatus::Online),
        ])
    }

    #[test]
    fn test_search_matches_name_or_role() {
        let mut panel = panel();
        panel.set_query("DEVELOPER");
        let ids: Vec<&str> = panel.filtered().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);

        panel.set_query("smith");
        assert_eq!(panel.filtered().len(), 1);

        panel.set_query("");
        assert_eq!(panel.filtered().len(), 3);
    }

    #[test]
    fn test_quick_meeting_takes_selection() {
        let mut panel = panel();
        assert!(panel.start_quick_meeting().is_none());

        assert!(panel.toggle("2"));
        assert!(panel.toggle("6"));
        assert!(!panel.toggle("2"));
        assert_eq!(panel.selected(), ["6".to_string()]);

        assert_eq!(panel.start_quick_meeting(), Some(vec!["6".to_string()]));
        assert!(panel.selected().is_empty());
    }

    #[test]
    fn test_roster_change_prunes_selection() {
        let mut panel = panel();
        panel.toggle("3");
        panel.toggle("6");
        panel.set_users(vec![user("6", "John Smith", "DevOps Engineer", PresenceStatus::Away)]);
        assert_eq!(panel.selected(), ["6".to_string()]);
    }
}
