use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::types::{MemberPresence, User};

/// Last polled roster of one space, in service order.
///
/// Each poll replaces the whole roster. Identities are unique: when the
/// service repeats a member, the record with the newest `lastActive` wins and
/// keeps the slot of the first occurrence.
#[derive(Debug, Default)]
pub struct PresenceCache {
    members: Vec<User>,
    last_active: Vec<DateTime<Utc>>,
    synced: bool,
}

impl PresenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, presences: &[MemberPresence]) {
        let mut slots: HashMap<&str, usize> = HashMap::with_capacity(presences.len());
        let mut members: Vec<User> = Vec::with_capacity(presences.len());
        let mut last_active = Vec::with_capacity(presences.len());

        for presence in presences {
            match slots.get(presence.user_id.as_str()) {
                Some(&idx) => {
                    if presence.last_active > last_active[idx] {
                        members[idx] = User::from_presence(presence);
                        last_active[idx] = presence.last_active;
                    }
                }
                None => {
                    slots.insert(presence.user_id.as_str(), members.len());
                    members.push(User::from_presence(presence));
                    last_active.push(presence.last_active);
                }
            }
        }

        self.members = members;
        self.last_active = last_active;
        self.synced = true;
    }

    pub fn members(&self) -> &[User] {
        &self.members
    }

    /// `true` once any poll has landed, even an empty one.
    pub fn has_synced(&self) -> bool {
        self.synced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::mock::presence;
    use crate::types::Position;
    use chrono::Duration;

    #[test]
    fn test_replace_keeps_service_order() {
        let mut cache = PresenceCache::new();
        assert!(!cache.has_synced());

        cache.replace(&[presence("u3", 10.0, 10.0), presence("u1", 20.0, 20.0)]);
        let ids: Vec<&str> = cache.members().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["u3", "u1"]);
        assert!(cache.has_synced());

        cache.replace(&[]);
        assert!(cache.members().is_empty());
        assert!(cache.has_synced());
    }

    #[test]
    fn test_duplicate_identity_keeps_freshest() {
        let mut stale = presence("u2", 10.0, 10.0);
        stale.last_active = stale.last_active - Duration::seconds(30);
        let fresh = presence("u2", 60.0, 70.0);

        let mut cache = PresenceCache::new();
        cache.replace(&[stale, presence("u1", 1.0, 1.0), fresh]);

        assert_eq!(cache.members().len(), 2);
        assert_eq!(cache.members()[0].id, "u2");
        assert_eq!(cache.members()[0].position, Some(Position::new(60.0, 70.0)));
    }
}
