use std::collections::HashSet;

use crate::types::User;

/// Display roster for the office floor: the cached members with the local
/// user substituted for its own (possibly stale) cached entry, or appended
/// when the cache does not know it yet.
///
/// Pure and order-stable: the same inputs always give the same list. Repeated
/// identities in `cached` collapse to their first occurrence.
pub fn reconcile(cached: &[User], local: &User) -> Vec<User> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(cached.len() + 1);
    let mut roster = Vec::with_capacity(cached.len() + 1);

    for member in cached {
        if !seen.insert(member.id.as_str()) {
            continue;
        }
        if member.id == local.id {
            roster.push(local.clone());
        } else {
            roster.push(member.clone());
        }
    }

    if !seen.contains(local.id.as_str()) {
        roster.push(local.clone());
    }
    roster
}

pub fn online_count(roster: &[User]) -> usize {
    roster.iter().filter(|u| u.is_online()).count()
}
