use serde::Serialize;

use crate::types::User;

/// A seat in the mock meeting grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub user: User,
    pub is_muted: bool,
    pub is_video_on: bool,
    pub is_sharing_screen: bool,
    pub is_hand_raised: bool,
}

impl Seat {
    fn new(user: User) -> Self {
        Self {
            user,
            is_muted: false,
            is_video_on: true,
            is_sharing_screen: false,
            is_hand_raised: false,
        }
    }
}

/// Meeting room with local-only media controls. No media is captured; the
/// toggles only drive what the room shows.
#[derive(Debug)]
pub struct MeetingView {
    seats: Vec<Seat>,
    joined: bool,
}

impl MeetingView {
    /// The local user always takes the first seat.
    pub fn new(current_user: User, others: Vec<User>) -> Self {
        let local_id = current_user.id.clone();
        let mut seats = vec![Seat::new(current_user)];
        seats.extend(others.into_iter().filter(|u| u.id != local_id).map(Seat::new));
        Self {
            seats,
            joined: true,
        }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn local(&self) -> &Seat {
        &self.seats[0]
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn participant_count(&self) -> usize {
        self.seats.len()
    }

    pub fn toggle_mute(&mut self) -> bool {
        let seat = &mut self.seats[0];
        seat.is_muted = !seat.is_muted;
        seat.is_muted
    }

    pub fn toggle_video(&mut self) -> bool {
        let seat = &mut self.seats[0];
        seat.is_video_on = !seat.is_video_on;
        seat.is_video_on
    }

    pub fn toggle_screen_share(&mut self) -> bool {
        let seat = &mut self.seats[0];
        seat.is_sharing_screen = !seat.is_sharing_screen;
        seat.is_sharing_screen
    }

    pub fn toggle_hand(&mut self) -> bool {
        let seat = &mut self.seats[0];
        seat.is_hand_raised = !seat.is_hand_raised;
        seat.is_hand_raised
    }

    /// First seat currently sharing, which the room shows full-width.
    pub fn sharing_participant(&self) -> Option<&Seat> {
        self.seats.iter().find(|s| s.is_sharing_screen)
    }

    /// Marks a remote seat as sharing, e.g. for the sample room.
    pub fn set_sharing(&mut self, user_id: &str, sharing: bool) {
        if let Some(seat) = self.seats.iter_mut().find(|s| s.user.id == user_id) {
            seat.is_sharing_screen = sharing;
        }
    }

    /// Leaves the room. Returns `false` if already left.
    pub fn leave(&mut self) -> bool {
        std::mem::replace(&mut self.joined, false)
    }
}
