//! Local state behind each page of the client. None of these touch the
//! network; the office floor lives in [`crate::presence`].

pub mod app;
pub mod chat;
pub mod meeting;
pub mod online;

pub use app::{ActiveView, AppShell};
pub use chat::{ChatLine, ChatView};
pub use meeting::{MeetingView, Seat};
pub use online::OnlinePanel;
