//! Client core for a virtual office: authentication, spaces, chat and
//! meetings over the REST API, plus the live presence floor.

pub mod api;
mod client;
pub mod config;
pub mod error;
pub mod logs;
pub mod presence;
pub mod session;
pub mod types;
pub mod util;
pub mod views;

pub use client::OfficeClient;
pub use config::OfficeConfig;
pub use error::{OfficeError, Result};
pub use presence::{OfficeEvent, OfficeView, ViewState};
pub use session::SessionHandle;
