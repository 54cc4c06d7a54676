//! Discord REST adapters
//!
//! Implements the role and event ports on top of the Discord HTTP API (v10).

mod announcer;
mod client;
mod roles;

pub use announcer::{format_announcement, DiscordAnnouncer, LogEventSink};
pub use client::{DiscordClient, DiscordClientError};
pub use roles::DiscordRoleGateway;
