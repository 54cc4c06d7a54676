//! # rankup-gateway
//!
//! HTTP surface of the rank bot: inbound platform events, operator commands,
//! and the Discord REST adapters behind the role and announcement ports.

pub mod discord;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
