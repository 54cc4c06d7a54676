//! Route definitions
//!
//! Platform events are posted under `/events`, operator commands live under
//! `/commands`.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{blacklist, events, health, ranks, schedule, stats};
use crate::state::AppState;

/// Create the router with every route
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/events", event_routes())
        .nest("/commands", command_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// Inbound platform events
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/message", post(events::message_created))
        .route("/voice-state", post(events::voice_state_updated))
        .route("/member-roles", post(events::member_roles_updated))
}

/// Operator commands
fn command_routes() -> Router<AppState> {
    Router::new()
        // Ranks
        .route("/members/:member_id/rank", get(ranks::get_rank))
        .route("/members/:member_id/advance", post(ranks::advance))
        .route("/members/:member_id/derank", post(ranks::derank))
        .route("/members/:member_id/derank-all", post(ranks::derank_all))
        // Stats
        .route(
            "/members/:member_id/stats",
            get(stats::get_stats).post(stats::adjust_stats),
        )
        .route("/reset", post(stats::force_reset))
        // Blacklist
        .route("/blacklist", get(blacklist::list_blacklist))
        .route(
            "/blacklist/:member_id",
            get(blacklist::get_entry)
                .put(blacklist::add_to_blacklist)
                .delete(blacklist::remove_from_blacklist),
        )
        // Reset schedule
        .route("/schedule", get(schedule::get_schedule).put(schedule::set_schedule))
}
