//! HTTP surface tests
//!
//! Each test serves the full router over in-memory ports on an ephemeral port.

use anyhow::Result;
use integration_tests::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health / events
// ============================================================================

#[tokio::test]
async fn test_health_needs_no_token() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start_with_token(&harness).await?;

    let body: Value = assert_json(server.get_anonymous("/health").await?, StatusCode::OK).await?;
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_message_events_are_counted_once_per_window() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let event = json!({
        "member_id": "501",
        "content": "hello there",
        "roles": [NEWCOMER_ROLE.to_string()],
        "at": "2026-01-01T00:00:00Z",
    });

    let body: Value =
        assert_json(server.post("/events/message", &event).await?, StatusCode::OK).await?;
    assert_eq!(body["outcome"], "counted");

    let body: Value =
        assert_json(server.post("/events/message", &event).await?, StatusCode::OK).await?;
    assert_eq!(body["outcome"], "ignored");
    assert_eq!(body["reason"], "rate_limited");

    let body: Value = assert_json(
        server
            .post("/events/message", &json!({"member_id": "501", "is_bot": true}))
            .await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(body["reason"], "bot");

    Ok(())
}

#[tokio::test]
async fn test_voice_events_credit_minutes() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let join = json!({
        "member_id": "502",
        "new_channel_id": VOICE_CHANNEL.to_string(),
        "roles": [NEWCOMER_ROLE.to_string()],
        "at": "2026-01-01T10:00:00Z",
    });
    let leave = json!({
        "member_id": "502",
        "old_channel_id": VOICE_CHANNEL.to_string(),
        "at": "2026-01-01T10:03:59Z",
    });

    let body: Value =
        assert_json(server.post("/events/voice-state", &join).await?, StatusCode::OK).await?;
    assert_eq!(body["outcome"], "session_opened");

    let body: Value =
        assert_json(server.post("/events/voice-state", &leave).await?, StatusCode::OK).await?;
    assert_eq!(body["outcome"], "session_closed");
    assert_eq!(body["credited_minutes"], 3);

    let stats: Value = assert_json(
        server.get("/commands/members/502/stats").await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(stats["voice_minutes"], 3);
    assert_eq!(stats["member_id"], "502");
    Ok(())
}

#[tokio::test]
async fn test_member_roles_event_syncs_permission() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let body: Value = assert_json(
        server
            .post(
                "/events/member-roles",
                &json!({
                    "member_id": "503",
                    "old_roles": [],
                    "new_roles": [REGULAR_ROLE.to_string()],
                }),
            )
            .await?,
        StatusCode::OK,
    )
    .await?;

    assert_eq!(body["granted_roles"], json!([CHAT_PERMISSION_ROLE.to_string()]));
    assert_eq!(harness.roles.grants_of(CHAT_PERMISSION_ROLE), 1);
    Ok(())
}

#[tokio::test]
async fn test_malformed_event_body() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let response = server
        .post("/events/message", &json!({"content": "no member"}))
        .await?;
    assert_eq!(
        assert_error_code(response, StatusCode::BAD_REQUEST).await?,
        "INVALID_BODY"
    );

    let response = server
        .client
        .post(format!("{}/events/message", server.base_url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(
        assert_error_code(response, StatusCode::BAD_REQUEST).await?,
        "INVALID_BODY"
    );
    Ok(())
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_commands_require_token_when_configured() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start_with_token(&harness).await?;

    let response = server.get_anonymous("/commands/blacklist").await?;
    assert_eq!(
        assert_error_code(response, StatusCode::UNAUTHORIZED).await?,
        "MISSING_AUTHORIZATION"
    );

    let response = server
        .client
        .get(format!("{}/commands/blacklist", server.base_url()))
        .bearer_auth("not-the-token")
        .send()
        .await?;
    assert_eq!(
        assert_error_code(response, StatusCode::UNAUTHORIZED).await?,
        "INVALID_TOKEN"
    );

    let entries: Vec<Value> =
        assert_json(server.get("/commands/blacklist").await?, StatusCode::OK).await?;
    assert!(entries.is_empty());
    Ok(())
}

// ============================================================================
// Rank commands
// ============================================================================

#[tokio::test]
async fn test_rank_of_unknown_member() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let response = server.get("/commands/members/600/rank").await?;
    assert_eq!(
        assert_error_code(response, StatusCode::NOT_FOUND).await?,
        "NOT_REGISTERED"
    );

    let response = server.get("/commands/members/not-a-number/rank").await?;
    assert_eq!(
        assert_error_code(response, StatusCode::BAD_REQUEST).await?,
        "INVALID_PATH_PARAMETER"
    );
    Ok(())
}

#[tokio::test]
async fn test_stats_then_advance_then_cooldown() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let adjusted: Value = assert_json(
        server
            .post(
                "/commands/members/700/stats",
                &json!({"operation": "add", "kind": "messages", "amount": 150}),
            )
            .await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(adjusted["stats"]["message_count"], 150);

    let advanced: Value = assert_json(
        server.post_empty("/commands/members/700/advance").await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(advanced["to_rank"], 1);
    assert_eq!(advanced["rank_name"], "Member");
    assert_eq!(advanced["entry_role_assigned"], true);

    let response = server.post_empty("/commands/members/700/advance").await?;
    let body: Value = assert_json(response, StatusCode::CONFLICT).await?;
    assert_eq!(body["error"]["code"], "ON_COOLDOWN");
    assert_eq!(body["error"]["details"]["remaining_secs"], 48 * 3600);

    let view: Value = assert_json(
        server.get("/commands/members/700/rank").await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(view["current_rank"]["name"], "Member");
    assert_eq!(view["on_cooldown"], true);
    assert_eq!(view["can_advance"], false);
    Ok(())
}

#[tokio::test]
async fn test_stat_adjustment_errors() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let response = server
        .post(
            "/commands/members/701/stats",
            &json!({"operation": "add", "kind": "messages", "amount": 0}),
        )
        .await?;
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"].get("amount").is_some());

    harness.ledger.set_counters(rankup_core::Snowflake::new(701), 3, 0);
    let response = server
        .post(
            "/commands/members/701/stats",
            &json!({"operation": "remove", "kind": "messages", "amount": 5}),
        )
        .await?;
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STATS");
    assert_eq!(body["error"]["details"]["available"], 3);
    Ok(())
}

#[tokio::test]
async fn test_derank_routes() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;
    let member = rankup_core::Snowflake::new(702);
    harness
        .roles
        .set_roles(member, [MEMBER_ROLE, CHAT_PERMISSION_ROLE]);

    let body: Value = assert_json(
        server.post_empty("/commands/members/702/derank").await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(body["rank_name"], "Newcomer");

    let response = server.post_empty("/commands/members/702/derank").await?;
    assert_eq!(
        assert_error_code(response, StatusCode::CONFLICT).await?,
        "ALREADY_LOWEST_RANK"
    );

    let body: Value = assert_json(
        server.post_empty("/commands/members/702/derank-all").await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(body["removed_roles"], json!([NEWCOMER_ROLE.to_string()]));
    assert!(harness.roles.roles_of(member).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_force_reset_route() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;
    harness.ledger.set_counters(rankup_core::Snowflake::new(703), 10, 10);

    let report: Value =
        assert_json(server.post_empty("/commands/reset").await?, StatusCode::OK).await?;
    assert_eq!(report["affected_members"], 1);
    assert!(report["boundary"].is_null());
    assert_eq!(harness.sink.count("STATS_RESET"), 1);
    Ok(())
}

// ============================================================================
// Blacklist / schedule
// ============================================================================

#[tokio::test]
async fn test_blacklist_lifecycle() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let entry: Value = assert_json(
        server
            .put(
                "/commands/blacklist/800",
                &json!({"reason": "  spam  ", "issued_by": "1"}),
            )
            .await?,
        StatusCode::CREATED,
    )
    .await?;
    assert_eq!(entry["member_id"], "800");
    assert_eq!(entry["reason"], "spam");

    let response = server.put("/commands/blacklist/800", &json!({})).await?;
    assert_eq!(
        assert_error_code(response, StatusCode::CONFLICT).await?,
        "ALREADY_BLACKLISTED"
    );

    let entries: Vec<Value> =
        assert_json(server.get("/commands/blacklist").await?, StatusCode::OK).await?;
    assert_eq!(entries.len(), 1);

    let response = server.post_empty("/commands/members/800/advance").await?;
    assert_eq!(
        assert_error_code(response, StatusCode::FORBIDDEN).await?,
        "BLACKLISTED"
    );

    assert_status(server.delete("/commands/blacklist/800").await?, StatusCode::NO_CONTENT).await?;

    let response = server.delete("/commands/blacklist/800").await?;
    assert_eq!(
        assert_error_code(response, StatusCode::NOT_FOUND).await?,
        "NOT_BLACKLISTED"
    );
    assert_eq!(harness.sink.count("MEMBER_UNBLACKLISTED"), 1);
    Ok(())
}

#[tokio::test]
async fn test_schedule_routes() -> Result<()> {
    let (harness, _clock) = Harness::new();
    let server = TestServer::start(&harness).await?;

    let response = server.get("/commands/schedule").await?;
    assert_eq!(
        assert_error_code(response, StatusCode::NOT_FOUND).await?,
        "SCHEDULE_NOT_CONFIGURED"
    );

    let response = server
        .put(
            "/commands/schedule",
            &json!({"first_boundary": "2020-01-01T00:00:00Z"}),
        )
        .await?;
    assert_eq!(
        assert_error_code(response, StatusCode::BAD_REQUEST).await?,
        "VALIDATION_ERROR"
    );

    let response = server
        .put(
            "/commands/schedule",
            &json!({"first_boundary": "01-02", "interval_days": 0}),
        )
        .await?;
    assert_eq!(
        assert_error_code(response, StatusCode::BAD_REQUEST).await?,
        "VALIDATION_ERROR"
    );

    let schedule: Value = assert_json(
        server
            .put(
                "/commands/schedule",
                &json!({"first_boundary": "01-02", "interval_days": 7}),
            )
            .await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(schedule["next_reset_at"], "2026-02-01T00:00:00Z");
    assert_eq!(schedule["interval_days"], 7);

    let current: Value =
        assert_json(server.get("/commands/schedule").await?, StatusCode::OK).await?;
    assert_eq!(current, schedule);
    assert!(server.scheduler.is_armed());

    server.scheduler.cancel();
    Ok(())
}
