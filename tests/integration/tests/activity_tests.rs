//! Activity ledger and voice tracking over in-memory ports

use std::collections::HashSet;

use chrono::Duration;
use futures::future::join_all;
use integration_tests::*;
use rankup_core::{DomainError, Snowflake, StatKind};
use rankup_service::dto::{ActivityOutcome, IgnoreReason, MessageEvent, VoiceStateEvent};
use rankup_service::{ActivityService, ServiceError};

fn message(member: Snowflake, roles: &[Snowflake], at: chrono::DateTime<chrono::Utc>) -> MessageEvent {
    MessageEvent {
        member_id: member,
        is_bot: false,
        is_direct: false,
        content: Some("hello".to_string()),
        roles: Some(roles.iter().copied().collect::<HashSet<_>>()),
        joined_at: None,
        at: Some(at),
    }
}

fn voice(
    member: Snowflake,
    old: Option<Snowflake>,
    new: Option<Snowflake>,
    at: chrono::DateTime<chrono::Utc>,
) -> VoiceStateEvent {
    VoiceStateEvent {
        member_id: member,
        is_bot: false,
        old_channel_id: old,
        new_channel_id: new,
        roles: Some([NEWCOMER_ROLE].into_iter().collect()),
        joined_at: None,
        at: Some(at),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adjustments_sum_exactly() {
    let (harness, _clock) = Harness::new();
    let member = Snowflake::new(500);

    let tasks = (0..100).map(|i| {
        let ctx = harness.ctx.clone();
        tokio::spawn(async move {
            let service = ActivityService::new(&ctx);
            if i % 2 == 0 {
                service.add_stats(member, StatKind::Messages, 3).await
            } else {
                service.add_stats(member, StatKind::VoiceMinutes, 7).await
            }
        })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let record = harness.ledger.record(member).unwrap();
    assert_eq!(record.message_count, 150);
    assert_eq!(record.voice_minutes, 350);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_messages_from_many_members() {
    let (harness, _clock) = Harness::new();

    let tasks = (0..40).map(|i| {
        let ctx = harness.ctx.clone();
        tokio::spawn(async move {
            let member = Snowflake::new(1000 + i);
            ActivityService::new(&ctx)
                .on_message(message(member, &[NEWCOMER_ROLE], base_time()))
                .await
        })
    });
    for outcome in join_all(tasks).await {
        assert_eq!(outcome.unwrap(), ActivityOutcome::Counted);
    }

    for i in 0..40 {
        let record = harness.ledger.record(Snowflake::new(1000 + i)).unwrap();
        assert_eq!(record.message_count, 1);
    }
}

#[tokio::test]
async fn test_message_filters_and_gate() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    let member = Snowflake::new(7);

    let mut bot = message(member, &[NEWCOMER_ROLE], base_time());
    bot.is_bot = true;
    assert_eq!(service.on_message(bot).await, ActivityOutcome::ignored(IgnoreReason::Bot));

    let mut dm = message(member, &[NEWCOMER_ROLE], base_time());
    dm.is_direct = true;
    assert_eq!(
        service.on_message(dm).await,
        ActivityOutcome::ignored(IgnoreReason::DirectMessage)
    );

    let mut command = message(member, &[NEWCOMER_ROLE], base_time());
    command.content = Some("/rank".to_string());
    assert_eq!(
        service.on_message(command).await,
        ActivityOutcome::ignored(IgnoreReason::Command)
    );

    // No ladder role at all
    assert_eq!(
        service
            .on_message(message(member, &[Snowflake::new(42)], base_time()))
            .await,
        ActivityOutcome::ignored(IgnoreReason::NotRankingMember)
    );

    // A permission role alone passes the gate
    assert_eq!(
        service
            .on_message(message(member, &[CHAT_PERMISSION_ROLE], base_time()))
            .await,
        ActivityOutcome::Counted
    );

    assert_eq!(harness.ledger.record(member).unwrap().message_count, 1);
}

#[tokio::test]
async fn test_rate_window_counts_one_message_per_second() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    let member = Snowflake::new(8);
    let t0 = base_time();

    let at = |ms: i64| t0 + Duration::milliseconds(ms);
    let outcomes = [
        service.on_message(message(member, &[NEWCOMER_ROLE], at(0))).await,
        service.on_message(message(member, &[NEWCOMER_ROLE], at(400))).await,
        service.on_message(message(member, &[NEWCOMER_ROLE], at(999))).await,
        service.on_message(message(member, &[NEWCOMER_ROLE], at(1000))).await,
        service.on_message(message(member, &[NEWCOMER_ROLE], at(2500))).await,
    ];

    let counted = outcomes
        .iter()
        .filter(|o| **o == ActivityOutcome::Counted)
        .count();
    assert_eq!(counted, 3);
    assert_eq!(outcomes[1], ActivityOutcome::ignored(IgnoreReason::RateLimited));
    assert_eq!(harness.ledger.record(member).unwrap().message_count, 3);
    assert_eq!(harness.ledger.message_history_len(member), 3);
}

#[tokio::test]
async fn test_roles_fetched_when_event_has_none() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    let member = Snowflake::new(9);
    harness.roles.set_roles(member, [MEMBER_ROLE]);

    let mut event = message(member, &[], base_time());
    event.roles = None;
    assert_eq!(service.on_message(event).await, ActivityOutcome::Counted);
}

#[tokio::test]
async fn test_store_failure_drops_message() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    harness.ledger.fail_writes(true);

    let outcome = service
        .on_message(message(Snowflake::new(10), &[NEWCOMER_ROLE], base_time()))
        .await;
    assert_eq!(outcome, ActivityOutcome::Dropped);
}

#[tokio::test]
async fn test_voice_round_trip_truncates_minutes() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    let member = Snowflake::new(11);
    let t0 = base_time();

    assert_eq!(
        service
            .on_voice_state_change(voice(member, None, Some(VOICE_CHANNEL), t0))
            .await,
        ActivityOutcome::SessionOpened
    );
    let outcome = service
        .on_voice_state_change(voice(
            member,
            Some(VOICE_CHANNEL),
            None,
            t0 + Duration::milliseconds(125_000),
        ))
        .await;
    assert_eq!(outcome, ActivityOutcome::SessionClosed { credited_minutes: 2 });
    assert_eq!(harness.ledger.record(member).unwrap().voice_minutes, 2);
    assert_eq!(harness.ledger.session_count(), 1);
}

#[tokio::test]
async fn test_short_voice_session_credits_nothing() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    let member = Snowflake::new(12);
    let t0 = base_time();

    service
        .on_voice_state_change(voice(member, None, Some(VOICE_CHANNEL), t0))
        .await;
    let outcome = service
        .on_voice_state_change(voice(
            member,
            Some(VOICE_CHANNEL),
            None,
            t0 + Duration::milliseconds(30_000),
        ))
        .await;

    assert_eq!(outcome, ActivityOutcome::SessionClosed { credited_minutes: 0 });
    assert_eq!(harness.ledger.record(member).unwrap().voice_minutes, 0);
    assert_eq!(harness.ledger.session_count(), 0);
}

#[tokio::test]
async fn test_voice_move_credits_and_reopens() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    let member = Snowflake::new(13);
    let t0 = base_time();

    service
        .on_voice_state_change(voice(member, None, Some(VOICE_CHANNEL), t0))
        .await;
    let moved = service
        .on_voice_state_change(voice(
            member,
            Some(VOICE_CHANNEL),
            Some(OTHER_VOICE_CHANNEL),
            t0 + Duration::minutes(10),
        ))
        .await;
    assert_eq!(moved, ActivityOutcome::SessionMoved { credited_minutes: 10 });

    let closed = service
        .on_voice_state_change(voice(
            member,
            Some(OTHER_VOICE_CHANNEL),
            None,
            t0 + Duration::minutes(25),
        ))
        .await;
    assert_eq!(closed, ActivityOutcome::SessionClosed { credited_minutes: 15 });
    assert_eq!(harness.ledger.record(member).unwrap().voice_minutes, 25);
}

#[tokio::test]
async fn test_voice_leave_without_join_is_ignored() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);

    let outcome = service
        .on_voice_state_change(voice(Snowflake::new(14), Some(VOICE_CHANNEL), None, base_time()))
        .await;
    assert_eq!(outcome, ActivityOutcome::ignored(IgnoreReason::NoOpenSession));
    assert_eq!(harness.ctx.voice_tracker().open_count(), 0);
}

#[tokio::test]
async fn test_add_and_remove_stats() {
    let (harness, _clock) = Harness::new();
    let service = ActivityService::new(&harness.ctx);
    let member = Snowflake::new(15);

    let added = service.add_stats(member, StatKind::Messages, 20).await.unwrap();
    assert_eq!(added.stats.message_count, 20);

    let removed = service.remove_stats(member, StatKind::Messages, 5).await.unwrap();
    assert_eq!(removed.stats.message_count, 15);

    let err = service
        .remove_stats(member, StatKind::VoiceMinutes, 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(DomainError::InsufficientStats {
            available: 0,
            requested: 1
        })
    ));

    let err = service.add_stats(member, StatKind::Messages, 0).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_stats_of_unknown_member() {
    let (harness, _clock) = Harness::new();
    let err = ActivityService::new(&harness.ctx)
        .stats(Snowflake::new(16))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::MemberNotRegistered(_))));
}
