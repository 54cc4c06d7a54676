//! Rank advancement, deranking and role sync against a recording role gateway

use std::collections::HashSet;

use chrono::Duration;
use integration_tests::*;
use rankup_core::{DomainError, DomainEvent, Snowflake};
use rankup_service::dto::{BlacklistRequest, MemberRolesEvent};
use rankup_service::{
    AdvancementService, BlacklistService, RankService, RoleSyncService, ServiceError,
};

const MEMBER: Snowflake = Snowflake::new(77);

fn roles(ids: &[Snowflake]) -> HashSet<Snowflake> {
    ids.iter().copied().collect()
}

fn domain(err: &ServiceError) -> &DomainError {
    err.as_domain()
        .unwrap_or_else(|| panic!("expected a domain error, got {err:?}"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_advances_grant_once() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 150, 0);
    harness.roles.set_roles(MEMBER, [NEWCOMER_ROLE]);

    let first = {
        let ctx = harness.ctx.clone();
        tokio::spawn(async move { AdvancementService::new(&ctx).attempt_advance(MEMBER).await })
    };
    let second = {
        let ctx = harness.ctx.clone();
        tokio::spawn(async move { AdvancementService::new(&ctx).attempt_advance(MEMBER).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(domain(failure), DomainError::OnCooldown { .. }));

    assert_eq!(harness.roles.grants_of(MEMBER_ROLE), 1);
    assert_eq!(harness.roles.grants_of(REGULAR_ROLE), 0);
    assert_eq!(harness.sink.count("RANK_ADVANCED"), 1);
}

#[tokio::test]
async fn test_advance_swaps_rank_and_grants_permission() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 0, 300);
    harness.roles.set_roles(MEMBER, [NEWCOMER_ROLE]);

    let outcome = AdvancementService::new(&harness.ctx)
        .attempt_advance(MEMBER)
        .await
        .unwrap();

    assert_eq!((outcome.from_rank, outcome.to_rank), (0, 1));
    assert_eq!(outcome.rank_name, "Member");
    assert!(!outcome.entry_role_assigned);
    assert_eq!(outcome.granted_roles, vec![MEMBER_ROLE, CHAT_PERMISSION_ROLE]);
    assert_eq!(outcome.revoked_roles, vec![NEWCOMER_ROLE]);
    assert!(outcome.role_failures.is_empty());

    assert_eq!(
        harness.roles.roles_of(MEMBER),
        roles(&[MEMBER_ROLE, CHAT_PERMISSION_ROLE])
    );
    let record = harness.ledger.record(MEMBER).unwrap();
    assert_eq!(record.last_advance_at, Some(base_time()));

    match &harness.sink.events()[..] {
        [DomainEvent::RankAdvanced(event)] => {
            assert_eq!(event.member_id, MEMBER);
            assert_eq!(event.to_rank, 1);
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn test_member_without_rank_gets_entry_role_first() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 100, 0);

    let outcome = AdvancementService::new(&harness.ctx)
        .attempt_advance(MEMBER)
        .await
        .unwrap();

    assert!(outcome.entry_role_assigned);
    assert_eq!((outcome.from_rank, outcome.to_rank), (0, 1));
    assert_eq!(
        harness.roles.calls(),
        vec![
            RoleCall::Grant(MEMBER, NEWCOMER_ROLE),
            RoleCall::Grant(MEMBER, MEMBER_ROLE),
            RoleCall::Grant(MEMBER, CHAT_PERMISSION_ROLE),
            RoleCall::Revoke(MEMBER, NEWCOMER_ROLE),
        ]
    );
}

#[tokio::test]
async fn test_cooldown_blocks_until_elapsed() {
    let (harness, clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 100, 0);
    harness.roles.set_roles(MEMBER, [NEWCOMER_ROLE]);
    let service = AdvancementService::new(&harness.ctx);

    service.attempt_advance(MEMBER).await.unwrap();
    harness.ledger.set_counters(MEMBER, 400, 700);

    let err = service.attempt_advance(MEMBER).await.unwrap_err();
    assert!(matches!(
        domain(&err),
        DomainError::OnCooldown {
            remaining_secs: 172_800
        }
    ));

    clock.advance(Duration::hours(47));
    let err = service.attempt_advance(MEMBER).await.unwrap_err();
    assert!(matches!(
        domain(&err),
        DomainError::OnCooldown {
            remaining_secs: 3600
        }
    ));

    clock.advance(Duration::hours(1));
    let outcome = service.attempt_advance(MEMBER).await.unwrap();
    assert_eq!(outcome.rank_name, "Regular");
    // Member and Regular share the chat tier
    assert_eq!(outcome.granted_roles, vec![REGULAR_ROLE]);
    assert_eq!(outcome.revoked_roles, vec![MEMBER_ROLE]);
    assert!(harness.roles.roles_of(MEMBER).contains(&CHAT_PERMISSION_ROLE));
}

#[tokio::test]
async fn test_requirements_not_met_reports_remaining() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 120, 300);
    harness.roles.set_roles(MEMBER, [MEMBER_ROLE, CHAT_PERMISSION_ROLE]);

    let err = AdvancementService::new(&harness.ctx)
        .attempt_advance(MEMBER)
        .await
        .unwrap_err();

    assert!(matches!(
        domain(&err),
        DomainError::RequirementsNotMet {
            remaining_messages: 180,
            remaining_voice_minutes: 300
        }
    ));
    assert!(harness.roles.calls().is_empty());
    assert_eq!(harness.ledger.record(MEMBER).unwrap().last_advance_at, None);
}

#[tokio::test]
async fn test_blacklisted_member_cannot_advance() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 5000, 5000);
    harness.roles.set_roles(MEMBER, [NEWCOMER_ROLE]);

    BlacklistService::new(&harness.ctx)
        .add(MEMBER, BlacklistRequest::default())
        .await
        .unwrap();

    let err = AdvancementService::new(&harness.ctx)
        .attempt_advance(MEMBER)
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::MemberBlacklisted(_)));
    assert!(harness.roles.calls().is_empty());
}

#[tokio::test]
async fn test_advance_edge_cases() {
    let (harness, _clock) = Harness::new();
    let service = AdvancementService::new(&harness.ctx);

    let err = service.attempt_advance(MEMBER).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::MemberNotRegistered(_)));

    harness.ledger.set_counters(MEMBER, 5000, 5000);
    harness.roles.set_roles(MEMBER, [VETERAN_ROLE, MEDIA_PERMISSION_ROLE]);
    let err = service.attempt_advance(MEMBER).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::AlreadyMaxRank));
}

#[tokio::test]
async fn test_failed_rank_grant_changes_nothing() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 100, 0);
    harness.roles.set_roles(MEMBER, [NEWCOMER_ROLE]);
    harness.roles.fail_role(MEMBER_ROLE);

    let err = AdvancementService::new(&harness.ctx)
        .attempt_advance(MEMBER)
        .await
        .unwrap_err();

    assert!(matches!(domain(&err), DomainError::RoleSideEffect(_)));
    assert_eq!(harness.roles.roles_of(MEMBER), roles(&[NEWCOMER_ROLE]));
    assert_eq!(harness.ledger.record(MEMBER).unwrap().last_advance_at, None);
    assert_eq!(harness.sink.count("RANK_ADVANCED"), 0);
}

#[tokio::test]
async fn test_failed_permission_grant_is_reported() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 100, 0);
    harness.roles.set_roles(MEMBER, [NEWCOMER_ROLE]);
    harness.roles.fail_role(CHAT_PERMISSION_ROLE);

    let outcome = AdvancementService::new(&harness.ctx)
        .attempt_advance(MEMBER)
        .await
        .unwrap();

    assert_eq!(outcome.granted_roles, vec![MEMBER_ROLE]);
    assert_eq!(outcome.role_failures.len(), 1);
    assert_eq!(outcome.role_failures[0].role_id, CHAT_PERMISSION_ROLE);
    assert!(harness.ledger.record(MEMBER).unwrap().last_advance_at.is_some());
}

#[tokio::test]
async fn test_derank_steps_down_one_rung() {
    let (harness, _clock) = Harness::new();
    harness.roles.set_roles(MEMBER, [REGULAR_ROLE, CHAT_PERMISSION_ROLE]);
    let service = AdvancementService::new(&harness.ctx);

    let outcome = service.derank(MEMBER).await.unwrap();
    assert_eq!((outcome.from_rank, outcome.to_rank), (2, 1));
    assert_eq!(outcome.granted_roles, vec![MEMBER_ROLE]);
    assert_eq!(outcome.revoked_roles, vec![REGULAR_ROLE]);

    // Newcomer has no permission tier, so the chat role goes too
    let outcome = service.derank(MEMBER).await.unwrap();
    assert_eq!(outcome.rank_name, "Newcomer");
    assert_eq!(outcome.revoked_roles, vec![MEMBER_ROLE, CHAT_PERMISSION_ROLE]);
    assert_eq!(harness.roles.roles_of(MEMBER), roles(&[NEWCOMER_ROLE]));

    let err = service.derank(MEMBER).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::AlreadyLowestRank));

    let err = service.derank(Snowflake::new(78)).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::NoRankRoles));

    assert_eq!(harness.sink.count("RANK_LOWERED"), 2);
}

#[tokio::test]
async fn test_derank_all_removes_ladder_roles_only() {
    let (harness, _clock) = Harness::new();
    let unrelated = Snowflake::new(999);
    harness
        .roles
        .set_roles(MEMBER, [REGULAR_ROLE, CHAT_PERMISSION_ROLE, unrelated]);
    let service = AdvancementService::new(&harness.ctx);

    let outcome = service.derank_all(MEMBER).await.unwrap();
    assert_eq!(
        outcome.removed_roles.iter().copied().collect::<HashSet<_>>(),
        roles(&[REGULAR_ROLE, CHAT_PERMISSION_ROLE])
    );
    assert!(outcome.role_failures.is_empty());
    assert_eq!(harness.roles.roles_of(MEMBER), roles(&[unrelated]));
    assert_eq!(harness.sink.count("RANKS_CLEARED"), 1);

    let err = service.derank_all(MEMBER).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::NoRankRoles));
}

#[tokio::test]
async fn test_derank_all_partial_and_total_failure() {
    let (harness, _clock) = Harness::new();
    harness.roles.set_roles(MEMBER, [MEMBER_ROLE, CHAT_PERMISSION_ROLE]);
    harness.roles.fail_role(CHAT_PERMISSION_ROLE);
    let service = AdvancementService::new(&harness.ctx);

    let outcome = service.derank_all(MEMBER).await.unwrap();
    assert_eq!(outcome.removed_roles, vec![MEMBER_ROLE]);
    assert_eq!(outcome.role_failures.len(), 1);

    // Only the failing role is left
    let err = service.derank_all(MEMBER).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::RoleSideEffect(_)));
}

#[tokio::test]
async fn test_role_sync_grants_missing_permission() {
    let (harness, _clock) = Harness::new();
    let service = RoleSyncService::new(&harness.ctx);

    let outcome = service
        .on_roles_changed(MemberRolesEvent {
            member_id: MEMBER,
            is_bot: false,
            old_roles: roles(&[NEWCOMER_ROLE]),
            new_roles: roles(&[NEWCOMER_ROLE, REGULAR_ROLE]),
        })
        .await;
    assert_eq!(outcome.granted_roles, vec![CHAT_PERMISSION_ROLE]);

    // Already held
    let outcome = service
        .on_roles_changed(MemberRolesEvent {
            member_id: MEMBER,
            is_bot: false,
            old_roles: roles(&[]),
            new_roles: roles(&[VETERAN_ROLE, MEDIA_PERMISSION_ROLE]),
        })
        .await;
    assert!(outcome.granted_roles.is_empty());

    // Entry rung links no tier
    let outcome = service
        .on_roles_changed(MemberRolesEvent {
            member_id: MEMBER,
            is_bot: false,
            old_roles: roles(&[]),
            new_roles: roles(&[NEWCOMER_ROLE]),
        })
        .await;
    assert!(outcome.granted_roles.is_empty());

    assert_eq!(harness.roles.calls().len(), 1);
}

#[tokio::test]
async fn test_rank_view_reports_progress() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 150, 120);
    harness.roles.set_roles(MEMBER, [MEMBER_ROLE, CHAT_PERMISSION_ROLE]);

    let view = RankService::new(&harness.ctx).rank_view(MEMBER).await.unwrap();

    assert_eq!(view.current_rank.as_ref().unwrap().name, "Member");
    assert_eq!(view.voice_hours, 2.0);
    assert!(!view.is_max_rank);
    assert!(!view.on_cooldown);
    assert!(!view.can_advance);
    assert!(!view.blacklisted);

    let next = view.next_rank.unwrap();
    assert_eq!(next.name, "Regular");
    assert_eq!(next.messages.remaining, 150);
    assert_eq!(next.voice.remaining, 480);
    // And mode follows the lagging threshold
    assert!((view.overall_percent - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_rank_view_for_blacklisted_member() {
    let (harness, _clock) = Harness::new();
    harness.ledger.set_counters(MEMBER, 200, 0);
    harness.roles.set_roles(MEMBER, [NEWCOMER_ROLE]);
    BlacklistService::new(&harness.ctx)
        .add(MEMBER, BlacklistRequest::default())
        .await
        .unwrap();

    let view = RankService::new(&harness.ctx).rank_view(MEMBER).await.unwrap();
    assert!(view.blacklisted);
    assert!(!view.can_advance);
    assert!(view.next_rank.unwrap().meets_thresholds);
}
