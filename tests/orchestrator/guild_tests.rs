//! CreateGuild and GetJoinedGuilds

use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;

use tranquility::application::services::GuildService;
use tranquility::application::{ErrorKind, ServiceError};
use tranquility::domain::{Channel, Guild};

use crate::common::{cancelled_ctx, ctx, Harness};

// ============================================================================
// CreateGuild
// ============================================================================

#[tokio::test]
async fn test_create_guild_then_list_joined() {
    let h = Harness::new();

    let created = h
        .orchestrator
        .create_guild(&ctx(), Guild::new("Rustaceans").with_description("crabs"), 42)
        .await
        .unwrap();

    assert!(created.id > 0);
    assert_eq!(created.owner_id, 42);
    assert_eq!(created.description.as_deref(), Some("crabs"));
    assert!(h.guilds.is_member(created.id, 42));
    assert_eq!(h.guilds.tx.commits(), 1);
    assert!(h.guilds.tx.all_finished());

    let general = h.guilds.add_channel(created.id, "general");
    let random = h.guilds.add_channel(created.id, "random");

    let joined = h.orchestrator.get_joined_guilds(&ctx(), 42).await.unwrap();

    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].id, created.id);
    assert_eq!(joined[0].name, "Rustaceans");
    assert_eq!(joined[0].channels, vec![general, random]);
}

#[tokio::test]
async fn test_create_guild_owner_comes_from_caller() {
    let h = Harness::new();
    let mut guild = Guild::new("Spoofed");
    guild.owner_id = 1;
    guild.channels = vec![Channel::new(99, 99, "smuggled")];

    let created = h.orchestrator.create_guild(&ctx(), guild, 5).await.unwrap();

    assert!(created.is_owner(5));
    assert!(created.channels.is_empty());
    assert!(h.guilds.is_member(created.id, 5));
    assert!(!h.guilds.is_member(created.id, 1));
}

#[tokio::test]
async fn test_create_guild_membership_failure_leaves_nothing() {
    let h = Harness::new();
    h.guilds.fail_add_member.store(true, Ordering::SeqCst);

    let err = h
        .orchestrator
        .create_guild(&ctx(), Guild::new("Doomed"), 42)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Step { step: "adding guild member", .. }));
    assert_eq!(h.guilds.guild_count(), 0);
    assert_eq!(h.guilds.member_count(), 0);
    assert_eq!(h.guilds.tx.commits(), 0);
    assert_eq!(h.guilds.tx.rollbacks(), 1);
    assert!(h.guilds.tx.all_finished());
    assert!(h.orchestrator.get_joined_guilds(&ctx(), 42).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_guild_insert_failure_opens_no_transaction() {
    let h = Harness::new();
    h.guilds.fail_insert.store(true, Ordering::SeqCst);

    let err = h
        .orchestrator
        .create_guild(&ctx(), Guild::new("Doomed"), 42)
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("an error occurred while creating guild"));
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(h.guilds.tx.begun(), 0);
    assert_eq!(h.events(), vec!["guilds.insert"]);
}

#[tokio::test]
async fn test_create_guild_commit_failure() {
    let h = Harness::new();
    h.guilds.tx.fail_commit.store(true, Ordering::SeqCst);

    let err = h
        .orchestrator
        .create_guild(&ctx(), Guild::new("Doomed"), 42)
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("failed to commit transaction"));
    assert_eq!(err.kind(), ErrorKind::TransactionFailure);
    assert_eq!(h.guilds.guild_count(), 0);
    assert_eq!(h.guilds.member_count(), 0);
}

#[tokio::test]
async fn test_create_guild_rollback_failure_reports_both() {
    let h = Harness::new();
    h.guilds.fail_add_member.store(true, Ordering::SeqCst);
    h.guilds.tx.fail_rollback.store(true, Ordering::SeqCst);

    let err = h
        .orchestrator
        .create_guild(&ctx(), Guild::new("Doomed"), 42)
        .await
        .unwrap_err();

    match &err {
        ServiceError::Rollback { cause, .. } => {
            assert!(matches!(**cause, ServiceError::Step { step: "adding guild member", .. }))
        }
        other => panic!("expected rollback error, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::TransactionFailure);
    assert_eq!(h.guilds.guild_count(), 0);
}

#[tokio::test]
async fn test_create_guild_on_cancelled_context() {
    let h = Harness::new();

    let err = h
        .orchestrator
        .create_guild(&cancelled_ctx(), Guild::new("Never"), 42)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(h.guilds.tx.begun(), 0);
    assert_eq!(h.guilds.guild_count(), 0);
}

#[tokio::test]
async fn test_concurrent_guild_creation() {
    let h = Harness::new();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let orchestrator = h.orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .create_guild(&ctx(), Guild::new(format!("guild-{i}")), 42)
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 16);
    assert_eq!(h.guilds.guild_count(), 16);
    assert_eq!(h.guilds.member_count(), 16);
    assert!(h.guilds.tx.all_finished());
}

// ============================================================================
// GetJoinedGuilds
// ============================================================================

#[tokio::test]
async fn test_joined_guilds_only_lists_memberships_in_id_order() {
    let h = Harness::new();
    let first = h.orchestrator.create_guild(&ctx(), Guild::new("first"), 1).await.unwrap();
    let other = h.orchestrator.create_guild(&ctx(), Guild::new("other"), 2).await.unwrap();
    let third = h.orchestrator.create_guild(&ctx(), Guild::new("third"), 2).await.unwrap();
    h.guilds.join(third.id, 1);
    h.guilds.add_channel(other.id, "private");

    let joined = h.orchestrator.get_joined_guilds(&ctx(), 1).await.unwrap();

    let ids: Vec<i64> = joined.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);
    assert!(joined.iter().all(|g| g.channels.is_empty()));
}

#[tokio::test]
async fn test_joined_guilds_for_user_without_memberships() {
    let h = Harness::new();
    h.orchestrator.create_guild(&ctx(), Guild::new("g"), 1).await.unwrap();

    let joined = h.orchestrator.get_joined_guilds(&ctx(), 99).await.unwrap();

    assert!(joined.is_empty());
}

#[tokio::test]
async fn test_joined_guilds_channel_failure_fails_whole_read() {
    let h = Harness::new();
    h.orchestrator.create_guild(&ctx(), Guild::new("a"), 1).await.unwrap();
    let broken = h.orchestrator.create_guild(&ctx(), Guild::new("b"), 1).await.unwrap();
    h.guilds.fail_channels_for.store(broken.id, Ordering::SeqCst);

    let err = h.orchestrator.get_joined_guilds(&ctx(), 1).await.unwrap_err();

    assert!(matches!(err, ServiceError::Step { step: "fetching guild channels", .. }));
}

#[tokio::test]
async fn test_joined_guilds_on_cancelled_context() {
    let h = Harness::new();
    h.orchestrator.create_guild(&ctx(), Guild::new("a"), 1).await.unwrap();

    let err = h
        .orchestrator
        .get_joined_guilds(&cancelled_ctx(), 1)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("fetching joined guilds"));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}
