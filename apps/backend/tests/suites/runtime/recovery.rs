use std::sync::Arc;
use std::time::Duration;

use orchestrator::ai::SputnikBot;
use orchestrator::domain::actions::PlayerAction;
use orchestrator::domain::types::{MatchMode, MatchStatus};
use orchestrator::errors::domain::{ConflictKind, DomainError};
use orchestrator::repos::matches;
use orchestrator::runtime::clock::now_millis;
use orchestrator::runtime::{ActorDeps, MatchRegistry, NoopObserver};
use orchestrator::services::snapshots;

use super::{act, join_as};
use crate::common::test_state;

const HOST: i64 = 300;
const GUEST: i64 = 301;

#[tokio::test]
async fn evicted_match_reloads_from_storage() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let db = state.db().cloned().expect("test state has a database");
    let registry = state.registry()?;

    let created = state
        .flow
        .create_match(&db, &state.config, MatchMode::FiveKamp, HOST, "host".into(), now_millis())
        .await?;
    let match_id = created.match_id;
    registry.register(created);
    registry.submit(match_id, join_as(GUEST, "guest")).await?;
    let before = registry.state(match_id).await?;

    registry.evict(match_id);
    assert_eq!(registry.live_count(), 0);
    let reloaded = registry.state(match_id).await?;
    assert_eq!(reloaded.as_ref(), before.as_ref());
    assert_eq!(registry.live_count(), 1);

    // A second process over the same storage sees the same match.
    let other = MatchRegistry::new(ActorDeps {
        db: db.clone(),
        flow: state.flow.clone(),
        observer: Arc::new(NoopObserver),
        bots: Arc::new(SputnikBot::new(Some(1))),
        bot_think: Duration::from_millis(0),
        queue_capacity: 8,
    });
    let seen = other.state(match_id).await?;
    assert_eq!(seen.last_seq, 3);

    other.shutdown();
    registry.shutdown();
    Ok(())
}

#[tokio::test]
async fn snapshot_plus_tail_equals_full_replay() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let db = state.db().cloned().expect("test state has a database");
    let registry = state.registry()?;

    let created = state
        .flow
        .create_match(&db, &state.config, MatchMode::FiveKamp, HOST, "host".into(), now_millis())
        .await?;
    let match_id = created.match_id;
    registry.register(created);
    registry.submit(match_id, join_as(GUEST, "guest")).await?;

    let current = registry.state(match_id).await?;
    assert!(snapshots::take(&db, &current).await?);

    registry.submit(match_id, act(HOST, PlayerAction::StartMatch)).await?;

    let full = snapshots::replay_full(&db, match_id).await?;
    let fast = snapshots::rehydrate(&db, match_id).await?;
    assert_eq!(full, fast);
    assert_eq!(fast, *registry.state(match_id).await?);

    registry.shutdown();
    Ok(())
}

/// An operator cancel written behind a live actor's back: the actor's next
/// commit collides on seq, after which it reloads and sees the cancel.
#[tokio::test]
async fn stale_actor_recovers_after_offline_cancel() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let db = state.db().cloned().expect("test state has a database");
    let registry = state.registry()?;

    let created = state
        .flow
        .create_match(&db, &state.config, MatchMode::FiveKamp, HOST, "host".into(), now_millis())
        .await?;
    let match_id = created.match_id;
    registry.register(created);

    let cancelled = state.flow.cancel_offline(&db, match_id, now_millis()).await?;
    assert_eq!(cancelled.status, MatchStatus::Cancelled);

    let err = registry
        .submit(match_id, join_as(GUEST, "guest"))
        .await
        .expect_err("stale actor must not commit");
    assert!(
        matches!(err, DomainError::Conflict(ConflictKind::OutOfOrder, _)),
        "{err:?}"
    );
    assert!(matches::require(&db, match_id).await?.degraded);

    let err = registry
        .submit(match_id, join_as(GUEST, "guest"))
        .await
        .expect_err("cancelled match takes no joins");
    assert!(
        matches!(err, DomainError::Conflict(ConflictKind::MatchNotRunning, _)),
        "{err:?}"
    );
    assert!(!matches::require(&db, match_id).await?.degraded);
    assert_eq!(registry.state(match_id).await?.status, MatchStatus::Cancelled);

    registry.shutdown();
    Ok(())
}
