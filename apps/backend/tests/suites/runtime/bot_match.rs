use std::time::Duration;

use orchestrator::domain::actions::PlayerAction;
use orchestrator::domain::match_state::MatchState;
use orchestrator::domain::types::{MatchMode, MatchStatus};
use orchestrator::runtime::clock::now_millis;
use orchestrator::services::snapshots;

use super::act;
use crate::common::test_state;

const HOST: i64 = 100;

/// The host starts a match and walks away; the house bots must carry it to
/// the end through the live actor, deadlines included.
#[tokio::test]
async fn abandoned_match_is_finished_by_bots() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let db = state.db().cloned().expect("test state has a database");
    let registry = state.registry()?;

    let created = state
        .flow
        .create_match(&db, &state.config, MatchMode::ChickenRun, HOST, "host".into(), now_millis())
        .await?;
    let match_id = created.match_id;
    let handle = registry.register(created);

    registry.submit(match_id, act(HOST, PlayerAction::StartMatch)).await?;
    registry.submit(match_id, act(HOST, PlayerAction::Leave)).await?;

    let mut updates = handle.subscribe();
    let finished = tokio::time::timeout(
        Duration::from_secs(120),
        updates.wait_for(|s| s.status.is_terminal()),
    )
    .await?
    .map(|s| s.clone())?;

    assert_eq!(finished.status, MatchStatus::Completed);
    assert!(finished.is_conserved());
    let host_seat = finished.seat_of(HOST).expect("host keeps a seat");
    assert!(finished.player(host_seat).is_some_and(|p| p.left));

    let report = snapshots::verify(&db, match_id).await?;
    assert!(report.is_ok(), "{report:?}");

    let replayed: MatchState = snapshots::replay_full(&db, match_id).await?;
    assert_eq!(&replayed, finished.as_ref());

    registry.shutdown();
    Ok(())
}
