use std::collections::HashSet;

use orchestrator::domain::types::MatchMode;
use orchestrator::repos::events;
use orchestrator::runtime::clock::now_millis;

use super::join_as;
use crate::common::test_state;

const HOST: i64 = 200;

#[tokio::test]
async fn concurrent_joins_get_distinct_seats_and_dense_seqs() -> Result<(), Box<dyn std::error::Error>>
{
    let state = test_state().await?;
    let db = state.db().cloned().expect("test state has a database");
    let registry = state.registry()?;

    let created = state
        .flow
        .create_match(&db, &state.config, MatchMode::FiveKamp, HOST, "host".into(), now_millis())
        .await?;
    let match_id = created.match_id;
    registry.register(created);

    let joins = (1..=4).map(|n| {
        let registry = registry.clone();
        tokio::spawn(async move {
            registry
                .submit(match_id, join_as(HOST + n, &format!("guest {n}")))
                .await
        })
    });
    let mut seqs = HashSet::new();
    for join in joins.collect::<Vec<_>>() {
        let accepted = join.await??;
        assert_eq!(accepted.events.len(), 1);
        assert!(seqs.insert(accepted.first_seq));
    }
    assert_eq!(seqs, (3..=6).collect::<HashSet<i64>>());

    let current = registry.state(match_id).await?;
    assert_eq!(current.last_seq, 6);
    let seats: HashSet<u8> = current.players.iter().map(|p| p.seat).collect();
    assert_eq!(seats.len(), 5);

    let stored = events::read_from(&db, match_id, 0, None).await?;
    let stored_seqs: Vec<i64> = stored.iter().map(|e| e.seq).collect();
    assert_eq!(stored_seqs, (1..=6).collect::<Vec<i64>>());

    registry.shutdown();
    Ok(())
}
