//! Persistence of accepted transitions.
//!
//! `commit` is the only writer of match rows. One call writes, in one
//! transaction, every event of a transition, its ledger entries, the cached
//! stacks, the match row, the stage rows and (when due) a snapshot.

use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{debug, info};

use crate::db::txn::with_txn;
use crate::domain::actions::{Actor, Command, PlayerAction};
use crate::domain::events::MatchEventKind;
use crate::domain::match_state::{MatchState, Transition};
use crate::domain::types::{MatchMode, Millis, UserId};
use crate::config::orchestrator::OrchestratorConfig;
use crate::errors::domain::DomainError;
use crate::repos::{events, ledger, matches, players, snapshots, stage_states};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitReport {
    pub snapshot_taken: bool,
}

#[derive(Debug, Clone)]
pub struct MatchFlowService {
    snapshot_every: i64,
}

impl MatchFlowService {
    pub fn new(snapshot_every: i64) -> Self {
        Self {
            snapshot_every: snapshot_every.max(1),
        }
    }

    /// Snapshot at every stage boundary and whenever the batch crosses a
    /// multiple of the cadence.
    pub fn snapshot_due(&self, prev_seq: i64, transition: &Transition) -> bool {
        let next_seq = transition.state.last_seq;
        transition.crosses_stage()
            || prev_seq / self.snapshot_every != next_seq / self.snapshot_every
    }

    pub async fn commit<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        prev_seq: i64,
        transition: &Transition,
    ) -> Result<CommitReport, DomainError> {
        if transition.is_empty() {
            return Ok(CommitReport::default());
        }
        let state = &transition.state;
        let match_id = state.match_id;

        events::append(conn, &transition.events).await?;
        ledger::append(conn, &transition.ledger).await?;
        players::save_all(conn, match_id, &state.players).await?;
        matches::record_progress(
            conn,
            match_id,
            state.status,
            state.current_stage(),
            prev_seq,
            state.last_seq,
        )
        .await?;
        self.save_stage_rows(conn, transition).await?;

        let snapshot_taken = self.snapshot_due(prev_seq, transition);
        if snapshot_taken {
            snapshots::save(conn, state).await?;
            debug!(match_id, seq = state.last_seq, "snapshot written");
        }

        Ok(CommitReport { snapshot_taken })
    }

    async fn save_stage_rows<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        transition: &Transition,
    ) -> Result<(), DomainError> {
        let state = &transition.state;
        for event in &transition.events {
            match &event.kind {
                MatchEventKind::StageCompleted { stage, summary } => {
                    stage_states::save(
                        conn,
                        state.match_id,
                        *stage,
                        summary,
                        event.server_ts,
                        Some(event.server_ts),
                    )
                    .await?;
                }
                MatchEventKind::StageStarted { stage } => {
                    info!(match_id = state.match_id, seq = event.seq, stage = %stage, "stage started");
                }
                _ => {}
            }
        }
        let now = transition.events.last().map_or(state.last_ts, |e| e.server_ts);
        let stage = state.current_stage();
        let closed_at = stage.is_terminal().then_some(now);
        stage_states::save(conn, state.match_id, stage, &state.stage, now, closed_at).await
    }

    /// Allocates the match id, opens the lobby and seats the host, all in
    /// one transaction.
    pub async fn create_match(
        &self,
        db: &DatabaseConnection,
        config: &OrchestratorConfig,
        mode: MatchMode,
        host_user_id: UserId,
        host_name: String,
        now: Millis,
    ) -> Result<MatchState, DomainError> {
        let rules = config.rules_for(mode);
        let seed: u64 = rand::random();
        let flow = self.clone();
        let state = with_txn(db, move |txn| {
            Box::pin(async move {
                let record = matches::create(txn, mode, &rules, seed, host_user_id).await?;
                let transition =
                    MatchState::create(record.id, mode, rules, seed, host_user_id, &host_name, now)?;
                flow.commit(txn, 0, &transition).await?;
                Ok::<_, DomainError>(transition.state)
            })
        })
        .await?;
        info!(match_id = state.match_id, mode = %mode, host_user_id, "match created");
        Ok(state)
    }

    /// Cancels straight against storage, for operators without a running
    /// server. Fails with `OutOfOrder` if a live actor commits in between.
    pub async fn cancel_offline(
        &self,
        db: &DatabaseConnection,
        match_id: i64,
        now: Millis,
    ) -> Result<MatchState, DomainError> {
        let state = super::snapshots::rehydrate(db, match_id).await?;
        let command = Command::Act {
            actor: Actor::Operator,
            action: PlayerAction::Cancel,
            client_ts: None,
        };
        let transition = state.handle(&command, now)?;
        let prev_seq = state.last_seq;
        let flow = self.clone();
        let state = with_txn(db, move |txn| {
            Box::pin(async move {
                flow.commit(txn, prev_seq, &transition).await?;
                Ok::<_, DomainError>(transition.state)
            })
        })
        .await?;
        info!(match_id, seq = state.last_seq, "match cancelled by operator");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::MatchRules;

    fn created(seq_after: i64) -> Transition {
        let mut t = MatchState::create(1, MatchMode::FiveKamp, MatchRules::default(), 7, 10, "Ana", 0)
            .unwrap();
        t.state.last_seq = seq_after;
        t
    }

    #[test]
    fn cadence_and_boundaries_trigger_snapshots() {
        let flow = MatchFlowService::new(50);
        let mut t = created(49);
        t.events.retain(|e| !e.kind.is_stage_boundary());
        assert!(!flow.snapshot_due(40, &t));
        t.state.last_seq = 52;
        assert!(flow.snapshot_due(40, &t));
    }
}
