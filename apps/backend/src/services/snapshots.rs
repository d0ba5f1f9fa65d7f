//! Snapshot and replay.
//!
//! `rehydrate` is latest snapshot plus the events after it; `replay_full`
//! ignores snapshots entirely. Both must produce the same state.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::match_state::MatchState;
use crate::domain::types::Seat;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::repos::{events, ledger, matches, players, snapshots};

/// Replays the whole log onto an empty state.
pub async fn replay_full<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<MatchState, DomainError> {
    let log = events::read_from(conn, match_id, 0, None).await?;
    if log.is_empty() {
        return Err(DomainError::not_found(
            NotFoundKind::Match,
            format!("match {match_id} has no events"),
        ));
    }
    MatchState::replay(MatchState::empty(match_id), &log)
}

/// Latest snapshot plus the events after it.
pub async fn rehydrate<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<MatchState, DomainError> {
    let Some(snapshot) = snapshots::latest(conn, match_id, None).await? else {
        return replay_full(conn, match_id).await;
    };
    let tail = events::read_from(conn, match_id, snapshot.seq, None).await?;
    let state = MatchState::replay(snapshot.state, &tail)?;
    info!(
        match_id,
        snapshot_seq = snapshot.seq,
        replayed = tail.len(),
        seq = state.last_seq,
        "match rehydrated"
    );
    Ok(state)
}

/// Persists a snapshot of `state` unless one already exists at its seq.
/// Returns whether a new snapshot was written.
pub async fn take<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &MatchState,
) -> Result<bool, DomainError> {
    if snapshots::exists_at(conn, state.match_id, state.last_seq).await? {
        return Ok(false);
    }
    snapshots::save(conn, state).await?;
    info!(match_id = state.match_id, seq = state.last_seq, "snapshot taken");
    Ok(true)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SeatBalance {
    pub seat: Seat,
    pub initial_stack: i64,
    pub ledger_total: i64,
    pub stack: i64,
    pub conserved: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyReport {
    pub match_id: i64,
    pub last_seq: i64,
    pub row_last_seq: i64,
    /// Rehydrated state equals a full replay.
    pub snapshot_consistent: bool,
    pub seats: Vec<SeatBalance>,
    /// Seats whose cached `match_players` row disagrees with the replay.
    pub stale_projection: Vec<Seat>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.snapshot_consistent
            && self.last_seq == self.row_last_seq
            && self.seats.iter().all(|s| s.conserved)
            && self.stale_projection.is_empty()
    }
}

/// Checks the log for gaps, the snapshot path against a full replay, and
/// every seat's stack against its stored ledger entries.
pub async fn verify<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<VerifyReport, DomainError> {
    let row = matches::require(conn, match_id).await?;
    // read_from rejects gaps, so a successful replay proves seq continuity.
    let full = replay_full(conn, match_id).await?;
    let via_snapshot = rehydrate(conn, match_id).await?;
    let snapshot_consistent = full == via_snapshot;
    if !snapshot_consistent {
        warn!(match_id, "snapshot path diverges from full replay");
    }

    let entries = ledger::list_for_match(conn, match_id).await?;
    let seats = full
        .players
        .iter()
        .map(|p| {
            let ledger_total: i64 = entries
                .iter()
                .filter(|e| e.seat == p.seat)
                .map(|e| e.delta)
                .sum();
            SeatBalance {
                seat: p.seat,
                initial_stack: p.initial_stack,
                ledger_total,
                stack: p.stack,
                conserved: p.initial_stack + ledger_total == p.stack,
            }
        })
        .collect();

    let rows = players::list(conn, match_id).await?;
    let stale_projection: Vec<Seat> = full
        .players
        .iter()
        .filter(|p| {
            !rows
                .iter()
                .any(|r| r.seat == i16::from(p.seat) && r.stack == p.stack)
        })
        .map(|p| p.seat)
        .collect();
    if !stale_projection.is_empty() {
        warn!(match_id, seats = ?stale_projection, "seat rows disagree with replay");
    }

    Ok(VerifyReport {
        match_id,
        last_seq: full.last_seq,
        row_last_seq: row.last_seq,
        snapshot_consistent,
        seats,
        stale_projection,
    })
}

/// Fails when the stored match row disagrees with the replayed log.
pub fn ensure_row_matches(row_last_seq: i64, state: &MatchState) -> Result<(), DomainError> {
    if row_last_seq != state.last_seq {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!(
                "match {} row says seq {row_last_seq} but the log ends at {}",
                state.match_id, state.last_seq
            ),
        ));
    }
    Ok(())
}
