//! Read-side queries over stored matches.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::domain::ledger::LedgerEntry;
use crate::domain::match_state::MatchState;
use crate::domain::view::PublicEvent;
use crate::errors::domain::DomainError;
use crate::repos::{events, ledger};
use crate::services::snapshots::SeatBalance;

pub const MAX_EVENTS_PAGE: u64 = 500;

#[derive(Debug, Clone, Serialize)]
pub struct EventsPage {
    pub match_id: i64,
    pub since: i64,
    pub events: Vec<PublicEvent>,
    /// Seq to pass as `since` for the next page; `None` at the end of the log.
    pub next_since: Option<i64>,
}

pub async fn events_page<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &MatchState,
    since: i64,
    limit: u64,
) -> Result<EventsPage, DomainError> {
    let limit = limit.clamp(1, MAX_EVENTS_PAGE);
    let since = since.max(0);
    let log = events::read_from(conn, state.match_id, since, Some(limit)).await?;
    let next_since = log
        .last()
        .map(|e| e.seq)
        .filter(|seq| *seq < state.last_seq);
    Ok(EventsPage {
        match_id: state.match_id,
        since,
        events: PublicEvent::list(&log, state.status.is_terminal()),
        next_since,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerReport {
    pub match_id: i64,
    pub entries: Vec<LedgerEntry>,
    pub seats: Vec<SeatBalance>,
    pub conserved: bool,
}

/// Stored entries checked against the live stacks.
pub async fn ledger_report<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &MatchState,
) -> Result<LedgerReport, DomainError> {
    let entries = ledger::list_for_match(conn, state.match_id).await?;
    let seats: Vec<SeatBalance> = state
        .players
        .iter()
        .map(|p| {
            let ledger_total = entries
                .iter()
                .filter(|e| e.seat == p.seat)
                .map(|e| e.delta)
                .sum::<i64>();
            SeatBalance {
                seat: p.seat,
                initial_stack: p.initial_stack,
                ledger_total,
                stack: p.stack,
                conserved: p.initial_stack + ledger_total == p.stack,
            }
        })
        .collect();
    let conserved = seats.iter().all(|s| s.conserved);
    Ok(LedgerReport {
        match_id: state.match_id,
        entries,
        seats,
        conserved,
    })
}
