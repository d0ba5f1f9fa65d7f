//! The append-only event log.

use sea_orm::ConnectionTrait;

use super::corrupt;
use crate::adapters::events_sea::{self, EventInsert};
use crate::domain::events::{MatchEvent, MatchEventKind};
use crate::entities::match_events;
use crate::errors::domain::{DomainError, InfraErrorKind};

fn to_row(event: &MatchEvent) -> Result<EventInsert, DomainError> {
    Ok(EventInsert {
        match_id: event.match_id,
        seq: event.seq,
        event_type: event.event_type().to_string(),
        payload: serde_json::to_value(&event.kind).map_err(|e| corrupt("event", e))?,
        server_ts: event.server_ts,
        client_ts: event.client_ts,
    })
}

fn from_row(row: match_events::Model) -> Result<MatchEvent, DomainError> {
    let kind: MatchEventKind = serde_json::from_value(row.payload)
        .map_err(|e| corrupt(&format!("event {}#{}", row.match_id, row.seq), e))?;
    if kind.event_type() != row.event_type {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!(
                "event {}#{} is typed {} but carries {}",
                row.match_id,
                row.seq,
                row.event_type,
                kind.event_type()
            ),
        ));
    }
    Ok(MatchEvent {
        match_id: row.match_id,
        seq: row.seq,
        server_ts: row.server_ts,
        client_ts: row.client_ts,
        kind,
    })
}

pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    events: &[MatchEvent],
) -> Result<(), DomainError> {
    let rows = events.iter().map(to_row).collect::<Result<Vec<_>, _>>()?;
    events_sea::append(conn, rows).await?;
    Ok(())
}

/// Events with `seq > since`, ascending. Gaps in the stored log are
/// reported as corruption.
pub async fn read_from<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    since: i64,
    limit: Option<u64>,
) -> Result<Vec<MatchEvent>, DomainError> {
    let rows = events_sea::list_after(conn, match_id, since, limit).await?;
    let mut expected = since + 1;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.seq != expected {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("match {match_id} log jumps from seq {} to {}", expected - 1, row.seq),
            ));
        }
        expected += 1;
        out.push(from_row(row)?);
    }
    Ok(out)
}
