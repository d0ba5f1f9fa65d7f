//! SeaORM -> DomainError translation.
//!
//! Adapters return `DbErr`; repos convert through `From<DbErr>` so the rest
//! of the crate only ever sees `DomainError`.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::web::trace_ctx;

/// Prefix adapters use for a missing match row: `MATCH_NOT_FOUND:<id>`.
pub const MATCH_NOT_FOUND_PREFIX: &str = "MATCH_NOT_FOUND:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

fn is_unique_violation(msg: &str) -> bool {
    mentions_sqlstate(msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

/// Unique indexes with a domain meaning. Matches the Postgres index name or
/// the sqlite `table.column` listing.
fn unique_conflict(msg: &str) -> Option<(ConflictKind, &'static str)> {
    if msg.contains("ux_match_events_match_seq") || msg.contains("match_events.seq") {
        return Some((
            ConflictKind::OutOfOrder,
            "Another writer already appended this sequence number",
        ));
    }
    if msg.contains("ux_match_players_match_seat") || msg.contains("match_players.seat") {
        return Some((ConflictKind::SeatTaken, "Seat is already taken"));
    }
    if msg.contains("ux_match_snapshots_match_seq") || msg.contains("match_snapshots.seq") {
        return Some((
            ConflictKind::Other("SnapshotExists".into()),
            "A snapshot already exists at this sequence number",
        ));
    }
    None
}

/// Translate a `DbErr` into a `DomainError` with log-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), what.clone());
        }
        sea_orm::DbErr::Custom(custom) if custom.starts_with(MATCH_NOT_FOUND_PREFIX) => {
            let id = custom
                .strip_prefix(MATCH_NOT_FOUND_PREFIX)
                .and_then(|s| s.parse::<i64>().ok());
            return match id {
                Some(match_id) => {
                    DomainError::not_found(NotFoundKind::Match, format!("Match {match_id} not found"))
                }
                None => DomainError::not_found(NotFoundKind::Match, "Match not found"),
            };
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "database unavailable");
            return DomainError::infra(InfraErrorKind::PersistenceFailure, "Database unavailable");
        }
        _ => {}
    }

    if is_unique_violation(&msg) {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "unique constraint violation");
        if let Some((kind, detail)) = unique_conflict(&msg) {
            return DomainError::conflict(kind, detail);
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&msg, "23503") || msg.contains("FOREIGN KEY constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "foreign key violation");
        return DomainError::not_found(NotFoundKind::Match, "Referenced match does not exist");
    }

    if msg.contains("timeout") || msg.contains("pool") || msg.contains("unavailable") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    if let sea_orm::DbErr::Json(_) | sea_orm::DbErr::Type(_) = &e {
        error!(trace_id = %trace_id, raw_error = %Redacted(&msg), "stored row failed to decode");
        return DomainError::infra(InfraErrorKind::DataCorruption, "Stored data failed to decode");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&msg), "unhandled database error");
    DomainError::infra(
        InfraErrorKind::PersistenceFailure,
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbErr, RuntimeErr};

    use super::*;

    fn exec_err(msg: &str) -> DbErr {
        DbErr::Exec(RuntimeErr::Internal(msg.to_string()))
    }

    #[test]
    fn duplicate_seq_is_out_of_order() {
        let sqlite = exec_err("UNIQUE constraint failed: match_events.match_id, match_events.seq");
        assert!(matches!(
            map_db_err(sqlite),
            DomainError::Conflict(ConflictKind::OutOfOrder, _)
        ));

        let pg = exec_err(
            "error returned from database: duplicate key value violates unique constraint \"ux_match_events_match_seq\"",
        );
        assert!(matches!(
            map_db_err(pg),
            DomainError::Conflict(ConflictKind::OutOfOrder, _)
        ));
    }

    #[test]
    fn duplicate_seat_is_seat_taken() {
        let err = exec_err("UNIQUE constraint failed: match_players.match_id, match_players.seat");
        assert!(matches!(
            map_db_err(err),
            DomainError::Conflict(ConflictKind::SeatTaken, _)
        ));
    }

    #[test]
    fn structured_not_found() {
        let err = DbErr::Custom(format!("{MATCH_NOT_FOUND_PREFIX}42"));
        match map_db_err(err) {
            DomainError::NotFound(NotFoundKind::Match, detail) => assert!(detail.contains("42")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn connection_loss_is_persistence_failure() {
        let err = DbErr::Conn(RuntimeErr::Internal("connection refused".into()));
        assert!(matches!(
            map_db_err(err),
            DomainError::Infra(InfraErrorKind::PersistenceFailure, _)
        ));
    }
}
