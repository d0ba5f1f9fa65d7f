use sea_orm::ConnectionTrait;

use super::{corrupt, datetime_to_millis};
use crate::adapters::ledger_sea::{self, LedgerInsert};
use crate::domain::ledger::{LedgerEntry, LedgerReason};
use crate::errors::domain::DomainError;

pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    entries: &[LedgerEntry],
) -> Result<(), DomainError> {
    let rows = entries
        .iter()
        .map(|e| LedgerInsert {
            match_id: e.match_id,
            seq: e.seq,
            seat: i16::from(e.seat),
            user_id: e.user_id,
            stage: e.stage.as_str().to_string(),
            delta: e.delta,
            reason: e.reason.as_str().to_string(),
        })
        .collect();
    ledger_sea::append(conn, rows).await?;
    Ok(())
}

pub async fn list_for_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<Vec<LedgerEntry>, DomainError> {
    ledger_sea::list_for_match(conn, match_id)
        .await?
        .into_iter()
        .map(|row| {
            let reason: LedgerReason =
                serde_json::from_value(serde_json::Value::String(row.reason.clone()))
                    .map_err(|e| corrupt("ledger reason", e))?;
            Ok(LedgerEntry {
                match_id: row.match_id,
                seq: row.seq,
                seat: u8::try_from(row.seat).map_err(|e| corrupt("ledger seat", e))?,
                user_id: row.user_id,
                stage: row.stage.parse()?,
                delta: row.delta,
                reason,
                ts: datetime_to_millis(row.created_at),
            })
        })
        .collect()
}
