//! Snapshot persistence with an integrity checksum.
//!
//! The checksum is blake3 over the canonical JSON (`serde_json::Value`
//! serialization, keys sorted), so it survives a round-trip through either
//! backend's JSON column.

use sea_orm::ConnectionTrait;

use super::corrupt;
use crate::adapters::snapshots_sea;
use crate::domain::match_state::MatchState;
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub seq: i64,
    pub state: MatchState,
    pub checksum: String,
}

pub fn checksum(value: &serde_json::Value) -> Result<String, DomainError> {
    let bytes = serde_json::to_vec(value).map_err(|e| corrupt("snapshot", e))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Persists `state` at its `last_seq`. Returns the checksum written.
pub async fn save<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    state: &MatchState,
) -> Result<String, DomainError> {
    let value = serde_json::to_value(state).map_err(|e| corrupt("snapshot", e))?;
    let sum = checksum(&value)?;
    snapshots_sea::insert(conn, state.match_id, state.last_seq, value, sum.clone()).await?;
    Ok(sum)
}

pub async fn exists_at<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    seq: i64,
) -> Result<bool, DomainError> {
    Ok(snapshots_sea::exists_at(conn, match_id, seq).await?)
}

/// Latest snapshot at or below `max_seq`, verified against its checksum.
pub async fn latest<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    max_seq: Option<i64>,
) -> Result<Option<StoredSnapshot>, DomainError> {
    let Some(row) = snapshots_sea::latest(conn, match_id, max_seq).await? else {
        return Ok(None);
    };
    let actual = checksum(&row.state_json)?;
    if actual != row.checksum {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("snapshot {match_id}@{} failed its checksum", row.seq),
        ));
    }
    let state: MatchState = serde_json::from_value(row.state_json)
        .map_err(|e| corrupt(&format!("snapshot {match_id}@{}", row.seq), e))?;
    Ok(Some(StoredSnapshot {
        seq: row.seq,
        state,
        checksum: row.checksum,
    }))
}
