//! Match rows as domain records.

use sea_orm::ConnectionTrait;

use super::corrupt;
use crate::adapters::matches_sea::{self, MatchCreate, MatchProgress};
use crate::domain::rules::MatchRules;
use crate::domain::types::{MatchMode, MatchStatus, Stage, UserId};
use crate::entities::matches::{self, MatchMode as DbMode, MatchStatus as DbStatus};
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub id: i64,
    pub mode: MatchMode,
    pub status: MatchStatus,
    pub stage: Stage,
    pub seed: u64,
    pub rules: MatchRules,
    pub host_user_id: UserId,
    pub last_seq: i64,
    pub degraded: bool,
}

impl From<MatchMode> for DbMode {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::ChickenRun => DbMode::ChickenRun,
            MatchMode::FiveKamp => DbMode::FiveKamp,
            MatchMode::BlackjackOnly => DbMode::BlackjackOnly,
        }
    }
}

impl From<DbMode> for MatchMode {
    fn from(mode: DbMode) -> Self {
        match mode {
            DbMode::ChickenRun => MatchMode::ChickenRun,
            DbMode::FiveKamp => MatchMode::FiveKamp,
            DbMode::BlackjackOnly => MatchMode::BlackjackOnly,
        }
    }
}

impl From<MatchStatus> for DbStatus {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Created => DbStatus::Created,
            MatchStatus::Running => DbStatus::Running,
            MatchStatus::Completed => DbStatus::Completed,
            MatchStatus::Cancelled => DbStatus::Cancelled,
        }
    }
}

impl From<DbStatus> for MatchStatus {
    fn from(status: DbStatus) -> Self {
        match status {
            DbStatus::Created => MatchStatus::Created,
            DbStatus::Running => MatchStatus::Running,
            DbStatus::Completed => MatchStatus::Completed,
            DbStatus::Cancelled => MatchStatus::Cancelled,
        }
    }
}

impl TryFrom<matches::Model> for MatchRecord {
    type Error = DomainError;

    fn try_from(row: matches::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            mode: row.mode.into(),
            status: row.status.into(),
            stage: row.stage.parse()?,
            seed: row.seed as u64,
            rules: serde_json::from_value(row.rules).map_err(|e| corrupt("match rules", e))?,
            host_user_id: row.host_user_id,
            last_seq: row.last_seq,
            degraded: row.degraded,
        })
    }
}

/// Inserts the row that allocates the match id.
pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    mode: MatchMode,
    rules: &MatchRules,
    seed: u64,
    host_user_id: UserId,
) -> Result<MatchRecord, DomainError> {
    let rules = serde_json::to_value(rules).map_err(|e| corrupt("match rules", e))?;
    let row = matches_sea::create_match(
        conn,
        MatchCreate {
            mode: mode.into(),
            seed: seed as i64,
            rules,
            host_user_id,
        },
    )
    .await?;
    MatchRecord::try_from(row)
}

pub async fn require<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<MatchRecord, DomainError> {
    MatchRecord::try_from(matches_sea::require_match(conn, match_id).await?)
}

pub async fn record_progress<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    status: MatchStatus,
    stage: Stage,
    expected_last_seq: i64,
    last_seq: i64,
) -> Result<(), DomainError> {
    matches_sea::update_progress(
        conn,
        MatchProgress {
            id: match_id,
            status: status.into(),
            stage: stage.as_str().to_string(),
            last_seq,
            expected_last_seq,
        },
    )
    .await?;
    Ok(())
}

pub async fn set_degraded<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    degraded: bool,
) -> Result<(), DomainError> {
    matches_sea::set_degraded(conn, match_id, degraded).await?;
    Ok(())
}

pub async fn live_match_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<i64>, DomainError> {
    Ok(matches_sea::list_live_ids(conn, limit).await?)
}
