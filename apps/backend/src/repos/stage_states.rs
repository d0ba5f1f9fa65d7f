use sea_orm::ConnectionTrait;

use super::{corrupt, millis_to_datetime};
use crate::adapters::stage_states_sea::{self, StageStateUpsert};
use crate::domain::types::{Millis, Stage};
use crate::errors::domain::DomainError;

/// Writes the sub-state of `stage`; `closed_at` marks it finished.
pub async fn save<C: ConnectionTrait + Send + Sync, T: serde::Serialize>(
    conn: &C,
    match_id: i64,
    stage: Stage,
    state: &T,
    started_at: Millis,
    closed_at: Option<Millis>,
) -> Result<(), DomainError> {
    let state_json = serde_json::to_value(state).map_err(|e| corrupt("stage state", e))?;
    stage_states_sea::upsert(
        conn,
        StageStateUpsert {
            match_id,
            stage: stage.as_str().to_string(),
            state_json,
            started_at: millis_to_datetime(started_at),
            closed_at: closed_at.map(millis_to_datetime),
        },
    )
    .await?;
    Ok(())
}
