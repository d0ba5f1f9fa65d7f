//! SeaORM adapter for `stage_states`, one row per stage a match visited.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, NotSet, Set};
use time::OffsetDateTime;

use crate::entities::stage_states;

#[derive(Debug, Clone)]
pub struct StageStateUpsert {
    pub match_id: i64,
    pub stage: String,
    pub state_json: serde_json::Value,
    pub started_at: OffsetDateTime,
    pub closed_at: Option<OffsetDateTime>,
}

/// Insert, or refresh state and close time of an existing `(match_id, stage)`.
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    row: StageStateUpsert,
) -> Result<(), sea_orm::DbErr> {
    stage_states::Entity::insert(stage_states::ActiveModel {
        id: NotSet,
        match_id: Set(row.match_id),
        stage: Set(row.stage),
        state_json: Set(row.state_json),
        started_at: Set(row.started_at),
        closed_at: Set(row.closed_at),
    })
    .on_conflict(
        OnConflict::columns([stage_states::Column::MatchId, stage_states::Column::Stage])
            .update_columns([stage_states::Column::StateJson, stage_states::Column::ClosedAt])
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}
