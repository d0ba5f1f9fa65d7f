//! SeaORM adapter for the `match_players` projection.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};

use crate::entities::match_players;

#[derive(Debug, Clone)]
pub struct PlayerUpsert {
    pub match_id: i64,
    pub seat: i16,
    pub user_id: Option<i64>,
    pub display_name: String,
    pub is_bot: bool,
    pub is_connected: bool,
    pub stack: i64,
    pub initial_stack: i64,
}

/// Insert or refresh seats keyed by `(match_id, seat)`.
pub async fn upsert_players<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    rows: Vec<PlayerUpsert>,
) -> Result<(), sea_orm::DbErr> {
    if rows.is_empty() {
        return Ok(());
    }
    let now = time::OffsetDateTime::now_utc();
    let models = rows.into_iter().map(|r| match_players::ActiveModel {
        id: NotSet,
        match_id: Set(r.match_id),
        seat: Set(r.seat),
        user_id: Set(r.user_id),
        display_name: Set(r.display_name),
        is_bot: Set(r.is_bot),
        is_connected: Set(r.is_connected),
        stack: Set(r.stack),
        initial_stack: Set(r.initial_stack),
        created_at: Set(now),
        updated_at: Set(now),
    });
    match_players::Entity::insert_many(models)
        .on_conflict(
            OnConflict::columns([match_players::Column::MatchId, match_players::Column::Seat])
                .update_columns([
                    match_players::Column::UserId,
                    match_players::Column::DisplayName,
                    match_players::Column::IsBot,
                    match_players::Column::IsConnected,
                    match_players::Column::Stack,
                    match_players::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn list_for_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<Vec<match_players::Model>, sea_orm::DbErr> {
    match_players::Entity::find()
        .filter(match_players::Column::MatchId.eq(match_id))
        .order_by_asc(match_players::Column::Seat)
        .all(conn)
        .await
}
