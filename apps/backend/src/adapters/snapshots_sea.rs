//! SeaORM adapter for `match_snapshots`.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};

use crate::entities::match_snapshots;

pub async fn insert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    seq: i64,
    state_json: serde_json::Value,
    checksum: String,
) -> Result<(), sea_orm::DbErr> {
    match_snapshots::Entity::insert(match_snapshots::ActiveModel {
        id: NotSet,
        match_id: Set(match_id),
        seq: Set(seq),
        state_json: Set(state_json),
        checksum: Set(checksum),
        created_at: Set(time::OffsetDateTime::now_utc()),
    })
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

/// Newest snapshot at or below `max_seq` (any seq when `None`).
pub async fn latest<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    max_seq: Option<i64>,
) -> Result<Option<match_snapshots::Model>, sea_orm::DbErr> {
    let mut query = match_snapshots::Entity::find()
        .filter(match_snapshots::Column::MatchId.eq(match_id));
    if let Some(max) = max_seq {
        query = query.filter(match_snapshots::Column::Seq.lte(max));
    }
    query
        .order_by_desc(match_snapshots::Column::Seq)
        .one(conn)
        .await
}

pub async fn exists_at<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    seq: i64,
) -> Result<bool, sea_orm::DbErr> {
    let found = match_snapshots::Entity::find()
        .filter(match_snapshots::Column::MatchId.eq(match_id))
        .filter(match_snapshots::Column::Seq.eq(seq))
        .one(conn)
        .await?;
    Ok(found.is_some())
}
