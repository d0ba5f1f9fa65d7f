//! SeaORM adapter for the append-only `match_events` log.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::match_events;

#[derive(Debug, Clone)]
pub struct EventInsert {
    pub match_id: i64,
    pub seq: i64,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub server_ts: i64,
    pub client_ts: Option<i64>,
}

/// Appends a batch. The `(match_id, seq)` unique index rejects a second writer.
pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    rows: Vec<EventInsert>,
) -> Result<(), sea_orm::DbErr> {
    if rows.is_empty() {
        return Ok(());
    }
    let models = rows.into_iter().map(|r| match_events::ActiveModel {
        id: NotSet,
        match_id: Set(r.match_id),
        seq: Set(r.seq),
        event_type: Set(r.event_type),
        payload: Set(r.payload),
        server_ts: Set(r.server_ts),
        client_ts: Set(r.client_ts),
    });
    match_events::Entity::insert_many(models)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Events with `seq > after`, ascending, at most `limit` (all when `None`).
pub async fn list_after<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    after: i64,
    limit: Option<u64>,
) -> Result<Vec<match_events::Model>, sea_orm::DbErr> {
    let mut query = match_events::Entity::find()
        .filter(match_events::Column::MatchId.eq(match_id))
        .filter(match_events::Column::Seq.gt(after))
        .order_by_asc(match_events::Column::Seq);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    query.all(conn).await
}
