//! SeaORM adapter for `ledger_entries`.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};

use crate::entities::ledger_entries;

#[derive(Debug, Clone)]
pub struct LedgerInsert {
    pub match_id: i64,
    pub seq: i64,
    pub seat: i16,
    pub user_id: Option<i64>,
    pub stage: String,
    pub delta: i64,
    pub reason: String,
}

pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    rows: Vec<LedgerInsert>,
) -> Result<(), sea_orm::DbErr> {
    if rows.is_empty() {
        return Ok(());
    }
    let now = time::OffsetDateTime::now_utc();
    let models = rows.into_iter().map(|r| ledger_entries::ActiveModel {
        id: NotSet,
        match_id: Set(r.match_id),
        seq: Set(r.seq),
        seat: Set(r.seat),
        user_id: Set(r.user_id),
        stage: Set(r.stage),
        delta: Set(r.delta),
        reason: Set(r.reason),
        created_at: Set(now),
    });
    ledger_entries::Entity::insert_many(models)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn list_for_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<Vec<ledger_entries::Model>, sea_orm::DbErr> {
    ledger_entries::Entity::find()
        .filter(ledger_entries::Column::MatchId.eq(match_id))
        .order_by_asc(ledger_entries::Column::Seq)
        .order_by_asc(ledger_entries::Column::Id)
        .all(conn)
        .await
}
