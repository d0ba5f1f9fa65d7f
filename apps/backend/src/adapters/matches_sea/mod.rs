//! SeaORM adapter for the `matches` table, generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::matches;
use crate::infra::db_errors::MATCH_NOT_FOUND_PREFIX;

pub mod dto;

pub use dto::{MatchCreate, MatchProgress};

fn not_found(match_id: i64) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!("{MATCH_NOT_FOUND_PREFIX}{match_id}"))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<Option<matches::Model>, sea_orm::DbErr> {
    matches::Entity::find_by_id(match_id).one(conn).await
}

/// Like `find_by_id`, with a structured not-found error.
pub async fn require_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<matches::Model, sea_orm::DbErr> {
    find_by_id(conn, match_id)
        .await?
        .ok_or_else(|| not_found(match_id))
}

pub async fn create_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MatchCreate,
) -> Result<matches::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    matches::ActiveModel {
        id: NotSet,
        mode: Set(dto.mode),
        status: Set(matches::MatchStatus::Created),
        stage: Set("LOBBY".to_string()),
        seed: Set(dto.seed),
        rules: Set(dto.rules),
        host_user_id: Set(dto.host_user_id),
        last_seq: Set(0),
        degraded: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Advances the projection. Fails with a unique-style conflict when another
/// writer moved `last_seq` first.
pub async fn update_progress<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MatchProgress,
) -> Result<(), sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = matches::Entity::update_many()
        .col_expr(matches::Column::Status, Expr::value(dto.status))
        .col_expr(matches::Column::Stage, Expr::value(dto.stage))
        .col_expr(matches::Column::LastSeq, Expr::value(dto.last_seq))
        .col_expr(matches::Column::UpdatedAt, Expr::value(now))
        .filter(matches::Column::Id.eq(dto.id))
        .filter(matches::Column::LastSeq.eq(dto.expected_last_seq))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_id(conn, dto.id).await? {
            Some(row) => Err(sea_orm::DbErr::Custom(format!(
                "duplicate key value violates unique constraint \"ux_match_events_match_seq\" (expected last_seq {}, found {})",
                dto.expected_last_seq, row.last_seq
            ))),
            None => Err(not_found(dto.id)),
        };
    }
    Ok(())
}

pub async fn set_degraded<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    degraded: bool,
) -> Result<(), sea_orm::DbErr> {
    matches::Entity::update_many()
        .col_expr(matches::Column::Degraded, Expr::value(degraded))
        .filter(matches::Column::Id.eq(match_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Ids of matches that have not reached a terminal status, oldest first.
pub async fn list_live_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    matches::Entity::find()
        .select_only()
        .column(matches::Column::Id)
        .filter(
            matches::Column::Status
                .is_in([matches::MatchStatus::Created, matches::MatchStatus::Running]),
        )
        .order_by_asc(matches::Column::Id)
        .limit(limit)
        .into_tuple::<i64>()
        .all(conn)
        .await
}
