use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum MatchMode {
    #[sea_orm(string_value = "CHICKEN_RUN")]
    ChickenRun,
    #[sea_orm(string_value = "FIVE_KAMP")]
    FiveKamp,
    #[sea_orm(string_value = "BLACKJACK_ONLY")]
    BlackjackOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum MatchStatus {
    #[sea_orm(string_value = "CREATED")]
    Created,
    #[sea_orm(string_value = "RUNNING")]
    Running,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub mode: MatchMode,
    pub status: MatchStatus,
    pub stage: String,
    /// Match seed reinterpreted as signed for storage.
    pub seed: i64,
    pub rules: Json,
    #[sea_orm(column_name = "host_user_id")]
    pub host_user_id: i64,
    #[sea_orm(column_name = "last_seq")]
    pub last_seq: i64,
    pub degraded: bool,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::match_players::Entity")]
    MatchPlayers,
    #[sea_orm(has_many = "super::match_events::Entity")]
    MatchEvents,
}

impl Related<super::match_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatchPlayers.def()
    }
}

impl Related<super::match_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatchEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
