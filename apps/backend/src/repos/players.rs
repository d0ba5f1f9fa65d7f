//! Cached seat projection. The ledger stays the source of truth for stacks.

use sea_orm::ConnectionTrait;

use crate::adapters::players_sea::{self, PlayerUpsert};
use crate::domain::player::MatchPlayer;
use crate::entities::match_players;
use crate::errors::domain::DomainError;

pub async fn save_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
    players: &[MatchPlayer],
) -> Result<(), DomainError> {
    let rows = players
        .iter()
        .map(|p| PlayerUpsert {
            match_id,
            seat: i16::from(p.seat),
            user_id: p.user_id,
            display_name: p.display_name.clone(),
            is_bot: p.is_bot,
            is_connected: p.is_connected,
            stack: p.stack,
            initial_stack: p.initial_stack,
        })
        .collect();
    players_sea::upsert_players(conn, rows).await?;
    Ok(())
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: i64,
) -> Result<Vec<match_players::Model>, DomainError> {
    Ok(players_sea::list_for_match(conn, match_id).await?)
}
