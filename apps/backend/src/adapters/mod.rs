//! SeaORM adapters. Functions return `DbErr`; the repos layer maps it to
//! `DomainError`.

pub mod events_sea;
pub mod ledger_sea;
pub mod matches_sea;
pub mod players_sea;
pub mod snapshots_sea;
pub mod stage_states_sea;
