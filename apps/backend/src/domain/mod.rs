//! Domain layer: the match state machine, its events and the minigames.
//!
//! Nothing in here touches the database, the clock or the network.

pub mod actions;
pub mod cards;
pub mod events;
pub mod ledger;
pub mod match_state;
pub mod player;
pub mod rng;
pub mod rules;
pub mod stages;
pub mod types;
pub mod view;

#[cfg(test)]
mod tests_props;

pub use actions::{Actor, Command, PlayerAction, SystemInput};
pub use events::{MatchEvent, MatchEventKind};
pub use match_state::{MatchState, Transition};
pub use types::{MatchMode, MatchStatus, Seat, Stage};
