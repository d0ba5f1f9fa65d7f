//! Bot strategy trait definition.

use crate::domain::actions::PlayerAction;
use crate::domain::types::Seat;
use crate::domain::view::MatchView;

/// A source of actions for one automated seat.
///
/// Strategies see exactly what a human client at `seat` would see and their
/// output goes through the same validation as a human submission. Returning
/// `None` means "nothing to do right now"; the stage deadline will then apply
/// its default.
pub trait BotStrategy: Send + Sync {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction>;
}
