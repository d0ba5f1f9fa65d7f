use serde::{Deserialize, Serialize};

use crate::domain::types::{Chips, Seat, UserId};

/// A participant in one match.
///
/// `stack` is a memoized fold over the player's ledger entries; it is only
/// ever changed by `MatchState::apply` together with the entry that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPlayer {
    pub seat: Seat,
    /// `None` for bots.
    pub user_id: Option<UserId>,
    pub display_name: String,
    pub is_bot: bool,
    pub is_connected: bool,
    /// A bot strategy is playing this human's seat.
    pub autopilot: bool,
    pub ready: bool,
    pub left: bool,
    pub initial_stack: Chips,
    pub stack: Chips,
    /// Sum of every ledger delta applied to this seat.
    pub ledger_total: Chips,
}

impl MatchPlayer {
    pub fn is_human(&self) -> bool {
        !self.is_bot
    }

    /// Seats whose decisions come from a bot strategy rather than a client.
    pub fn is_automated(&self) -> bool {
        self.is_bot || self.autopilot || self.left
    }

    /// `initial + Σ delta == stack`.
    pub fn is_conserved(&self) -> bool {
        self.initial_stack + self.ledger_total == self.stack
    }
}
