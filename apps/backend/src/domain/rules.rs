//! Per-match rule values frozen at creation.
//!
//! `MatchRules` travels inside the `MatchCreated` payload so replay uses the
//! values the match was started with, not whatever the environment says now.

use serde::{Deserialize, Serialize};

use crate::domain::types::{Chips, MatchMode};
use crate::errors::domain::{DomainError, ValidationKind};

/// Largest table one 52-card hold'em deck can serve: two hole cards per seat
/// plus a five-card board.
pub const SEAT_LIMIT: u8 = (52 - 5) / 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Bots are joined at start until this many seats are filled.
    pub min_players: u8,
    pub max_seats: u8,
    pub ready_check_secs: i64,
    /// Replace absent or timed-out disconnected humans with autopilot.
    pub bot_substitution: bool,
    /// Stack each player receives on joining.
    pub buy_in: Chips,

    pub yatzy_turn_secs: i64,

    pub bj_betting_secs: i64,
    pub bj_decision_secs: i64,
    /// `None` runs the table until every human leaves.
    pub bj_rounds: Option<u32>,

    pub roulette_spins: u32,
    pub roulette_betting_secs: i64,

    pub trivia_questions: u32,
    pub trivia_window_secs: i64,

    pub dice_rounds: u32,
    pub dice_call_secs: i64,

    pub music_rounds: u32,
    pub music_window_secs: i64,

    pub holdem_max_hands: u32,
    pub holdem_decision_secs: i64,
}

impl MatchRules {
    pub fn for_mode(mode: MatchMode) -> Self {
        let base = Self::default();
        match mode {
            MatchMode::FiveKamp => base,
            MatchMode::ChickenRun => Self {
                bj_rounds: Some(3),
                ..base
            },
            MatchMode::BlackjackOnly => Self {
                bj_rounds: None,
                buy_in: 1000,
                ..base
            },
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_seats < 2 || self.max_seats > SEAT_LIMIT {
            return Err(DomainError::validation(
                ValidationKind::Other("MaxSeats".into()),
                format!("max_seats must be 2..={SEAT_LIMIT}, got {}", self.max_seats),
            ));
        }
        if self.min_players == 0 || self.min_players > self.max_seats {
            return Err(DomainError::validation(
                ValidationKind::Other("MinPlayers".into()),
                format!(
                    "min_players must be 1..={}, got {}",
                    self.max_seats, self.min_players
                ),
            ));
        }
        Ok(())
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_seats: 6,
            ready_check_secs: 60,
            bot_substitution: true,
            buy_in: 0,
            yatzy_turn_secs: 30,
            bj_betting_secs: 20,
            bj_decision_secs: 15,
            bj_rounds: Some(5),
            roulette_spins: 3,
            roulette_betting_secs: 20,
            trivia_questions: 5,
            trivia_window_secs: 12,
            dice_rounds: 5,
            dice_call_secs: 15,
            music_rounds: 5,
            music_window_secs: 20,
            holdem_max_hands: 12,
            holdem_decision_secs: 20,
        }
    }
}

pub fn secs_to_millis(secs: i64) -> i64 {
    secs.saturating_mul(1000)
}
