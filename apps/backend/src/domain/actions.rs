//! Inputs to the orchestrator.
//!
//! `PlayerAction` is what a client (or a bot seat) submits. `SystemInput` is
//! synthesized by the runtime: deadline expiry and presence changes.

use serde::{Deserialize, Serialize};

use crate::domain::stages::blackjack::{MAX_WAGER, MIN_WAGER, SPOTS};
use crate::domain::stages::dice_hilo::{HiLoCall, MIN_CALL};
use crate::domain::stages::roulette::RouletteColor;
use crate::domain::stages::yatzy::YatzyCategory;
use crate::domain::types::{Chips, Millis, Stage, UserId};
use crate::errors::domain::{DomainError, ValidationKind};

pub const MAX_DISPLAY_NAME: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PlayerAction {
    Join {
        display_name: String,
    },
    Leave,
    StartMatch,
    ConfirmReady,
    Cancel,

    YatzyRoll {
        #[serde(default)]
        hold: [bool; 5],
    },
    YatzyScore {
        category: YatzyCategory,
    },

    PlaceBet {
        spot: u8,
        amount: Chips,
    },
    FinishBetting,
    Hit {
        spot: u8,
        #[serde(default)]
        hand: u8,
    },
    Stand {
        spot: u8,
        #[serde(default)]
        hand: u8,
    },
    Double {
        spot: u8,
        #[serde(default)]
        hand: u8,
    },
    Split {
        spot: u8,
        #[serde(default)]
        hand: u8,
    },

    RouletteBet {
        color: RouletteColor,
        amount: Chips,
    },
    RoulettePass,

    SubmitAnswer {
        question: u32,
        choice: u8,
    },

    DiceCall {
        round: u32,
        call: HiLoCall,
        amount: Chips,
    },
    DicePass {
        round: u32,
    },

    MusicGuess {
        round: u32,
        choice: u8,
    },

    HoldemFold,
    HoldemCheck,
    HoldemCall,
    HoldemAllIn,
    HoldemBet {
        to: Chips,
    },
    HoldemRaise {
        to: Chips,
    },
}

impl PlayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Join { .. } => "Join",
            PlayerAction::Leave => "Leave",
            PlayerAction::StartMatch => "StartMatch",
            PlayerAction::ConfirmReady => "ConfirmReady",
            PlayerAction::Cancel => "Cancel",
            PlayerAction::YatzyRoll { .. } => "YatzyRoll",
            PlayerAction::YatzyScore { .. } => "YatzyScore",
            PlayerAction::PlaceBet { .. } => "PlaceBet",
            PlayerAction::FinishBetting => "FinishBetting",
            PlayerAction::Hit { .. } => "Hit",
            PlayerAction::Stand { .. } => "Stand",
            PlayerAction::Double { .. } => "Double",
            PlayerAction::Split { .. } => "Split",
            PlayerAction::RouletteBet { .. } => "RouletteBet",
            PlayerAction::RoulettePass => "RoulettePass",
            PlayerAction::SubmitAnswer { .. } => "SubmitAnswer",
            PlayerAction::DiceCall { .. } => "DiceCall",
            PlayerAction::DicePass { .. } => "DicePass",
            PlayerAction::MusicGuess { .. } => "MusicGuess",
            PlayerAction::HoldemFold => "HoldemFold",
            PlayerAction::HoldemCheck => "HoldemCheck",
            PlayerAction::HoldemCall => "HoldemCall",
            PlayerAction::HoldemAllIn => "HoldemAllIn",
            PlayerAction::HoldemBet { .. } => "HoldemBet",
            PlayerAction::HoldemRaise { .. } => "HoldemRaise",
        }
    }

    /// Stage that accepts this action; `None` for match-level actions.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PlayerAction::Join { .. }
            | PlayerAction::Leave
            | PlayerAction::StartMatch
            | PlayerAction::Cancel => None,
            PlayerAction::ConfirmReady => Some(Stage::ReadyCheck),
            PlayerAction::YatzyRoll { .. } | PlayerAction::YatzyScore { .. } => Some(Stage::Yatzy),
            PlayerAction::PlaceBet { .. }
            | PlayerAction::FinishBetting
            | PlayerAction::Hit { .. }
            | PlayerAction::Stand { .. }
            | PlayerAction::Double { .. }
            | PlayerAction::Split { .. } => Some(Stage::Blackjack),
            PlayerAction::RouletteBet { .. } | PlayerAction::RoulettePass => {
                Some(Stage::RouletteInterlude)
            }
            PlayerAction::SubmitAnswer { .. } => Some(Stage::Trivia),
            PlayerAction::DiceCall { .. } | PlayerAction::DicePass { .. } => Some(Stage::DiceHiLo),
            PlayerAction::MusicGuess { .. } => Some(Stage::MusicQuiz),
            PlayerAction::HoldemFold
            | PlayerAction::HoldemCheck
            | PlayerAction::HoldemCall
            | PlayerAction::HoldemAllIn
            | PlayerAction::HoldemBet { .. }
            | PlayerAction::HoldemRaise { .. } => Some(Stage::Holdem),
        }
    }

    /// Static payload checks that need no match state.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            PlayerAction::Join { display_name } => {
                let trimmed = display_name.trim();
                if trimmed.is_empty() || trimmed.chars().count() > MAX_DISPLAY_NAME {
                    return Err(DomainError::validation(
                        ValidationKind::InvalidDisplayName,
                        format!("display name must be 1..={MAX_DISPLAY_NAME} characters"),
                    ));
                }
            }
            PlayerAction::PlaceBet { spot, amount } => {
                check_spot(*spot)?;
                if !(MIN_WAGER..=MAX_WAGER).contains(amount) {
                    return Err(DomainError::validation(
                        ValidationKind::WagerOutOfRange,
                        format!("wager must be {MIN_WAGER}..={MAX_WAGER}, got {amount}"),
                    ));
                }
            }
            PlayerAction::Hit { spot, hand }
            | PlayerAction::Stand { spot, hand }
            | PlayerAction::Double { spot, hand }
            | PlayerAction::Split { spot, hand } => {
                check_spot(*spot)?;
                if *hand > 1 {
                    return Err(DomainError::validation(
                        ValidationKind::InvalidSpot,
                        format!("hand index must be 0 or 1, got {hand}"),
                    ));
                }
            }
            PlayerAction::RouletteBet { amount, .. } => check_positive(*amount)?,
            PlayerAction::SubmitAnswer { choice, .. } | PlayerAction::MusicGuess { choice, .. } => {
                if *choice > 3 {
                    return Err(DomainError::validation(
                        ValidationKind::InvalidChoice,
                        format!("choice must be 0..=3, got {choice}"),
                    ));
                }
            }
            PlayerAction::DiceCall { amount, .. } => {
                if *amount < MIN_CALL {
                    return Err(DomainError::validation(
                        ValidationKind::WagerOutOfRange,
                        format!("dice wager must be at least {MIN_CALL}, got {amount}"),
                    ));
                }
            }
            PlayerAction::HoldemBet { to } | PlayerAction::HoldemRaise { to } => {
                check_positive(*to)?
            }
            _ => {}
        }
        Ok(())
    }
}

fn check_spot(spot: u8) -> Result<(), DomainError> {
    if spot >= SPOTS {
        return Err(DomainError::validation(
            ValidationKind::InvalidSpot,
            format!("spot must be 0..{SPOTS}, got {spot}"),
        ));
    }
    Ok(())
}

fn check_positive(amount: Chips) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidAmount,
            format!("amount must be positive, got {amount}"),
        ));
    }
    Ok(())
}

/// Who is submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    User { user_id: UserId },
    /// Autopilot or a bot playing `seat`.
    Seat { seat: u8 },
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SystemInput {
    Timeout,
    Connected { user_id: UserId },
    Disconnected { user_id: UserId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Act {
        actor: Actor,
        action: PlayerAction,
        client_ts: Option<Millis>,
    },
    System(SystemInput),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Act { action, .. } => action.name(),
            Command::System(SystemInput::Timeout) => "Timeout",
            Command::System(SystemInput::Connected { .. }) => "Connected",
            Command::System(SystemInput::Disconnected { .. }) => "Disconnected",
        }
    }
}
