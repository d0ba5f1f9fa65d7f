//! Identity, mode, status and stage vocabulary of a match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Stable seat ordinal within a match.
pub type Seat = u8;
/// Signed integer currency.
pub type Chips = i64;
/// Identity issued by the external identity provider.
pub type UserId = i64;
/// Server wall-clock milliseconds since the unix epoch.
pub type Millis = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMode {
    ChickenRun,
    FiveKamp,
    BlackjackOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Created,
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Lobby,
    ReadyCheck,
    Yatzy,
    Blackjack,
    RouletteInterlude,
    Trivia,
    DiceHiLo,
    MusicQuiz,
    Holdem,
    Completed,
    Cancelled,
}

const MULTI_STAGE_PLAN: &[Stage] = &[
    Stage::Lobby,
    Stage::ReadyCheck,
    Stage::Yatzy,
    Stage::Blackjack,
    Stage::RouletteInterlude,
    Stage::Trivia,
    Stage::DiceHiLo,
    Stage::MusicQuiz,
    Stage::Holdem,
    Stage::Completed,
];

const BLACKJACK_ONLY_PLAN: &[Stage] = &[
    Stage::Lobby,
    Stage::ReadyCheck,
    Stage::Blackjack,
    Stage::Completed,
];

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::ChickenRun => "CHICKEN_RUN",
            MatchMode::FiveKamp => "FIVE_KAMP",
            MatchMode::BlackjackOnly => "BLACKJACK_ONLY",
        }
    }

    /// Ordered stages this mode walks through, ending with `Completed`.
    pub fn stage_plan(self) -> &'static [Stage] {
        match self {
            MatchMode::ChickenRun | MatchMode::FiveKamp => MULTI_STAGE_PLAN,
            MatchMode::BlackjackOnly => BLACKJACK_ONLY_PLAN,
        }
    }
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Created => "CREATED",
            MatchStatus::Running => "RUNNING",
            MatchStatus::Completed => "COMPLETED",
            MatchStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Lobby => "LOBBY",
            Stage::ReadyCheck => "READY_CHECK",
            Stage::Yatzy => "YATZY",
            Stage::Blackjack => "BLACKJACK",
            Stage::RouletteInterlude => "ROULETTE_INTERLUDE",
            Stage::Trivia => "TRIVIA",
            Stage::DiceHiLo => "DICE_HI_LO",
            Stage::MusicQuiz => "MUSIC_QUIZ",
            Stage::Holdem => "HOLDEM",
            Stage::Completed => "COMPLETED",
            Stage::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Cancelled)
    }

    /// Successor in `mode`'s plan. `None` for terminal stages or stages the
    /// mode never visits.
    pub fn next(self, mode: MatchMode) -> Option<Stage> {
        let plan = mode.stage_plan();
        let idx = plan.iter().position(|s| *s == self)?;
        plan.get(idx + 1).copied()
    }
}

macro_rules! impl_str_enum {
    ($ty:ty, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        DomainError::validation(
                            ValidationKind::InvalidPayload,
                            format!("unknown {} {s:?}", stringify!($ty)),
                        )
                    })
            }
        }
    };
}

impl_str_enum!(
    MatchMode,
    [MatchMode::ChickenRun, MatchMode::FiveKamp, MatchMode::BlackjackOnly]
);
impl_str_enum!(
    MatchStatus,
    [
        MatchStatus::Created,
        MatchStatus::Running,
        MatchStatus::Completed,
        MatchStatus::Cancelled,
    ]
);
impl_str_enum!(
    Stage,
    [
        Stage::Lobby,
        Stage::ReadyCheck,
        Stage::Yatzy,
        Stage::Blackjack,
        Stage::RouletteInterlude,
        Stage::Trivia,
        Stage::DiceHiLo,
        Stage::MusicQuiz,
        Stage::Holdem,
        Stage::Completed,
        Stage::Cancelled,
    ]
);
