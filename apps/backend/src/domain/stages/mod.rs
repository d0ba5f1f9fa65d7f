//! Minigame adapters.
//!
//! Each stage owns a serializable state and a `StageReducer` impl. `decide`,
//! `advance` and `expire` only read state and produce events; `apply` folds an
//! event back in and never draws randomness.

pub mod blackjack;
pub mod dice_hilo;
pub mod holdem;
pub mod holdem_eval;
pub mod quiz;
pub mod quiz_bank;
pub mod roulette;
pub mod yatzy;

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::events::MatchEventKind;
use crate::domain::player::MatchPlayer;
use crate::domain::rng::{derive_seed, DetRng};
use crate::domain::rules::MatchRules;
use crate::domain::types::{Chips, Millis, Seat, Stage};
use crate::errors::domain::{DomainError, IllegalKind};

use self::blackjack::{BlackjackResult, BlackjackState};
use self::dice_hilo::DiceHiLoState;
use self::holdem::HoldemState;
use self::quiz::QuizState;
use self::roulette::RouletteState;
use self::yatzy::YatzyState;

/// Read-only view of the match handed to a reducer.
pub struct StageCtx<'a> {
    pub now: Millis,
    pub match_seed: u64,
    /// Seq the next produced event will receive.
    pub seq: i64,
    pub rules: &'a MatchRules,
    pub players: &'a [MatchPlayer],
}

impl StageCtx<'_> {
    pub fn rng(&self, salt: u64) -> DetRng {
        DetRng::new(derive_seed(self.match_seed, self.seq, salt))
    }

    pub fn player(&self, seat: Seat) -> Option<&MatchPlayer> {
        self.players.iter().find(|p| p.seat == seat)
    }

    pub fn stack(&self, seat: Seat) -> Chips {
        self.player(seat).map_or(0, |p| p.stack)
    }

    /// Seated and not left.
    pub fn is_active(&self, seat: Seat) -> bool {
        self.player(seat).is_some_and(|p| !p.left)
    }

    pub fn has_active_human(&self) -> bool {
        self.players.iter().any(|p| p.is_human() && !p.left)
    }
}

pub trait StageReducer {
    type Event;

    /// Validate a player action against current sub-state.
    fn decide(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<Self::Event>, DomainError>;

    /// Automatic progression; empty while waiting on players.
    fn advance(&self, ctx: &StageCtx<'_>) -> Vec<Self::Event>;

    /// Default actions for an expired deadline.
    fn expire(&self, ctx: &StageCtx<'_>) -> Vec<Self::Event>;

    fn apply(&mut self, event: &Self::Event, ts: Millis);

    /// Rejects a stored event that `apply` could not fold safely.
    fn check(&self, _event: &Self::Event) -> Result<(), DomainError> {
        Ok(())
    }

    fn check_and_apply(&mut self, event: &Self::Event, ts: Millis) -> Result<(), DomainError> {
        self.check(event)?;
        self.apply(event, ts);
        Ok(())
    }

    fn deadline(&self) -> Option<Millis>;

    /// Seats the stage is waiting on right now.
    fn awaiting(&self) -> Vec<Seat>;

    /// `Some` once the stage is complete.
    fn summary(&self) -> Option<StageSummary>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAmount {
    pub seat: Seat,
    pub amount: Chips,
}

/// Outcome carried by `StageCompleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageSummary {
    Lobby,
    ReadyCheck { absent: Vec<Seat> },
    Yatzy { scores: Vec<SeatAmount> },
    Blackjack { results: Vec<BlackjackResult> },
    Roulette { wagered: Vec<SeatAmount> },
    Quiz { points: Vec<SeatAmount> },
    DiceHiLo { net: Vec<SeatAmount> },
    Holdem { hands_played: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyCheckState {
    pub deadline: Millis,
}

/// Current stage and its private sub-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageState {
    Lobby,
    ReadyCheck(ReadyCheckState),
    Yatzy(YatzyState),
    Blackjack(BlackjackState),
    RouletteInterlude(RouletteState),
    Trivia(QuizState),
    DiceHiLo(DiceHiLoState),
    MusicQuiz(QuizState),
    Holdem(HoldemState),
    Completed,
    Cancelled,
}

/// Runs `$body` against the reducer of a minigame stage.
macro_rules! with_reducer {
    ($state:expr, $r:ident => $body:expr, $otherwise:expr) => {
        match $state {
            StageState::Yatzy($r) => $body,
            StageState::Blackjack($r) => $body,
            StageState::RouletteInterlude($r) => $body,
            StageState::Trivia($r) => $body,
            StageState::DiceHiLo($r) => $body,
            StageState::MusicQuiz($r) => $body,
            StageState::Holdem($r) => $body,
            _ => $otherwise,
        }
    };
}

/// Like `with_reducer!`, wrapping the produced stage events into `MatchEventKind`.
/// `None` outside a minigame stage.
macro_rules! wrap_events {
    (@map $produce:expr, $variant:ident) => {
        $produce
            .into_iter()
            .map(MatchEventKind::$variant)
            .collect::<Vec<MatchEventKind>>()
    };
    ($state:expr, $r:ident => $produce:expr) => {
        match $state {
            StageState::Yatzy($r) => Some(wrap_events!(@map $produce, Yatzy)),
            StageState::Blackjack($r) => Some(wrap_events!(@map $produce, Blackjack)),
            StageState::RouletteInterlude($r) => Some(wrap_events!(@map $produce, Roulette)),
            StageState::Trivia($r) => Some(wrap_events!(@map $produce, Trivia)),
            StageState::DiceHiLo($r) => Some(wrap_events!(@map $produce, DiceHiLo)),
            StageState::MusicQuiz($r) => Some(wrap_events!(@map $produce, MusicQuiz)),
            StageState::Holdem($r) => Some(wrap_events!(@map $produce, Holdem)),
            _ => None,
        }
    };
}

impl StageState {
    pub fn stage(&self) -> Stage {
        match self {
            StageState::Lobby => Stage::Lobby,
            StageState::ReadyCheck(_) => Stage::ReadyCheck,
            StageState::Yatzy(_) => Stage::Yatzy,
            StageState::Blackjack(_) => Stage::Blackjack,
            StageState::RouletteInterlude(_) => Stage::RouletteInterlude,
            StageState::Trivia(_) => Stage::Trivia,
            StageState::DiceHiLo(_) => Stage::DiceHiLo,
            StageState::MusicQuiz(_) => Stage::MusicQuiz,
            StageState::Holdem(_) => Stage::Holdem,
            StageState::Completed => Stage::Completed,
            StageState::Cancelled => Stage::Cancelled,
        }
    }

    pub fn deadline(&self) -> Option<Millis> {
        match self {
            StageState::ReadyCheck(rc) => Some(rc.deadline),
            other => with_reducer!(other, r => r.deadline(), None),
        }
    }

    pub fn awaiting(&self) -> Vec<Seat> {
        with_reducer!(self, r => r.awaiting(), Vec::new())
    }

    pub fn summary(&self) -> Option<StageSummary> {
        with_reducer!(self, r => r.summary(), None)
    }

    pub fn decide(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<MatchEventKind>, DomainError> {
        wrap_events!(self, r => r.decide(ctx, seat, action)?).ok_or_else(|| {
            DomainError::illegal(
                IllegalKind::WrongStage,
                format!("{} is not accepted during {}", action.name(), self.stage()),
            )
        })
    }

    pub fn advance(&self, ctx: &StageCtx<'_>) -> Vec<MatchEventKind> {
        wrap_events!(self, r => r.advance(ctx)).unwrap_or_default()
    }

    pub fn expire(&self, ctx: &StageCtx<'_>) -> Vec<MatchEventKind> {
        wrap_events!(self, r => r.expire(ctx)).unwrap_or_default()
    }

    /// Folds a stage event into the matching sub-state. Returns `Ok(false)`
    /// when the event belongs to a different stage.
    pub fn apply_event(&mut self, kind: &MatchEventKind, ts: Millis) -> Result<bool, DomainError> {
        match (self, kind) {
            (StageState::Yatzy(s), MatchEventKind::Yatzy(e)) => s.check_and_apply(e, ts)?,
            (StageState::Blackjack(s), MatchEventKind::Blackjack(e)) => s.check_and_apply(e, ts)?,
            (StageState::RouletteInterlude(s), MatchEventKind::Roulette(e)) => {
                s.check_and_apply(e, ts)?
            }
            (StageState::Trivia(s), MatchEventKind::Trivia(e)) => s.check_and_apply(e, ts)?,
            (StageState::DiceHiLo(s), MatchEventKind::DiceHiLo(e)) => s.check_and_apply(e, ts)?,
            (StageState::MusicQuiz(s), MatchEventKind::MusicQuiz(e)) => s.check_and_apply(e, ts)?,
            (StageState::Holdem(s), MatchEventKind::Holdem(e)) => s.check_and_apply(e, ts)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
