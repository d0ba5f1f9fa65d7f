//! The match event log vocabulary.

use serde::{Deserialize, Serialize};

use crate::domain::rules::MatchRules;
use crate::domain::stages::blackjack::BlackjackEvent;
use crate::domain::stages::dice_hilo::DiceEvent;
use crate::domain::stages::holdem::HoldemEvent;
use crate::domain::stages::quiz::QuizEvent;
use crate::domain::stages::roulette::RouletteEvent;
use crate::domain::stages::yatzy::YatzyEvent;
use crate::domain::stages::{SeatAmount, StageSummary};
use crate::domain::types::{Chips, MatchMode, Millis, Seat, Stage, UserId};

/// One immutable entry of a match's log, ordered by `(match_id, seq)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub match_id: i64,
    pub seq: i64,
    /// Server-assigned; the only timestamp reducers read.
    pub server_ts: Millis,
    /// Advisory only.
    pub client_ts: Option<Millis>,
    pub kind: MatchEventKind,
}

impl MatchEvent {
    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum MatchEventKind {
    MatchCreated {
        mode: MatchMode,
        rules: MatchRules,
        seed: u64,
        host_user_id: UserId,
    },
    PlayerJoined {
        seat: Seat,
        user_id: Option<UserId>,
        display_name: String,
        is_bot: bool,
        initial_stack: Chips,
    },
    PlayerLeft {
        seat: Seat,
    },
    PlayerConnected {
        seat: Seat,
    },
    PlayerDisconnected {
        seat: Seat,
    },
    BotSubstituted {
        seat: Seat,
    },
    AutopilotReleased {
        seat: Seat,
    },
    ReadyConfirmed {
        seat: Seat,
    },
    StageStarted {
        stage: Stage,
    },
    StageCompleted {
        stage: Stage,
        summary: StageSummary,
    },
    MatchCompleted {
        final_stacks: Vec<SeatAmount>,
    },
    MatchCancelled {
        reason: String,
    },
    /// Compensating ledger entry; the log is never edited.
    StackCorrected {
        seat: Seat,
        delta: Chips,
        note: String,
    },

    Yatzy(YatzyEvent),
    Blackjack(BlackjackEvent),
    Roulette(RouletteEvent),
    Trivia(QuizEvent),
    DiceHiLo(DiceEvent),
    MusicQuiz(QuizEvent),
    Holdem(HoldemEvent),
}

impl MatchEventKind {
    /// Leaf name stored in `match_events.event_type`.
    pub fn event_type(&self) -> &'static str {
        match self {
            MatchEventKind::MatchCreated { .. } => "MatchCreated",
            MatchEventKind::PlayerJoined { .. } => "PlayerJoined",
            MatchEventKind::PlayerLeft { .. } => "PlayerLeft",
            MatchEventKind::PlayerConnected { .. } => "PlayerConnected",
            MatchEventKind::PlayerDisconnected { .. } => "PlayerDisconnected",
            MatchEventKind::BotSubstituted { .. } => "BotSubstituted",
            MatchEventKind::AutopilotReleased { .. } => "AutopilotReleased",
            MatchEventKind::ReadyConfirmed { .. } => "ReadyConfirmed",
            MatchEventKind::StageStarted { .. } => "StageStarted",
            MatchEventKind::StageCompleted { .. } => "StageCompleted",
            MatchEventKind::MatchCompleted { .. } => "MatchCompleted",
            MatchEventKind::MatchCancelled { .. } => "MatchCancelled",
            MatchEventKind::StackCorrected { .. } => "StackCorrected",
            MatchEventKind::Yatzy(e) => e.name(),
            MatchEventKind::Blackjack(e) => e.name(),
            MatchEventKind::Roulette(e) => e.name(),
            MatchEventKind::Trivia(e) | MatchEventKind::MusicQuiz(e) => e.name(),
            MatchEventKind::DiceHiLo(e) => e.name(),
            MatchEventKind::Holdem(e) => e.name(),
        }
    }

    /// Carries randomness or answers that must stay hidden while the match
    /// is live (shoe and deck seeds, drawn quiz items).
    pub fn is_sealed(&self) -> bool {
        matches!(
            self,
            MatchEventKind::Blackjack(BlackjackEvent::RoundOpened { .. })
                | MatchEventKind::Holdem(HoldemEvent::HandStarted { .. })
                | MatchEventKind::Trivia(QuizEvent::ItemsDrawn { .. })
                | MatchEventKind::MusicQuiz(QuizEvent::ItemsDrawn { .. })
        )
    }

    /// Stage transitions force a snapshot.
    pub fn is_stage_boundary(&self) -> bool {
        matches!(
            self,
            MatchEventKind::StageStarted { .. }
                | MatchEventKind::MatchCompleted { .. }
                | MatchEventKind::MatchCancelled { .. }
        )
    }
}
