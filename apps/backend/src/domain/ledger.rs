//! Currency engine.
//!
//! Every stack change is one `LedgerEntry` derived from exactly one event.
//! `entries_for` is the only place that decides which events move chips; the
//! stage reducers record outcomes (deltas) in their events and never touch a
//! stack themselves.

use serde::{Deserialize, Serialize};

use crate::domain::events::{MatchEvent, MatchEventKind};
use crate::domain::player::MatchPlayer;
use crate::domain::stages::blackjack::BlackjackEvent;
use crate::domain::stages::dice_hilo::{DiceEvent, HiLoCall};
use crate::domain::stages::holdem::HoldemEvent;
use crate::domain::stages::quiz::QuizEvent;
use crate::domain::stages::roulette::RouletteEvent;
use crate::domain::stages::StageSummary;
use crate::domain::types::{Chips, Millis, Seat, Stage, UserId};

/// Holdem blinds never drop below this.
pub const MIN_SMALL_BLIND: Chips = 10;
pub const TIMED_BONUS_FACTOR: f64 = 0.75;
pub const YATZY_SEED_MULTIPLIER: Chips = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerReason {
    YatzySeed,
    BlackjackHand,
    RouletteSpin,
    TriviaAnswer,
    DiceHiLo,
    MusicQuiz,
    HoldemPot,
    Correction,
}

impl LedgerReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LedgerReason::YatzySeed => "YATZY_SEED",
            LedgerReason::BlackjackHand => "BLACKJACK_HAND",
            LedgerReason::RouletteSpin => "ROULETTE_SPIN",
            LedgerReason::TriviaAnswer => "TRIVIA_ANSWER",
            LedgerReason::DiceHiLo => "DICE_HI_LO",
            LedgerReason::MusicQuiz => "MUSIC_QUIZ",
            LedgerReason::HoldemPot => "HOLDEM_POT",
            LedgerReason::Correction => "CORRECTION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub match_id: i64,
    /// Seq of the event that caused this entry.
    pub seq: i64,
    pub seat: Seat,
    pub user_id: Option<UserId>,
    pub stage: Stage,
    pub delta: Chips,
    pub reason: LedgerReason,
    pub ts: Millis,
}

pub fn apply(stack: Chips, entry: &LedgerEntry) -> Chips {
    stack + entry.delta
}

/// Delta that sets `stack` to `score * 10`.
pub fn yatzy_seed_delta(score: i64, stack: Chips) -> Chips {
    score * YATZY_SEED_MULTIPLIER - stack
}

pub fn bj_profit(bj_start: Chips, bj_end: Chips) -> Chips {
    (bj_end - bj_start).max(0)
}

pub fn bj_loss(bj_start: Chips, bj_end: Chips) -> Chips {
    (bj_start - bj_end).max(0)
}

/// Red/black pays even money; zero loses.
pub fn roulette_delta(won: bool, amount: Chips) -> Chips {
    if won {
        amount
    } else {
        -amount
    }
}

/// `base + round(base * clamp(1 - t/T, 0, 1) * 0.75)` with `t` and `T` in ms.
pub fn timed_points(base: i64, elapsed_ms: Millis, window_ms: Millis) -> i64 {
    if window_ms <= 0 {
        return base;
    }
    let remaining = (1.0 - elapsed_ms as f64 / window_ms as f64).clamp(0.0, 1.0);
    base + (base as f64 * remaining * TIMED_BONUS_FACTOR).round() as i64
}

/// Even money on the second die beating (HIGHER) or missing (LOWER) the first.
pub fn dice_hilo_delta(call: HiLoCall, first: u8, second: u8, amount: Chips) -> Chips {
    if first == second {
        return 0;
    }
    let won = match call {
        HiLoCall::Higher => second > first,
        HiLoCall::Lower => second < first,
    };
    if won {
        amount
    } else {
        -amount
    }
}

/// `max(10, round(median / 200))`.
pub fn holdem_small_blind(stacks: &[Chips]) -> Chips {
    if stacks.is_empty() {
        return MIN_SMALL_BLIND;
    }
    let mut sorted = stacks.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    };
    ((median / 200.0).round() as Chips).max(MIN_SMALL_BLIND)
}

/// Small blind after `hands_dealt` hands, doubling each completed orbit.
pub fn blind_level(base_sb: Chips, hands_dealt: u32, orbit: u32) -> Chips {
    if orbit == 0 {
        return base_sb;
    }
    let doublings = (hands_dealt / orbit).min(32);
    base_sb.saturating_mul(1 << doublings)
}

/// Ledger entries caused by `event`, given the stage and player state just
/// before it.
pub fn entries_for(event: &MatchEvent, current: Stage, players: &[MatchPlayer]) -> Vec<LedgerEntry> {
    let entry = |seat: Seat, stage: Stage, delta: Chips, reason: LedgerReason| LedgerEntry {
        match_id: event.match_id,
        seq: event.seq,
        seat,
        user_id: players.iter().find(|p| p.seat == seat).and_then(|p| p.user_id),
        stage,
        delta,
        reason,
        ts: event.server_ts,
    };

    match &event.kind {
        MatchEventKind::StageCompleted {
            stage,
            summary: StageSummary::Yatzy { scores },
        } => scores
            .iter()
            .map(|s| {
                let stack = players
                    .iter()
                    .find(|p| p.seat == s.seat)
                    .map_or(0, |p| p.stack);
                entry(
                    s.seat,
                    *stage,
                    yatzy_seed_delta(s.amount, stack),
                    LedgerReason::YatzySeed,
                )
            })
            .collect(),
        MatchEventKind::Blackjack(BlackjackEvent::HandResolved { seat, delta, .. }) => {
            vec![entry(*seat, Stage::Blackjack, *delta, LedgerReason::BlackjackHand)]
        }
        MatchEventKind::Roulette(RouletteEvent::WagerSettled { seat, delta, .. }) => vec![entry(
            *seat,
            Stage::RouletteInterlude,
            *delta,
            LedgerReason::RouletteSpin,
        )],
        MatchEventKind::Trivia(QuizEvent::AnswerSubmitted { seat, points, .. }) if *points > 0 => {
            vec![entry(*seat, Stage::Trivia, *points, LedgerReason::TriviaAnswer)]
        }
        MatchEventKind::MusicQuiz(QuizEvent::AnswerSubmitted { seat, points, .. })
            if *points > 0 =>
        {
            vec![entry(*seat, Stage::MusicQuiz, *points, LedgerReason::MusicQuiz)]
        }
        MatchEventKind::DiceHiLo(DiceEvent::CallSettled { seat, delta, .. }) => {
            vec![entry(*seat, Stage::DiceHiLo, *delta, LedgerReason::DiceHiLo)]
        }
        MatchEventKind::Holdem(HoldemEvent::HandSettled { results, .. }) => results
            .iter()
            .map(|r| entry(r.seat, Stage::Holdem, r.delta, LedgerReason::HoldemPot))
            .collect(),
        MatchEventKind::StackCorrected { seat, delta, .. } => {
            vec![entry(*seat, current, *delta, LedgerReason::Correction)]
        }
        _ => Vec::new(),
    }
}
