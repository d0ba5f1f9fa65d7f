//! Externally visible match state.
//!
//! This is what clients receive and what bot strategies read. Anything that
//! would reveal future randomness (shoe and deck seeds, undealt cards, quiz
//! answers) or another seat's hidden cards is stripped here.

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;
use crate::domain::events::{MatchEvent, MatchEventKind};
use crate::domain::match_state::MatchState;
use crate::domain::stages::blackjack::{BjHand, BlackjackState, RoundPhase, SpotBet, SPOTS};
use crate::domain::stages::dice_hilo::DiceHiLoState;
use crate::domain::stages::holdem::{HoldemState, ShownHand, Street};
use crate::domain::stages::quiz::{Difficulty, QuizKind, QuizState};
use crate::domain::stages::roulette::RouletteState;
use crate::domain::stages::yatzy::YatzyState;
use crate::domain::stages::{SeatAmount, StageState};
use crate::domain::types::{Chips, MatchMode, MatchStatus, Millis, Seat, Stage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: Seat,
    pub display_name: String,
    pub is_bot: bool,
    pub is_connected: bool,
    pub autopilot: bool,
    pub ready: bool,
    pub left: bool,
    pub stack: Chips,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    pub match_id: i64,
    pub mode: MatchMode,
    pub status: MatchStatus,
    pub stage: Stage,
    pub last_seq: i64,
    /// Seat of the viewer, if seated.
    pub you: Option<Seat>,
    pub players: Vec<PlayerView>,
    pub deadline: Option<Millis>,
    pub awaiting: Vec<Seat>,
    pub detail: StageView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "view", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageView {
    Lobby,
    ReadyCheck,
    Yatzy(YatzyState),
    Blackjack(BlackjackView),
    RouletteInterlude(RouletteState),
    Trivia(QuizView),
    DiceHiLo(DiceHiLoState),
    MusicQuiz(QuizView),
    Holdem(HoldemView),
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackjackView {
    pub round: u32,
    pub rounds_total: Option<u32>,
    pub phase: RoundPhase,
    pub bets: Vec<SpotBet>,
    pub finished_betting: Vec<Seat>,
    pub hands: Vec<BjHand>,
    /// Up card until the dealer resolves.
    pub dealer: Vec<Card>,
    pub net: Vec<SeatAmount>,
}

impl BlackjackView {
    pub fn active_hand(&self) -> Option<&BjHand> {
        self.hands.iter().find(|h| !h.done)
    }

    /// Chips `seat` has at risk this round.
    pub fn exposure(&self, seat: Seat) -> Chips {
        if self.hands.is_empty() {
            self.bets.iter().filter(|b| b.seat == seat).map(|b| b.wager).sum()
        } else {
            self.hands.iter().filter(|h| h.seat == seat).map(|h| h.wager).sum()
        }
    }

    pub fn free_spot(&self) -> Option<u8> {
        (0..SPOTS).find(|spot| !self.bets.iter().any(|b| b.spot == *spot))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenQuestion {
    pub index: u32,
    pub prompt: String,
    pub choices: Vec<String>,
    pub difficulty: Difficulty,
    pub base_points: i64,
    pub opened_at: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizView {
    pub kind: QuizKind,
    pub total: u32,
    pub question: Option<OpenQuestion>,
    pub answered: Vec<Seat>,
    /// Correct choice of the most recently closed question.
    pub last_answer: Option<u8>,
    pub points: Vec<SeatAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSeatView {
    pub seat: Seat,
    pub stack: Chips,
    pub street_bet: Chips,
    pub committed: Chips,
    pub folded: bool,
    pub all_in: bool,
    /// Only the viewer's own cards.
    pub hole: Option<Vec<Card>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandView {
    pub hand_no: u32,
    pub button: Seat,
    pub sb: Chips,
    pub bb: Chips,
    pub street: Street,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub to_act: Option<Seat>,
    pub players: Vec<HandSeatView>,
}

impl HandView {
    pub fn seat(&self, seat: Seat) -> Option<&HandSeatView> {
        self.players.iter().find(|p| p.seat == seat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldemView {
    pub hands_played: u32,
    pub max_hands: u32,
    pub hand: Option<HandView>,
    pub last_showdown: Vec<ShownHand>,
}

/// An event as clients see it. Sealed payloads are withheld until the match
/// is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicEvent {
    pub seq: i64,
    pub event_type: String,
    pub server_ts: Millis,
    pub client_ts: Option<Millis>,
    pub kind: Option<MatchEventKind>,
}

impl PublicEvent {
    pub fn new(event: &MatchEvent, reveal_sealed: bool) -> Self {
        let visible = reveal_sealed || !event.kind.is_sealed();
        Self {
            seq: event.seq,
            event_type: event.event_type().to_string(),
            server_ts: event.server_ts,
            client_ts: event.client_ts,
            kind: visible.then(|| event.kind.clone()),
        }
    }

    pub fn list(events: &[MatchEvent], reveal_sealed: bool) -> Vec<Self> {
        events.iter().map(|e| Self::new(e, reveal_sealed)).collect()
    }
}

impl MatchView {
    pub fn for_viewer(state: &MatchState, viewer: Option<Seat>) -> Self {
        Self {
            match_id: state.match_id,
            mode: state.mode,
            status: state.status,
            stage: state.current_stage(),
            last_seq: state.last_seq,
            you: viewer,
            players: state
                .players
                .iter()
                .map(|p| PlayerView {
                    seat: p.seat,
                    display_name: p.display_name.clone(),
                    is_bot: p.is_bot,
                    is_connected: p.is_connected,
                    autopilot: p.autopilot,
                    ready: p.ready,
                    left: p.left,
                    stack: p.stack,
                })
                .collect(),
            deadline: state.next_deadline(),
            awaiting: state.stage.awaiting(),
            detail: StageView::of(&state.stage, viewer),
        }
    }

    pub fn stack(&self, seat: Seat) -> Chips {
        self.players
            .iter()
            .find(|p| p.seat == seat)
            .map_or(0, |p| p.stack)
    }
}

impl StageView {
    fn of(stage: &StageState, viewer: Option<Seat>) -> Self {
        match stage {
            StageState::Lobby => StageView::Lobby,
            StageState::ReadyCheck(_) => StageView::ReadyCheck,
            StageState::Yatzy(s) => StageView::Yatzy(s.clone()),
            StageState::Blackjack(s) => StageView::Blackjack(blackjack(s)),
            StageState::RouletteInterlude(s) => StageView::RouletteInterlude(s.clone()),
            StageState::Trivia(s) => StageView::Trivia(quiz(s)),
            StageState::DiceHiLo(s) => StageView::DiceHiLo(s.clone()),
            StageState::MusicQuiz(s) => StageView::MusicQuiz(quiz(s)),
            StageState::Holdem(s) => StageView::Holdem(holdem(s, viewer)),
            StageState::Completed => StageView::Completed,
            StageState::Cancelled => StageView::Cancelled,
        }
    }
}

fn blackjack(s: &BlackjackState) -> BlackjackView {
    BlackjackView {
        round: s.round,
        rounds_total: s.rounds_total,
        phase: s.phase,
        bets: s.bets.clone(),
        finished_betting: s.finished_betting.clone(),
        hands: s.hands.clone(),
        dealer: s.dealer.clone(),
        net: s.net.clone(),
    }
}

fn quiz(s: &QuizState) -> QuizView {
    let question = match (s.current, s.current_item(), s.opened_at) {
        (Some(index), Some(item), Some(opened_at)) => Some(OpenQuestion {
            index,
            prompt: item.prompt.clone(),
            choices: item.choices.clone(),
            difficulty: item.difficulty,
            base_points: item.base_points,
            opened_at,
        }),
        _ => None,
    };
    let last_answer = s
        .closed_through
        .and_then(|i| s.items.get(i as usize))
        .map(|item| item.answer);
    QuizView {
        kind: s.kind,
        total: s.count,
        question,
        answered: s.answers.iter().map(|a| a.seat).collect(),
        last_answer,
        points: s.points.clone(),
    }
}

fn holdem(s: &HoldemState, viewer: Option<Seat>) -> HoldemView {
    let hand = s.hand.as_ref().map(|h| HandView {
        hand_no: h.hand_no,
        button: h.button,
        sb: h.sb,
        bb: h.bb,
        street: h.street,
        board: h.board.clone(),
        pot: h.pot(),
        current_bet: h.current_bet,
        min_raise: h.min_raise,
        to_act: h.to_act,
        players: h
            .players
            .iter()
            .map(|p| HandSeatView {
                seat: p.seat,
                stack: p.remaining(),
                street_bet: p.street_bet,
                committed: p.committed,
                folded: p.folded,
                all_in: p.all_in(),
                hole: (Some(p.seat) == viewer).then(|| p.hole.clone()),
            })
            .collect(),
    });
    HoldemView {
        hands_played: s.hands_played,
        max_hands: s.max_hands,
        hand,
        last_showdown: s.last_showdown.clone(),
    }
}
