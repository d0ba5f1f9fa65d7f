//! Timed multiple-choice quiz shared by the Trivia and Music Quiz stages.
//!
//! Items are drawn once at stage open and recorded in `ItemsDrawn`. Points for
//! a correct answer are computed from server time at acceptance and stored in
//! the `AnswerSubmitted` payload.

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::ledger;
use crate::domain::rules::{secs_to_millis, MatchRules};
use crate::domain::stages::quiz_bank::{BankEntry, TRACKS, TRIVIA};
use crate::domain::stages::{SeatAmount, StageCtx, StageReducer, StageSummary};
use crate::domain::types::{Millis, Seat};
use crate::errors::domain::{DomainError, IllegalKind};

pub const MUSIC_BASE_POINTS: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn base_points(self) -> i64 {
        match self {
            Difficulty::Easy => 80,
            Difficulty::Medium => 140,
            Difficulty::Hard => 220,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizKind {
    Trivia,
    Music,
}

impl QuizKind {
    pub fn bank(self) -> &'static [BankEntry] {
        match self {
            QuizKind::Trivia => TRIVIA,
            QuizKind::Music => TRACKS,
        }
    }

    fn base_points(self, difficulty: Difficulty) -> i64 {
        match self {
            QuizKind::Trivia => difficulty.base_points(),
            QuizKind::Music => MUSIC_BASE_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub answer: u8,
    pub difficulty: Difficulty,
    pub base_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub seat: Seat,
    pub choice: u8,
    pub correct: bool,
    pub elapsed_ms: Millis,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuizEvent {
    ItemsDrawn {
        items: Vec<QuizItem>,
    },
    ItemOpened {
        index: u32,
    },
    AnswerSubmitted {
        seat: Seat,
        index: u32,
        choice: u8,
        correct: bool,
        elapsed_ms: Millis,
        points: i64,
    },
    AnswerMissed {
        seat: Seat,
        index: u32,
    },
    ItemClosed {
        index: u32,
        answer: u8,
    },
    QuizEnded,
}

impl QuizEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QuizEvent::ItemsDrawn { .. } => "ItemsDrawn",
            QuizEvent::ItemOpened { .. } => "ItemOpened",
            QuizEvent::AnswerSubmitted { .. } => "AnswerSubmitted",
            QuizEvent::AnswerMissed { .. } => "AnswerMissed",
            QuizEvent::ItemClosed { .. } => "ItemClosed",
            QuizEvent::QuizEnded => "QuizEnded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizState {
    pub kind: QuizKind,
    pub count: u32,
    pub seats: Vec<Seat>,
    pub items: Vec<QuizItem>,
    /// Index of the open item.
    pub current: Option<u32>,
    pub closed_through: Option<u32>,
    pub opened_at: Option<Millis>,
    pub window_ms: Millis,
    pub answers: Vec<QuizAnswer>,
    pub points: Vec<SeatAmount>,
    pub drawn: bool,
    pub ended: bool,
}

impl QuizState {
    pub fn open(kind: QuizKind, seats: &[Seat], rules: &MatchRules) -> Self {
        let (count, window_secs) = match kind {
            QuizKind::Trivia => (rules.trivia_questions, rules.trivia_window_secs),
            QuizKind::Music => (rules.music_rounds, rules.music_window_secs),
        };
        Self {
            kind,
            count,
            seats: seats.to_vec(),
            items: Vec::new(),
            current: None,
            closed_through: None,
            opened_at: None,
            window_ms: secs_to_millis(window_secs),
            answers: Vec::new(),
            points: seats
                .iter()
                .map(|s| SeatAmount {
                    seat: *s,
                    amount: 0,
                })
                .collect(),
            drawn: false,
            ended: false,
        }
    }

    pub fn current_item(&self) -> Option<&QuizItem> {
        self.current.and_then(|i| self.items.get(i as usize))
    }

    pub fn item_deadline(&self) -> Option<Millis> {
        self.current
            .and(self.opened_at)
            .map(|at| at + self.window_ms)
    }

    fn answered(&self, seat: Seat) -> bool {
        self.answers.iter().any(|a| a.seat == seat)
    }

    fn draw(&self, ctx: &StageCtx<'_>) -> Vec<QuizItem> {
        let bank = self.kind.bank();
        let mut order: Vec<usize> = (0..bank.len()).collect();
        ctx.rng(0).shuffle(&mut order);
        order
            .into_iter()
            .take(self.count as usize)
            .map(|i| {
                let e = &bank[i];
                QuizItem {
                    id: e.id.to_string(),
                    prompt: e.prompt.to_string(),
                    choices: e.choices.iter().map(|c| c.to_string()).collect(),
                    answer: e.answer,
                    difficulty: e.difficulty,
                    base_points: self.kind.base_points(e.difficulty),
                }
            })
            .collect()
    }

    fn close_current(&self, index: u32) -> Vec<QuizEvent> {
        let mut events: Vec<QuizEvent> = self
            .seats
            .iter()
            .filter(|s| !self.answered(**s))
            .map(|s| QuizEvent::AnswerMissed { seat: *s, index })
            .collect();
        let answer = self.current_item().map_or(0, |i| i.answer);
        events.push(QuizEvent::ItemClosed { index, answer });
        events
    }

    fn answer_index(&self, action: &PlayerAction) -> Option<(u32, u8)> {
        match (self.kind, action) {
            (QuizKind::Trivia, PlayerAction::SubmitAnswer { question, choice }) => {
                Some((*question, *choice))
            }
            (QuizKind::Music, PlayerAction::MusicGuess { round, choice }) => Some((*round, *choice)),
            _ => None,
        }
    }
}

impl StageReducer for QuizState {
    type Event = QuizEvent;

    fn decide(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<QuizEvent>, DomainError> {
        let (index, choice) = self.answer_index(action).ok_or_else(|| {
            DomainError::illegal(
                IllegalKind::WrongStage,
                format!("{} is not a {:?} quiz action", action.name(), self.kind),
            )
        })?;
        if !self.seats.contains(&seat) {
            return Err(DomainError::illegal(
                IllegalKind::NotSeated,
                format!("seat {seat} is not in this quiz"),
            ));
        }
        let (Some(current), Some(item), Some(opened_at)) =
            (self.current, self.current_item(), self.opened_at)
        else {
            return Err(DomainError::illegal(IllegalKind::WrongPhase, "no question is open"));
        };
        if index != current {
            return Err(DomainError::illegal(
                IllegalKind::StaleSubState,
                format!("question {index} is not open; {current} is"),
            ));
        }
        if self.answered(seat) {
            return Err(DomainError::illegal(
                IllegalKind::AlreadyActed,
                format!("seat {seat} already answered question {index}"),
            ));
        }
        let elapsed_ms = ctx.now - opened_at;
        if elapsed_ms >= self.window_ms {
            return Err(DomainError::illegal(
                IllegalKind::WrongPhase,
                format!("answer window for question {index} has closed"),
            ));
        }
        let correct = choice == item.answer;
        let points = if correct {
            ledger::timed_points(item.base_points, elapsed_ms, self.window_ms)
        } else {
            0
        };
        Ok(vec![QuizEvent::AnswerSubmitted {
            seat,
            index,
            choice,
            correct,
            elapsed_ms,
            points,
        }])
    }

    fn advance(&self, ctx: &StageCtx<'_>) -> Vec<QuizEvent> {
        if self.ended {
            return Vec::new();
        }
        if !self.drawn {
            return vec![QuizEvent::ItemsDrawn {
                items: self.draw(ctx),
            }];
        }
        match self.current {
            Some(index) => {
                let waiting = self
                    .seats
                    .iter()
                    .any(|s| ctx.is_active(*s) && !self.answered(*s));
                if waiting {
                    Vec::new()
                } else {
                    self.close_current(index)
                }
            }
            None => {
                let next = self.closed_through.map_or(0, |i| i + 1);
                if (next as usize) < self.items.len() {
                    vec![QuizEvent::ItemOpened { index: next }]
                } else {
                    vec![QuizEvent::QuizEnded]
                }
            }
        }
    }

    fn expire(&self, ctx: &StageCtx<'_>) -> Vec<QuizEvent> {
        match (self.current, self.item_deadline()) {
            (Some(index), Some(deadline)) if deadline <= ctx.now => self.close_current(index),
            _ => Vec::new(),
        }
    }

    fn apply(&mut self, event: &QuizEvent, ts: Millis) {
        match event {
            QuizEvent::ItemsDrawn { items } => {
                self.items = items.clone();
                self.drawn = true;
            }
            QuizEvent::ItemOpened { index } => {
                self.current = Some(*index);
                self.opened_at = Some(ts);
                self.answers.clear();
            }
            QuizEvent::AnswerSubmitted {
                seat,
                choice,
                correct,
                elapsed_ms,
                points,
                ..
            } => {
                self.answers.push(QuizAnswer {
                    seat: *seat,
                    choice: *choice,
                    correct: *correct,
                    elapsed_ms: *elapsed_ms,
                    points: *points,
                });
                if let Some(p) = self.points.iter_mut().find(|p| p.seat == *seat) {
                    p.amount += points;
                }
            }
            QuizEvent::AnswerMissed { .. } => {}
            QuizEvent::ItemClosed { index, .. } => {
                self.closed_through = Some(*index);
                self.current = None;
                self.opened_at = None;
            }
            QuizEvent::QuizEnded => self.ended = true,
        }
    }

    fn deadline(&self) -> Option<Millis> {
        self.item_deadline()
    }

    fn awaiting(&self) -> Vec<Seat> {
        if self.current.is_none() {
            return Vec::new();
        }
        self.seats
            .iter()
            .copied()
            .filter(|s| !self.answered(*s))
            .collect()
    }

    fn summary(&self) -> Option<StageSummary> {
        self.ended.then(|| StageSummary::Quiz {
            points: self.points.clone(),
        })
    }
}
