//! Scandinavian Yatzy: fifteen categories, upper bonus 50 at 63 or more.
//!
//! Every participant fills their own card concurrently. A turn is up to three
//! rolls (with holds after the first) followed by scoring one open category.

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::rules::{secs_to_millis, MatchRules};
use crate::domain::stages::{SeatAmount, StageCtx, StageReducer, StageSummary};
use crate::domain::types::{Millis, Seat};
use crate::errors::domain::{DomainError, IllegalKind, InfraErrorKind};

pub const MAX_ROLLS: u8 = 3;
pub const UPPER_BONUS_THRESHOLD: i64 = 63;
pub const UPPER_BONUS: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YatzyCategory {
    Ones,
    Twos,
    Threes,
    Fours,
    Fives,
    Sixes,
    OnePair,
    TwoPairs,
    ThreeOfAKind,
    FourOfAKind,
    SmallStraight,
    LargeStraight,
    FullHouse,
    Chance,
    Yatzy,
}

pub const CATEGORIES: [YatzyCategory; 15] = [
    YatzyCategory::Ones,
    YatzyCategory::Twos,
    YatzyCategory::Threes,
    YatzyCategory::Fours,
    YatzyCategory::Fives,
    YatzyCategory::Sixes,
    YatzyCategory::OnePair,
    YatzyCategory::TwoPairs,
    YatzyCategory::ThreeOfAKind,
    YatzyCategory::FourOfAKind,
    YatzyCategory::SmallStraight,
    YatzyCategory::LargeStraight,
    YatzyCategory::FullHouse,
    YatzyCategory::Chance,
    YatzyCategory::Yatzy,
];

impl YatzyCategory {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_upper(self) -> bool {
        self.index() < 6
    }
}

fn counts(dice: &[u8; 5]) -> [u8; 7] {
    let mut c = [0u8; 7];
    for d in dice {
        if let Some(n) = c.get_mut(*d as usize) {
            *n += 1;
        }
    }
    c
}

/// Faces (high to low) showing at least `n` times.
fn faces_with(c: &[u8; 7], n: u8) -> impl Iterator<Item = i64> + '_ {
    (1..=6usize).rev().filter(move |f| c[*f] >= n).map(|f| f as i64)
}

/// Points `dice` would earn in `category`.
pub fn score(category: YatzyCategory, dice: &[u8; 5]) -> i64 {
    let c = counts(dice);
    let sum: i64 = dice.iter().map(|d| *d as i64).sum();
    match category {
        YatzyCategory::Ones
        | YatzyCategory::Twos
        | YatzyCategory::Threes
        | YatzyCategory::Fours
        | YatzyCategory::Fives
        | YatzyCategory::Sixes => {
            let face = category.index() + 1;
            face as i64 * c[face] as i64
        }
        YatzyCategory::OnePair => faces_with(&c, 2).next().map_or(0, |f| f * 2),
        YatzyCategory::TwoPairs => {
            let pairs: Vec<i64> = faces_with(&c, 2).take(2).collect();
            if pairs.len() == 2 {
                (pairs[0] + pairs[1]) * 2
            } else {
                0
            }
        }
        YatzyCategory::ThreeOfAKind => faces_with(&c, 3).next().map_or(0, |f| f * 3),
        YatzyCategory::FourOfAKind => faces_with(&c, 4).next().map_or(0, |f| f * 4),
        YatzyCategory::SmallStraight => {
            if (1..=5).all(|f| c[f] == 1) {
                15
            } else {
                0
            }
        }
        YatzyCategory::LargeStraight => {
            if (2..=6).all(|f| c[f] == 1) {
                20
            } else {
                0
            }
        }
        YatzyCategory::FullHouse => {
            let three = (1..=6).any(|f| c[f] == 3);
            let two = (1..=6).any(|f| c[f] == 2);
            if three && two {
                sum
            } else {
                0
            }
        }
        YatzyCategory::Chance => sum,
        YatzyCategory::Yatzy => {
            if c.iter().any(|n| *n == 5) {
                50
            } else {
                0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YatzyCard {
    pub seat: Seat,
    pub dice: [u8; 5],
    pub rolls_used: u8,
    /// Indexed by `YatzyCategory::index`.
    pub scores: Vec<Option<i64>>,
    pub turn_deadline: Millis,
}

impl YatzyCard {
    fn new(seat: Seat, turn_deadline: Millis) -> Self {
        Self {
            seat,
            dice: [0; 5],
            rolls_used: 0,
            scores: vec![None; CATEGORIES.len()],
            turn_deadline,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.scores.iter().all(Option::is_some)
    }

    pub fn is_open(&self, category: YatzyCategory) -> bool {
        self.scores[category.index()].is_none()
    }

    pub fn open_categories(&self) -> impl Iterator<Item = YatzyCategory> + '_ {
        CATEGORIES.into_iter().filter(|c| self.is_open(*c))
    }

    pub fn upper_total(&self) -> i64 {
        CATEGORIES
            .iter()
            .filter(|c| c.is_upper())
            .filter_map(|c| self.scores[c.index()])
            .sum()
    }

    pub fn total(&self) -> i64 {
        let all: i64 = self.scores.iter().flatten().sum();
        if self.upper_total() >= UPPER_BONUS_THRESHOLD {
            all + UPPER_BONUS
        } else {
            all
        }
    }
}

/// Highest-scoring open category for `dice`.
pub fn best_category(card: &YatzyCard, dice: &[u8; 5]) -> Option<YatzyCategory> {
    card.open_categories().max_by_key(|c| score(*c, dice))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum YatzyEvent {
    DiceRolled {
        seat: Seat,
        dice: [u8; 5],
        roll: u8,
    },
    CategoryScored {
        seat: Seat,
        category: YatzyCategory,
        points: i64,
    },
}

impl YatzyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            YatzyEvent::DiceRolled { .. } => "DiceRolled",
            YatzyEvent::CategoryScored { .. } => "CategoryScored",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YatzyState {
    pub cards: Vec<YatzyCard>,
    pub turn_ms: Millis,
}

impl YatzyState {
    pub fn open(seats: &[Seat], rules: &MatchRules, now: Millis) -> Self {
        let turn_ms = secs_to_millis(rules.yatzy_turn_secs);
        Self {
            cards: seats
                .iter()
                .map(|s| YatzyCard::new(*s, now + turn_ms))
                .collect(),
            turn_ms,
        }
    }

    pub fn card(&self, seat: Seat) -> Option<&YatzyCard> {
        self.cards.iter().find(|c| c.seat == seat)
    }

    fn card_mut(&mut self, seat: Seat) -> Option<&mut YatzyCard> {
        self.cards.iter_mut().find(|c| c.seat == seat)
    }

    fn require_card(&self, seat: Seat) -> Result<&YatzyCard, DomainError> {
        let card = self.card(seat).ok_or_else(|| {
            DomainError::illegal(IllegalKind::NotSeated, format!("seat {seat} has no yatzy card"))
        })?;
        if card.is_complete() {
            return Err(DomainError::illegal(
                IllegalKind::AlreadyActed,
                format!("seat {seat} has filled every category"),
            ));
        }
        Ok(card)
    }

    fn roll(card: &YatzyCard, hold: &[bool; 5], ctx: &StageCtx<'_>) -> [u8; 5] {
        let mut rng = ctx.rng(card.seat as u64);
        let mut dice = card.dice;
        for (i, die) in dice.iter_mut().enumerate() {
            if card.rolls_used == 0 || !hold[i] {
                *die = rng.die();
            }
        }
        dice
    }
}

impl StageReducer for YatzyState {
    type Event = YatzyEvent;

    fn decide(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<YatzyEvent>, DomainError> {
        let card = self.require_card(seat)?;
        match action {
            PlayerAction::YatzyRoll { hold } => {
                if card.rolls_used >= MAX_ROLLS {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongPhase,
                        "no rolls left this turn; score a category",
                    ));
                }
                Ok(vec![YatzyEvent::DiceRolled {
                    seat,
                    dice: Self::roll(card, hold, ctx),
                    roll: card.rolls_used + 1,
                }])
            }
            PlayerAction::YatzyScore { category } => {
                if card.rolls_used == 0 {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongPhase,
                        "roll at least once before scoring",
                    ));
                }
                if !card.is_open(*category) {
                    return Err(DomainError::illegal(
                        IllegalKind::AlreadyActed,
                        format!("{category:?} is already scored"),
                    ));
                }
                Ok(vec![YatzyEvent::CategoryScored {
                    seat,
                    category: *category,
                    points: score(*category, &card.dice),
                }])
            }
            other => Err(DomainError::illegal(
                IllegalKind::WrongStage,
                format!("{} is not a yatzy action", other.name()),
            )),
        }
    }

    fn advance(&self, _ctx: &StageCtx<'_>) -> Vec<YatzyEvent> {
        Vec::new()
    }

    fn expire(&self, ctx: &StageCtx<'_>) -> Vec<YatzyEvent> {
        let mut events = Vec::new();
        for card in self
            .cards
            .iter()
            .filter(|c| !c.is_complete() && c.turn_deadline <= ctx.now)
        {
            let dice = if card.rolls_used == 0 {
                let dice = Self::roll(card, &[false; 5], ctx);
                events.push(YatzyEvent::DiceRolled {
                    seat: card.seat,
                    dice,
                    roll: 1,
                });
                dice
            } else {
                card.dice
            };
            if let Some(category) = best_category(card, &dice) {
                events.push(YatzyEvent::CategoryScored {
                    seat: card.seat,
                    category,
                    points: score(category, &dice),
                });
            }
        }
        events
    }

    fn apply(&mut self, event: &YatzyEvent, ts: Millis) {
        let turn_ms = self.turn_ms;
        match event {
            YatzyEvent::DiceRolled { seat, dice, roll } => {
                if let Some(card) = self.card_mut(*seat) {
                    card.dice = *dice;
                    card.rolls_used = *roll;
                }
            }
            YatzyEvent::CategoryScored {
                seat,
                category,
                points,
            } => {
                if let Some(card) = self.card_mut(*seat) {
                    card.scores[category.index()] = Some(*points);
                    card.rolls_used = 0;
                    card.dice = [0; 5];
                    card.turn_deadline = ts + turn_ms;
                }
            }
        }
    }

    fn check(&self, event: &YatzyEvent) -> Result<(), DomainError> {
        match event {
            YatzyEvent::DiceRolled { seat, dice, roll }
                if dice.iter().any(|d| !(1..=6).contains(d)) || !(1..=MAX_ROLLS).contains(roll) =>
            {
                Err(DomainError::infra(
                    InfraErrorKind::DataCorruption,
                    format!("seat {seat} roll {roll} stored impossible dice {dice:?}"),
                ))
            }
            _ => Ok(()),
        }
    }

    fn deadline(&self) -> Option<Millis> {
        self.cards
            .iter()
            .filter(|c| !c.is_complete())
            .map(|c| c.turn_deadline)
            .min()
    }

    fn awaiting(&self) -> Vec<Seat> {
        self.cards
            .iter()
            .filter(|c| !c.is_complete())
            .map(|c| c.seat)
            .collect()
    }

    fn summary(&self) -> Option<StageSummary> {
        if !self.cards.iter().all(YatzyCard::is_complete) {
            return None;
        }
        Some(StageSummary::Yatzy {
            scores: self
                .cards
                .iter()
                .map(|c| SeatAmount {
                    seat: c.seat,
                    amount: c.total(),
                })
                .collect(),
        })
    }
}
