//! Greedy yatzy scorer.

use tracing::debug;

use super::trait_def::BotStrategy;
use crate::domain::actions::PlayerAction;
use crate::domain::stages::yatzy::{best_category, score, YatzyCard, YatzyCategory, MAX_ROLLS};
use crate::domain::types::Seat;
use crate::domain::view::{MatchView, StageView};

/// Points at which the greedy player stops rolling early.
const GOOD_ENOUGH: i64 = 20;

/// Chases the most common face and banks the best open category as soon as
/// it is worth keeping.
pub struct Greedy;

impl Greedy {
    pub const NAME: &'static str = "greedy";
    pub const VERSION: &'static str = "1.0.0";
}

fn modal_face(dice: &[u8; 5]) -> u8 {
    let mut counts = [0u8; 7];
    for d in dice {
        counts[*d as usize] += 1;
    }
    (1..=6u8)
        .max_by_key(|f| (counts[*f as usize], *f))
        .unwrap_or(6)
}

fn worth_keeping(category: YatzyCategory, points: i64) -> bool {
    let pattern = matches!(
        category,
        YatzyCategory::Yatzy
            | YatzyCategory::LargeStraight
            | YatzyCategory::SmallStraight
            | YatzyCategory::FullHouse
    );
    points >= GOOD_ENOUGH || (pattern && points > 0)
}

pub(crate) fn decide(card: &YatzyCard) -> Option<PlayerAction> {
    if card.is_complete() {
        return None;
    }
    if card.rolls_used == 0 {
        return Some(PlayerAction::YatzyRoll { hold: [false; 5] });
    }
    let best = best_category(card, &card.dice)?;
    if card.rolls_used >= MAX_ROLLS || worth_keeping(best, score(best, &card.dice)) {
        return Some(PlayerAction::YatzyScore { category: best });
    }
    let face = modal_face(&card.dice);
    let mut hold = [false; 5];
    for (slot, die) in hold.iter_mut().zip(card.dice.iter()) {
        *slot = *die == face;
    }
    Some(PlayerAction::YatzyRoll { hold })
}

impl BotStrategy for Greedy {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction> {
        let StageView::Yatzy(yatzy) = &view.detail else {
            return None;
        };
        let action = decide(yatzy.card(seat)?);
        if let Some(action) = &action {
            debug!(match_id = view.match_id, seat, action = action.name(), "yatzy bot decided");
        }
        action
    }
}
