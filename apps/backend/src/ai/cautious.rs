//! Table-minimum roulette and dice play.

use tracing::debug;

use super::trait_def::BotStrategy;
use crate::domain::actions::PlayerAction;
use crate::domain::stages::dice_hilo::{DiceHiLoState, DicePhase, HiLoCall, MIN_CALL};
use crate::domain::stages::roulette::{RouletteColor, RouletteState, SpinPhase};
use crate::domain::types::{Chips, Seat};
use crate::domain::view::{MatchView, StageView};

/// Smallest roulette stake the cautious player puts down.
pub const ROULETTE_TABLE_MIN: Chips = 10;

/// Never risks more than the table minimum, and sits out when it can't
/// cover it.
pub struct Cautious;

impl Cautious {
    pub const NAME: &'static str = "cautious";
    pub const VERSION: &'static str = "1.0.0";
}

fn roulette(state: &RouletteState, seat: Seat, stack: Chips) -> Option<PlayerAction> {
    if state.phase != SpinPhase::Betting {
        return None;
    }
    let acted = state.passed.contains(&seat) || state.wagers.iter().any(|w| w.seat == seat);
    if acted {
        return None;
    }
    let cap = state.cap(seat)?;
    let amount = ROULETTE_TABLE_MIN.min(cap.remaining).min(stack);
    if amount <= 0 {
        return Some(PlayerAction::RoulettePass);
    }
    let color = if state.spin % 2 == 1 {
        RouletteColor::Red
    } else {
        RouletteColor::Black
    };
    Some(PlayerAction::RouletteBet { color, amount })
}

fn dice(state: &DiceHiLoState, seat: Seat, stack: Chips) -> Option<PlayerAction> {
    if state.phase != DicePhase::Calling || !state.seats.contains(&seat) {
        return None;
    }
    let acted = state.passed.contains(&seat) || state.calls.iter().any(|c| c.seat == seat);
    if acted {
        return None;
    }
    let round = state.round;
    let Some(first) = state.first_die else {
        return Some(PlayerAction::DicePass { round });
    };
    if stack < MIN_CALL {
        return Some(PlayerAction::DicePass { round });
    }
    let call = if first <= 3 {
        HiLoCall::Higher
    } else {
        HiLoCall::Lower
    };
    Some(PlayerAction::DiceCall {
        round,
        call,
        amount: MIN_CALL,
    })
}

impl BotStrategy for Cautious {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction> {
        let stack = view.stack(seat);
        let action = match &view.detail {
            StageView::RouletteInterlude(state) => roulette(state, seat, stack),
            StageView::DiceHiLo(state) => dice(state, seat, stack),
            _ => None,
        };
        if let Some(action) = &action {
            debug!(match_id = view.match_id, seat, action = action.name(), "table bot decided");
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fixtures::view_with;
    use crate::domain::rules::MatchRules;
    use crate::domain::stages::roulette::SeatCap;

    fn roulette_state(remaining: Chips) -> RouletteState {
        let mut state = RouletteState::open(&[], &[0], &MatchRules::default());
        state.phase = SpinPhase::Betting;
        state.spin = 1;
        state.caps = vec![SeatCap {
            seat: 0,
            locked: remaining,
            remaining,
        }];
        state
    }

    #[test]
    fn roulette_stake_never_exceeds_cap() {
        let view = view_with(StageView::RouletteInterlude(roulette_state(4)), &[(0, 900)]);
        assert_eq!(
            Cautious.next_action(&view, 0),
            Some(PlayerAction::RouletteBet {
                color: RouletteColor::Red,
                amount: 4
            })
        );
    }

    #[test]
    fn roulette_passes_without_profit() {
        let view = view_with(StageView::RouletteInterlude(roulette_state(0)), &[(0, 900)]);
        assert_eq!(Cautious.next_action(&view, 0), Some(PlayerAction::RoulettePass));
    }

    fn dice_state(first: u8) -> DiceHiLoState {
        let mut state = DiceHiLoState::open(&[0, 1], &MatchRules::default());
        state.round = 2;
        state.phase = DicePhase::Calling;
        state.first_die = Some(first);
        state
    }

    #[test]
    fn dice_calls_away_from_the_first_die() {
        let view = view_with(StageView::DiceHiLo(dice_state(2)), &[(0, 100), (1, 100)]);
        assert_eq!(
            Cautious.next_action(&view, 1),
            Some(PlayerAction::DiceCall {
                round: 2,
                call: HiLoCall::Higher,
                amount: MIN_CALL
            })
        );
        let view = view_with(StageView::DiceHiLo(dice_state(5)), &[(0, 100), (1, 100)]);
        assert!(matches!(
            Cautious.next_action(&view, 0),
            Some(PlayerAction::DiceCall {
                call: HiLoCall::Lower,
                ..
            })
        ));
    }

    #[test]
    fn dice_passes_when_short() {
        let view = view_with(StageView::DiceHiLo(dice_state(3)), &[(0, 5)]);
        assert_eq!(
            Cautious.next_action(&view, 0),
            Some(PlayerAction::DicePass { round: 2 })
        );
    }
}
