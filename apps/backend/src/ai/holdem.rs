//! Tight-aggressive hold'em.

use tracing::debug;

use super::trait_def::BotStrategy;
use crate::domain::actions::PlayerAction;
use crate::domain::cards::{Card, Rank};
use crate::domain::stages::holdem::Street;
use crate::domain::stages::holdem_eval::{best_hand, HandCategory};
use crate::domain::types::{Chips, Seat};
use crate::domain::view::{HandSeatView, HandView, MatchView, StageView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Strength {
    Trash,
    Playable,
    Strong,
    Premium,
}

/// Plays few hands and plays them hard: raises once per street with premium
/// holdings, calls modest prices with decent ones, and folds the rest.
pub struct TightAggressive;

impl TightAggressive {
    pub const NAME: &'static str = "tight-aggressive";
    pub const VERSION: &'static str = "1.0.0";
}

pub(crate) fn preflop_strength(hole: &[Card]) -> Strength {
    let [a, b] = hole else {
        return Strength::Trash;
    };
    let (hi, lo) = if a.rank >= b.rank { (a, b) } else { (b, a) };
    let suited = hi.suit == lo.suit;
    let broadway = |r: Rank| r >= Rank::Ten;

    if hi.rank == lo.rank {
        return match hi.rank {
            r if r >= Rank::Jack => Strength::Premium,
            r if r >= Rank::Seven => Strength::Strong,
            _ => Strength::Playable,
        };
    }
    match (hi.rank, lo.rank) {
        (Rank::Ace, Rank::King) => Strength::Premium,
        (Rank::Ace, Rank::Queen) | (Rank::Ace, Rank::Jack) | (Rank::King, Rank::Queen) => {
            Strength::Strong
        }
        (h, l) if suited && broadway(h) && broadway(l) => Strength::Strong,
        (h, l) if broadway(h) && broadway(l) => Strength::Playable,
        (Rank::Ace, _) if suited => Strength::Playable,
        _ => Strength::Trash,
    }
}

pub(crate) fn postflop_strength(hole: &[Card], board: &[Card]) -> Strength {
    let cards: Vec<Card> = hole.iter().chain(board.iter()).copied().collect();
    let Some(made) = best_hand(&cards) else {
        return Strength::Trash;
    };
    match made.category {
        HandCategory::HighCard => Strength::Trash,
        HandCategory::OnePair => {
            // A pair that only lives on the board is worth nothing to us.
            let pairs_hole = hole
                .iter()
                .any(|h| board.iter().any(|c| c.rank == h.rank))
                || (hole.len() == 2 && hole[0].rank == hole[1].rank);
            if pairs_hole {
                Strength::Playable
            } else {
                Strength::Trash
            }
        }
        HandCategory::TwoPair | HandCategory::ThreeOfAKind => Strength::Strong,
        _ => Strength::Premium,
    }
}

fn aggressive(hand: &HandView, me: &HandSeatView) -> PlayerAction {
    let max_to = me.street_bet + me.stack;
    let to = if hand.current_bet == 0 {
        let target = if hand.street == Street::Preflop {
            hand.bb * 3
        } else {
            (hand.pot * 2 / 3).max(hand.bb)
        };
        target.max(hand.bb)
    } else {
        hand.current_bet + hand.min_raise.max(hand.current_bet)
    };
    if to >= max_to {
        PlayerAction::HoldemAllIn
    } else if hand.current_bet == 0 {
        PlayerAction::HoldemBet { to }
    } else {
        PlayerAction::HoldemRaise { to }
    }
}

pub(crate) fn decide(hand: &HandView, me: &HandSeatView, strength: Strength) -> PlayerAction {
    let to_call: Chips = (hand.current_bet - me.street_bet).max(0);
    let facing = to_call > 0;
    // Only the first voluntary action of a street may raise, so two of these
    // bots cannot re-raise each other forever.
    let first_in = me.street_bet == 0
        || (hand.street == Street::Preflop && me.street_bet <= hand.bb && hand.current_bet <= hand.bb);

    match strength {
        Strength::Premium if first_in => aggressive(hand, me),
        Strength::Premium => {
            if facing {
                PlayerAction::HoldemCall
            } else {
                PlayerAction::HoldemCheck
            }
        }
        Strength::Strong => {
            if !facing {
                if first_in && hand.street != Street::Preflop {
                    aggressive(hand, me)
                } else {
                    PlayerAction::HoldemCheck
                }
            } else if to_call <= (hand.pot / 2).max(hand.bb * 4) {
                PlayerAction::HoldemCall
            } else {
                PlayerAction::HoldemFold
            }
        }
        Strength::Playable => {
            if !facing {
                PlayerAction::HoldemCheck
            } else if to_call <= hand.bb * 2 {
                PlayerAction::HoldemCall
            } else {
                PlayerAction::HoldemFold
            }
        }
        Strength::Trash => {
            if facing {
                PlayerAction::HoldemFold
            } else {
                PlayerAction::HoldemCheck
            }
        }
    }
}

impl BotStrategy for TightAggressive {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction> {
        let StageView::Holdem(holdem) = &view.detail else {
            return None;
        };
        let hand = holdem.hand.as_ref()?;
        if hand.to_act != Some(seat) {
            return None;
        }
        let me = hand.seat(seat)?;
        let hole = me.hole.as_deref().unwrap_or_default();
        let strength = if hand.street == Street::Preflop {
            preflop_strength(hole)
        } else {
            postflop_strength(hole, &hand.board)
        };
        let action = decide(hand, me, strength);
        debug!(
            match_id = view.match_id,
            seat,
            hand_no = hand.hand_no,
            strength = ?strength,
            action = action.name(),
            "holdem bot decided"
        );
        Some(action)
    }
}
