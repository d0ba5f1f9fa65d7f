//! Basic-strategy blackjack.

use tracing::debug;

use super::trait_def::BotStrategy;
use crate::domain::actions::PlayerAction;
use crate::domain::cards::{Card, Rank};
use crate::domain::stages::blackjack::{hand_value, BjHand, RoundPhase, MIN_WAGER};
use crate::domain::types::{Chips, Seat};
use crate::domain::view::{BlackjackView, MatchView, StageView};

/// Flat table-minimum bettor that plays the textbook chart in simplified form:
/// always hit 11 or less, always stand on 17 or more, and let the dealer up
/// card decide 12 to 16. Doubles on 10 and 11, splits aces and eights.
pub struct BasicStrategy;

impl BasicStrategy {
    pub const NAME: &'static str = "basic-strategy";
    pub const VERSION: &'static str = "1.0.0";

    fn bet(bj: &BlackjackView, seat: Seat, stack: Chips) -> Option<PlayerAction> {
        if bj.finished_betting.contains(&seat) {
            return None;
        }
        let exposure = bj.exposure(seat);
        if exposure == 0 && stack >= MIN_WAGER {
            if let Some(spot) = bj.free_spot() {
                return Some(PlayerAction::PlaceBet {
                    spot,
                    amount: MIN_WAGER,
                });
            }
        }
        Some(PlayerAction::FinishBetting)
    }

    fn play(bj: &BlackjackView, seat: Seat, stack: Chips) -> Option<PlayerAction> {
        let hand = bj.active_hand().filter(|h| h.seat == seat)?;
        let up = bj.dealer.first()?;
        let can_afford = bj.exposure(seat) + hand.wager <= stack;
        let decision = decide(hand, up, can_afford);
        let (spot, index) = (hand.spot, hand.index);
        Some(match decision {
            Decision::Hit => PlayerAction::Hit { spot, hand: index },
            Decision::Stand => PlayerAction::Stand { spot, hand: index },
            Decision::Double => PlayerAction::Double { spot, hand: index },
            Decision::Split => PlayerAction::Split { spot, hand: index },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Hit,
    Stand,
    Double,
    Split,
}

fn up_value(up: &Card) -> u8 {
    if up.rank == Rank::Ace {
        11
    } else {
        up.rank.blackjack_value()
    }
}

pub(crate) fn decide(hand: &BjHand, up: &Card, can_afford: bool) -> Decision {
    if can_afford
        && hand.can_split()
        && matches!(hand.cards[0].rank, Rank::Ace | Rank::Eight)
    {
        return Decision::Split;
    }
    let (total, soft) = hand_value(&hand.cards);
    if can_afford && hand.can_double() && (total == 10 || total == 11) && !soft {
        return Decision::Double;
    }
    if soft {
        return if total >= 18 {
            Decision::Stand
        } else {
            Decision::Hit
        };
    }
    match total {
        0..=11 => Decision::Hit,
        12..=16 if (2..=6).contains(&up_value(up)) => Decision::Stand,
        12..=16 => Decision::Hit,
        _ => Decision::Stand,
    }
}

impl BotStrategy for BasicStrategy {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction> {
        let StageView::Blackjack(bj) = &view.detail else {
            return None;
        };
        let stack = view.stack(seat);
        let action = match bj.phase {
            RoundPhase::Betting => Self::bet(bj, seat, stack),
            RoundPhase::PlayerTurns => Self::play(bj, seat, stack),
            _ => None,
        };
        if let Some(action) = &action {
            debug!(match_id = view.match_id, seat, action = action.name(), "blackjack bot decided");
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fixtures::{blackjack_view, view_with};

    fn hand(cards: &[&str]) -> BjHand {
        BjHand {
            spot: 2,
            index: 0,
            seat: 1,
            cards: cards.iter().map(|c| c.parse().unwrap()).collect(),
            wager: 10,
            doubled: false,
            from_split: false,
            decisions: 0,
            done: false,
            resolved: false,
        }
    }

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn chart_decisions() {
        assert_eq!(decide(&hand(&["5H", "4C"]), &card("TS"), true), Decision::Hit);
        assert_eq!(decide(&hand(&["6H", "5C"]), &card("TS"), true), Decision::Double);
        assert_eq!(decide(&hand(&["6H", "5C"]), &card("TS"), false), Decision::Hit);
        assert_eq!(decide(&hand(&["TH", "3C"]), &card("5S"), true), Decision::Stand);
        assert_eq!(decide(&hand(&["TH", "3C"]), &card("9S"), true), Decision::Hit);
        assert_eq!(decide(&hand(&["TH", "7C"]), &card("AS"), true), Decision::Stand);
        assert_eq!(decide(&hand(&["8H", "8C"]), &card("TS"), true), Decision::Split);
        assert_eq!(decide(&hand(&["AH", "AC"]), &card("6S"), true), Decision::Split);
        assert_eq!(decide(&hand(&["AH", "6C"]), &card("6S"), true), Decision::Hit);
        assert_eq!(decide(&hand(&["AH", "7C"]), &card("6S"), true), Decision::Stand);
    }

    #[test]
    fn bets_minimum_then_finishes() {
        let mut bj = blackjack_view(RoundPhase::Betting);
        let view = view_with(StageView::Blackjack(bj.clone()), &[(1, 500)]);
        assert_eq!(
            BasicStrategy.next_action(&view, 1),
            Some(PlayerAction::PlaceBet {
                spot: 0,
                amount: MIN_WAGER
            })
        );

        bj.bets.push(crate::domain::stages::blackjack::SpotBet {
            spot: 0,
            seat: 1,
            wager: MIN_WAGER,
        });
        let view = view_with(StageView::Blackjack(bj), &[(1, 500)]);
        assert_eq!(
            BasicStrategy.next_action(&view, 1),
            Some(PlayerAction::FinishBetting)
        );
    }

    #[test]
    fn broke_seat_sits_out() {
        let bj = blackjack_view(RoundPhase::Betting);
        let view = view_with(StageView::Blackjack(bj), &[(1, 5)]);
        assert_eq!(
            BasicStrategy.next_action(&view, 1),
            Some(PlayerAction::FinishBetting)
        );
    }

    #[test]
    fn only_acts_on_own_active_hand() {
        let mut bj = blackjack_view(RoundPhase::PlayerTurns);
        bj.hands.push(hand(&["TH", "9C"]));
        bj.dealer.push(card("7D"));
        let view = view_with(StageView::Blackjack(bj), &[(0, 500), (1, 500)]);
        assert_eq!(
            BasicStrategy.next_action(&view, 1),
            Some(PlayerAction::Stand { spot: 2, hand: 0 })
        );
        assert_eq!(BasicStrategy.next_action(&view, 0), None);
    }
}
