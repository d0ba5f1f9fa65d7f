//! Best-five-of-seven hand ranking.

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Category first, then rank ordinals in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandRank {
    pub category: HandCategory,
    pub kickers: [u8; 5],
}

/// High card of a five-card straight, treating A-2-3-4-5 as five high.
fn straight_high(sorted_desc: &[u8; 5]) -> Option<u8> {
    if *sorted_desc == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    let consecutive = sorted_desc.windows(2).all(|w| w[0] == w[1] + 1);
    consecutive.then_some(sorted_desc[0])
}

pub fn evaluate5(cards: &[Card; 5]) -> HandRank {
    let mut ranks: [u8; 5] = cards.map(|c| c.rank.ordinal());
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    let flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight = straight_high(&ranks);

    // (count, rank) groups, largest group first then highest rank.
    let mut groups: Vec<(u8, u8)> = Vec::with_capacity(5);
    for r in ranks {
        match groups.iter_mut().find(|(_, g)| *g == r) {
            Some((n, _)) => *n += 1,
            None => groups.push((1, r)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let mut grouped = [0u8; 5];
    let mut i = 0;
    for (n, r) in &groups {
        for _ in 0..*n {
            grouped[i] = *r;
            i += 1;
        }
    }

    let shape: Vec<u8> = groups.iter().map(|(n, _)| *n).collect();
    let (category, kickers) = match (straight, flush, shape.as_slice()) {
        (Some(high), true, _) => (HandCategory::StraightFlush, [high, 0, 0, 0, 0]),
        (_, _, [4, 1]) => (HandCategory::FourOfAKind, grouped),
        (_, _, [3, 2]) => (HandCategory::FullHouse, grouped),
        (_, true, _) => (HandCategory::Flush, ranks),
        (Some(high), false, _) => (HandCategory::Straight, [high, 0, 0, 0, 0]),
        (_, _, [3, 1, 1]) => (HandCategory::ThreeOfAKind, grouped),
        (_, _, [2, 2, 1]) => (HandCategory::TwoPair, grouped),
        (_, _, [2, 1, 1, 1]) => (HandCategory::OnePair, grouped),
        _ => (HandCategory::HighCard, ranks),
    };
    HandRank { category, kickers }
}

/// Best five-card rank from five to seven cards; `None` with fewer than five.
pub fn best_hand(cards: &[Card]) -> Option<HandRank> {
    let n = cards.len();
    if n < 5 {
        return None;
    }
    let mut best: Option<HandRank> = None;
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let rank = evaluate5(&[cards[a], cards[b], cards[c], cards[d], cards[e]]);
                        if best.map_or(true, |cur| rank > cur) {
                            best = Some(rank);
                        }
                    }
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(s: &str) -> Vec<Card> {
        s.split_whitespace().map(|c| c.parse().unwrap()).collect()
    }

    fn rank(s: &str) -> HandRank {
        best_hand(&hand(s)).unwrap()
    }

    #[test]
    fn categories_are_recognized() {
        assert_eq!(rank("AS KS QS JS TS 2D 3C").category, HandCategory::StraightFlush);
        assert_eq!(rank("9C 9D 9H 9S 2D").category, HandCategory::FourOfAKind);
        assert_eq!(rank("9C 9D 9H 2S 2D").category, HandCategory::FullHouse);
        assert_eq!(rank("2H 7H 9H JH KH").category, HandCategory::Flush);
        assert_eq!(rank("5C 6D 7H 8S 9D").category, HandCategory::Straight);
        assert_eq!(rank("9C 9D 9H 2S 3D").category, HandCategory::ThreeOfAKind);
        assert_eq!(rank("9C 9D 2H 2S 3D").category, HandCategory::TwoPair);
        assert_eq!(rank("9C 9D 2H 4S 3D").category, HandCategory::OnePair);
        assert_eq!(rank("9C JD 2H 4S 3D").category, HandCategory::HighCard);
    }

    #[test]
    fn wheel_is_five_high() {
        let wheel = rank("AC 2D 3H 4S 5D");
        let six_high = rank("2D 3H 4S 5D 6C");
        assert_eq!(wheel.category, HandCategory::Straight);
        assert!(six_high > wheel);
    }

    #[test]
    fn kickers_break_ties() {
        assert!(rank("AC AD KH 4S 3D") > rank("AH AS QH 4D 3C"));
        assert!(rank("KC KD 4H 4S AD") > rank("KH KS 4D 4C QD"));
        assert_eq!(rank("AC AD KH 4S 3D"), rank("AH AS KD 4D 3C"));
    }

    #[test]
    fn seven_cards_pick_the_best_five() {
        let r = rank("2C 2D 2H KS KD 7C 7D");
        assert_eq!(r.category, HandCategory::FullHouse);
        assert_eq!(r.kickers, [2, 2, 2, 13, 13]);
    }

    #[test]
    fn fewer_than_five_cards_has_no_rank() {
        assert!(best_hand(&hand("AS KS")).is_none());
    }
}
