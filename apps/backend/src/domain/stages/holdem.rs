//! No-limit Texas Hold'em finale.
//!
//! Chips move only at `HandSettled`, which carries each seat's net result for
//! the hand. Until then a seat's live stack is its hand-start stack minus what
//! it has committed. The deck for a hand is a shuffle of one standard deck by
//! the seed recorded in `HandStarted`: hole cards are dealt two per player in
//! seat order from the button, the board follows.

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::cards::{shuffled_shoe, Card};
use crate::domain::ledger;
use crate::domain::rules::{secs_to_millis, MatchRules, SEAT_LIMIT};
use crate::domain::stages::holdem_eval::{best_hand, HandRank};
use crate::domain::stages::{SeatAmount, StageCtx, StageReducer, StageSummary};
use crate::domain::types::{Chips, Millis, Seat};
use crate::errors::domain::{DomainError, IllegalKind, InfraErrorKind, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    fn board_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldemMove {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSeat {
    pub seat: Seat,
    pub start_stack: Chips,
    pub hole: Vec<Card>,
    /// Committed on the current street.
    pub street_bet: Chips,
    /// Committed across the whole hand.
    pub committed: Chips,
    pub folded: bool,
    pub acted: bool,
}

impl HandSeat {
    pub fn remaining(&self) -> Chips {
        self.start_stack - self.committed
    }

    pub fn all_in(&self) -> bool {
        !self.folded && self.remaining() == 0
    }

    fn can_act(&self) -> bool {
        !self.folded && self.remaining() > 0
    }

    fn max_to(&self) -> Chips {
        self.street_bet + self.remaining()
    }

    fn commit_to(&mut self, to: Chips) {
        let add = (to - self.street_bet).clamp(0, self.remaining());
        self.street_bet += add;
        self.committed += add;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldemHand {
    pub hand_no: u32,
    pub button: Seat,
    pub sb: Chips,
    pub bb: Chips,
    pub deck_seed: u64,
    pub street: Street,
    pub board: Vec<Card>,
    /// Ordered clockwise starting left of the button.
    pub players: Vec<HandSeat>,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub to_act: Option<Seat>,
}

impl HoldemHand {
    fn index_of(&self, seat: Seat) -> Option<usize> {
        self.players.iter().position(|p| p.seat == seat)
    }

    pub fn player(&self, seat: Seat) -> Option<&HandSeat> {
        self.players.iter().find(|p| p.seat == seat)
    }

    fn in_hand(&self) -> usize {
        self.players.iter().filter(|p| !p.folded).count()
    }

    pub fn pot(&self) -> Chips {
        self.players.iter().map(|p| p.committed).sum()
    }

    /// Players are stored left of the button, so the button is last.
    fn button_index(&self) -> usize {
        self.players.len().saturating_sub(1)
    }

    /// Next seat owed a decision after `from`, or `None` when the street is done.
    fn next_actor(&self, from: usize) -> Option<Seat> {
        if self.in_hand() <= 1 {
            return None;
        }
        let actionable = self.players.iter().filter(|p| p.can_act()).count();
        let n = self.players.len();
        (1..=n)
            .map(|step| &self.players[(from + step) % n])
            .find(|p| {
                p.can_act()
                    && (p.street_bet < self.current_bet || (!p.acted && actionable >= 2))
            })
            .map(|p| p.seat)
    }

    /// (small blind index, big blind index).
    fn blind_positions(&self) -> (usize, usize) {
        let n = self.players.len();
        if n == 2 {
            // Heads-up: the button posts the small blind.
            (1, 0)
        } else {
            (0, 1 % n)
        }
    }

    fn deck(&self) -> Vec<Card> {
        shuffled_shoe(1, self.deck_seed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldemResult {
    pub seat: Seat,
    pub committed: Chips,
    pub won: Chips,
    pub delta: Chips,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownHand {
    pub seat: Seat,
    pub hole: Vec<Card>,
    pub rank: HandRank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HoldemEvent {
    HandStarted {
        hand_no: u32,
        button: Seat,
        sb: Chips,
        bb: Chips,
        deck_seed: u64,
        /// Seat order starting left of the button, with hand-start stacks.
        seats: Vec<SeatAmount>,
    },
    PlayerActed {
        seat: Seat,
        action: HoldemMove,
        /// Total committed on this street after the action.
        to: Chips,
        all_in: bool,
    },
    StreetDealt {
        street: Street,
        cards: Vec<Card>,
    },
    HandSettled {
        hand_no: u32,
        board: Vec<Card>,
        results: Vec<HoldemResult>,
        showdown: Vec<ShownHand>,
    },
    HoldemEnded,
}

impl HoldemEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HoldemEvent::HandStarted { .. } => "HandStarted",
            HoldemEvent::PlayerActed { .. } => "PlayerActed",
            HoldemEvent::StreetDealt { .. } => "StreetDealt",
            HoldemEvent::HandSettled { .. } => "HandSettled",
            HoldemEvent::HoldemEnded => "HoldemEnded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldemState {
    pub seats: Vec<Seat>,
    pub base_sb: Chips,
    pub hands_played: u32,
    pub max_hands: u32,
    pub last_button: Option<Seat>,
    pub hand: Option<HoldemHand>,
    pub last_showdown: Vec<ShownHand>,
    pub deadline: Option<Millis>,
    pub decision_ms: Millis,
    pub ended: bool,
}

impl HoldemState {
    /// Seats with chips at stage start take part; blinds key off their median.
    pub fn open(start_stacks: &[SeatAmount], rules: &MatchRules) -> Self {
        let funded: Vec<&SeatAmount> = start_stacks.iter().filter(|s| s.amount > 0).collect();
        let stacks: Vec<Chips> = funded.iter().map(|s| s.amount).collect();
        Self {
            seats: funded.iter().map(|s| s.seat).collect(),
            base_sb: ledger::holdem_small_blind(&stacks),
            hands_played: 0,
            max_hands: rules.holdem_max_hands,
            last_button: None,
            hand: None,
            last_showdown: Vec::new(),
            deadline: None,
            decision_ms: secs_to_millis(rules.holdem_decision_secs),
            ended: false,
        }
    }

    fn live_seats(&self, ctx: &StageCtx<'_>) -> Vec<Seat> {
        self.seats
            .iter()
            .copied()
            .filter(|s| ctx.is_active(*s) && ctx.stack(*s) > 0)
            .collect()
    }

    fn start_hand(&self, ctx: &StageCtx<'_>, live: &[Seat]) -> HoldemEvent {
        let button = match self.last_button {
            None => live[0],
            Some(prev) => live
                .iter()
                .copied()
                .find(|s| *s > prev)
                .unwrap_or(live[0]),
        };
        let pos = live.iter().position(|s| *s == button).unwrap_or(0);
        let seats = (1..=live.len())
            .map(|step| live[(pos + step) % live.len()])
            .map(|seat| SeatAmount {
                seat,
                amount: ctx.stack(seat),
            })
            .collect();
        let sb = ledger::blind_level(self.base_sb, self.hands_played, self.seats.len() as u32);
        HoldemEvent::HandStarted {
            hand_no: self.hands_played + 1,
            button,
            sb,
            bb: sb * 2,
            deck_seed: ctx.rng(0).next_u64(),
            seats,
        }
    }

    fn decide_move(
        hand: &HoldemHand,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<HoldemEvent, DomainError> {
        let p = hand.player(seat).ok_or_else(|| {
            DomainError::illegal(IllegalKind::NotSeated, format!("seat {seat} is not in this hand"))
        })?;
        let max_to = p.max_to();
        let (action, to) = match action {
            PlayerAction::HoldemFold => (HoldemMove::Fold, p.street_bet),
            PlayerAction::HoldemCheck => {
                if p.street_bet < hand.current_bet {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongPhase,
                        format!("cannot check facing {}", hand.current_bet),
                    ));
                }
                (HoldemMove::Check, p.street_bet)
            }
            PlayerAction::HoldemCall => {
                if p.street_bet >= hand.current_bet {
                    return Err(DomainError::illegal(IllegalKind::WrongPhase, "nothing to call"));
                }
                (HoldemMove::Call, hand.current_bet.min(max_to))
            }
            PlayerAction::HoldemBet { to } => {
                if hand.current_bet > 0 {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongPhase,
                        "there is already a bet; raise instead",
                    ));
                }
                Self::check_size(*to, hand.bb, max_to)?;
                (HoldemMove::Bet, *to)
            }
            PlayerAction::HoldemRaise { to } => {
                if hand.current_bet == 0 {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongPhase,
                        "nothing to raise; bet instead",
                    ));
                }
                Self::check_size(*to, hand.current_bet + hand.min_raise, max_to)?;
                (HoldemMove::Raise, *to)
            }
            PlayerAction::HoldemAllIn => {
                let kind = if max_to <= hand.current_bet {
                    HoldemMove::Call
                } else if hand.current_bet == 0 {
                    HoldemMove::Bet
                } else {
                    HoldemMove::Raise
                };
                (kind, max_to)
            }
            other => {
                return Err(DomainError::illegal(
                    IllegalKind::WrongStage,
                    format!("{} is not a hold'em action", other.name()),
                ))
            }
        };
        Ok(HoldemEvent::PlayerActed {
            seat,
            action,
            to,
            all_in: action != HoldemMove::Fold && to == max_to,
        })
    }

    /// A short all-in is always allowed; otherwise `to` must reach `min_to`.
    fn check_size(to: Chips, min_to: Chips, max_to: Chips) -> Result<(), DomainError> {
        if to > max_to {
            return Err(DomainError::illegal(
                IllegalKind::InsufficientStack,
                format!("cannot commit {to}; at most {max_to}"),
            ));
        }
        if to < min_to && to != max_to {
            return Err(DomainError::validation(
                ValidationKind::WagerOutOfRange,
                format!("minimum is {min_to}, got {to}"),
            ));
        }
        Ok(())
    }

    fn settle(hand: &HoldemHand) -> HoldemEvent {
        let contenders: Vec<&HandSeat> = hand.players.iter().filter(|p| !p.folded).collect();
        let showdown: Vec<ShownHand> = if contenders.len() > 1 {
            contenders
                .iter()
                .filter_map(|p| {
                    let mut cards = p.hole.clone();
                    cards.extend_from_slice(&hand.board);
                    best_hand(&cards).map(|rank| ShownHand {
                        seat: p.seat,
                        hole: p.hole.clone(),
                        rank,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };
        let won = distribute_pots(hand, &showdown);
        let results = hand
            .players
            .iter()
            .zip(won)
            .map(|(p, won)| HoldemResult {
                seat: p.seat,
                committed: p.committed,
                won,
                delta: won - p.committed,
            })
            .collect();
        HoldemEvent::HandSettled {
            hand_no: hand.hand_no,
            board: hand.board.clone(),
            results,
            showdown,
        }
    }
}

/// Chips won per player (indexed like `hand.players`), settled by contribution
/// layers. Ties split a layer evenly; odd chips go to the tied winner closest to
/// the left of the button.
pub fn distribute_pots(hand: &HoldemHand, showdown: &[ShownHand]) -> Vec<Chips> {
    let players = &hand.players;
    let mut won = vec![0; players.len()];
    let rank_of = |seat: Seat| showdown.iter().find(|s| s.seat == seat).map(|s| s.rank);

    let mut levels: Vec<Chips> = players.iter().map(|p| p.committed).filter(|c| *c > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut prev = 0;
    for level in levels {
        let amount: Chips = players
            .iter()
            .map(|p| p.committed.min(level) - p.committed.min(prev))
            .sum();
        let mut eligible: Vec<usize> = (0..players.len())
            .filter(|i| !players[*i].folded && players[*i].committed >= level)
            .collect();
        if eligible.is_empty() {
            eligible = (0..players.len()).filter(|i| !players[*i].folded).collect();
        }
        let best = eligible.iter().filter_map(|i| rank_of(players[*i].seat)).max();
        let winners: Vec<usize> = match best {
            Some(best) => eligible
                .into_iter()
                .filter(|i| rank_of(players[*i].seat) == Some(best))
                .collect(),
            None => eligible,
        };
        if !winners.is_empty() {
            let share = amount / winners.len() as Chips;
            let odd = amount % winners.len() as Chips;
            for (k, i) in winners.iter().enumerate() {
                won[*i] += share + if (k as Chips) < odd { 1 } else { 0 };
            }
        }
        prev = level;
    }
    won
}

impl StageReducer for HoldemState {
    type Event = HoldemEvent;

    fn decide(
        &self,
        _ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<HoldemEvent>, DomainError> {
        let hand = self
            .hand
            .as_ref()
            .ok_or_else(|| DomainError::illegal(IllegalKind::WrongPhase, "no hand in progress"))?;
        if hand.to_act != Some(seat) {
            return Err(DomainError::illegal(
                IllegalKind::OutOfTurn,
                format!("seat {seat} is not to act"),
            ));
        }
        Ok(vec![Self::decide_move(hand, seat, action)?])
    }

    fn advance(&self, ctx: &StageCtx<'_>) -> Vec<HoldemEvent> {
        if self.ended {
            return Vec::new();
        }
        let Some(hand) = &self.hand else {
            let mut live = self.live_seats(ctx);
            // Seats past one deck's capacity sit the hand out.
            live.truncate(usize::from(SEAT_LIMIT));
            if live.len() < 2 || self.hands_played >= self.max_hands {
                return vec![HoldemEvent::HoldemEnded];
            }
            return vec![self.start_hand(ctx, &live)];
        };
        if hand.to_act.is_some() {
            return Vec::new();
        }
        if hand.in_hand() <= 1 {
            return vec![Self::settle(hand)];
        }
        match hand.street.next() {
            Some(street) => {
                let deck = hand.deck();
                let dealt = hand.players.len() * 2;
                match deck.get(dealt + hand.board.len()..dealt + street.board_len()) {
                    Some(cards) => vec![HoldemEvent::StreetDealt {
                        street,
                        cards: cards.to_vec(),
                    }],
                    None => vec![Self::settle(hand)],
                }
            }
            None => vec![Self::settle(hand)],
        }
    }

    fn expire(&self, ctx: &StageCtx<'_>) -> Vec<HoldemEvent> {
        let (Some(hand), Some(deadline)) = (&self.hand, self.deadline) else {
            return Vec::new();
        };
        if deadline > ctx.now {
            return Vec::new();
        }
        let Some(seat) = hand.to_act else {
            return Vec::new();
        };
        let fallback = match hand.player(seat) {
            Some(p) if p.street_bet >= hand.current_bet => PlayerAction::HoldemCheck,
            _ => PlayerAction::HoldemFold,
        };
        Self::decide_move(hand, seat, &fallback).into_iter().collect()
    }

    fn apply(&mut self, event: &HoldemEvent, ts: Millis) {
        match event {
            HoldemEvent::HandStarted {
                hand_no,
                button,
                sb,
                bb,
                deck_seed,
                seats,
            } => {
                let deck = shuffled_shoe(1, *deck_seed);
                let n = seats.len();
                let mut hand = HoldemHand {
                    hand_no: *hand_no,
                    button: *button,
                    sb: *sb,
                    bb: *bb,
                    deck_seed: *deck_seed,
                    street: Street::Preflop,
                    board: Vec::new(),
                    players: seats
                        .iter()
                        .enumerate()
                        .map(|(i, s)| HandSeat {
                            seat: s.seat,
                            start_stack: s.amount,
                            hole: [deck.get(i), deck.get(n + i)]
                                .into_iter()
                                .flatten()
                                .copied()
                                .collect(),
                            street_bet: 0,
                            committed: 0,
                            folded: false,
                            acted: false,
                        })
                        .collect(),
                    current_bet: *bb,
                    min_raise: *bb,
                    to_act: None,
                };
                let (sb_idx, bb_idx) = hand.blind_positions();
                hand.players[sb_idx].commit_to(*sb);
                hand.players[bb_idx].commit_to(*bb);
                hand.to_act = hand.next_actor(bb_idx);
                self.last_button = Some(*button);
                self.hands_played = *hand_no;
                self.deadline = hand.to_act.map(|_| ts + self.decision_ms);
                self.hand = Some(hand);
            }
            HoldemEvent::PlayerActed {
                seat, action, to, ..
            } => {
                let Some(hand) = self.hand.as_mut() else {
                    return;
                };
                let Some(idx) = hand.index_of(*seat) else {
                    return;
                };
                if *action == HoldemMove::Fold {
                    hand.players[idx].folded = true;
                } else {
                    hand.players[idx].commit_to(*to);
                }
                hand.players[idx].acted = true;
                let street_bet = hand.players[idx].street_bet;
                if street_bet > hand.current_bet {
                    let raise = street_bet - hand.current_bet;
                    if raise >= hand.min_raise {
                        hand.min_raise = raise;
                    }
                    hand.current_bet = street_bet;
                    for (i, p) in hand.players.iter_mut().enumerate() {
                        if i != idx {
                            p.acted = false;
                        }
                    }
                }
                hand.to_act = hand.next_actor(idx);
                self.deadline = hand.to_act.map(|_| ts + self.decision_ms);
            }
            HoldemEvent::StreetDealt { street, cards } => {
                let Some(hand) = self.hand.as_mut() else {
                    return;
                };
                hand.street = *street;
                hand.board.extend_from_slice(cards);
                hand.current_bet = 0;
                hand.min_raise = hand.bb;
                for p in hand.players.iter_mut() {
                    p.street_bet = 0;
                    p.acted = false;
                }
                hand.to_act = hand.next_actor(hand.button_index());
                self.deadline = hand.to_act.map(|_| ts + self.decision_ms);
            }
            HoldemEvent::HandSettled { showdown, .. } => {
                self.last_showdown = showdown.clone();
                self.hand = None;
                self.deadline = None;
            }
            HoldemEvent::HoldemEnded => {
                self.ended = true;
                self.hand = None;
                self.deadline = None;
            }
        }
    }

    fn check(&self, event: &HoldemEvent) -> Result<(), DomainError> {
        let corrupt = |detail: String| Err(DomainError::infra(InfraErrorKind::DataCorruption, detail));
        match event {
            HoldemEvent::HandStarted { hand_no, seats, .. }
                if seats.len() < 2 || seats.len() > usize::from(SEAT_LIMIT) =>
            {
                corrupt(format!(
                    "hand {hand_no} dealt to {} seats; one deck serves 2..={SEAT_LIMIT}",
                    seats.len()
                ))
            }
            HoldemEvent::StreetDealt { street, cards } => match &self.hand {
                Some(hand) if hand.board.len() + cards.len() == street.board_len() => Ok(()),
                Some(hand) => corrupt(format!(
                    "{street:?} needs a {}-card board, had {} and got {}",
                    street.board_len(),
                    hand.board.len(),
                    cards.len()
                )),
                None => corrupt(format!("{street:?} dealt with no hand in play")),
            },
            _ => Ok(()),
        }
    }

    fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    fn awaiting(&self) -> Vec<Seat> {
        self.hand
            .as_ref()
            .and_then(|h| h.to_act)
            .into_iter()
            .collect()
    }

    fn summary(&self) -> Option<StageSummary> {
        self.ended.then_some(StageSummary::Holdem {
            hands_played: self.hands_played,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::MatchPlayer;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn seat(seat: Seat, committed: Chips, folded: bool, hole: [&str; 2]) -> HandSeat {
        HandSeat {
            seat,
            start_stack: committed,
            hole: hole.iter().map(|c| card(c)).collect(),
            street_bet: 0,
            committed,
            folded,
            acted: true,
        }
    }

    fn river_hand(players: Vec<HandSeat>, board: &str) -> HoldemHand {
        HoldemHand {
            hand_no: 1,
            button: players.last().map_or(0, |p| p.seat),
            sb: 10,
            bb: 20,
            deck_seed: 0,
            street: Street::River,
            board: board.split_whitespace().map(card).collect(),
            players,
            current_bet: 0,
            min_raise: 20,
            to_act: None,
        }
    }

    #[test]
    fn side_pot_goes_to_the_best_eligible_hand() {
        // Seat 1 is all-in short with the best hand; seat 2 beats seat 3 for the side pot.
        let hand = river_hand(
            vec![
                seat(1, 100, false, ["AS", "AD"]),
                seat(2, 300, false, ["KS", "KD"]),
                seat(3, 300, false, ["QS", "QD"]),
            ],
            "2C 7D 9H JC 3S",
        );
        let HoldemEvent::HandSettled { results, .. } = HoldemState::settle(&hand) else {
            panic!("expected settlement");
        };
        let won: Vec<Chips> = results.iter().map(|r| r.won).collect();
        assert_eq!(won, vec![300, 400, 0]);
        assert_eq!(results.iter().map(|r| r.delta).sum::<Chips>(), 0);
    }

    #[test]
    fn split_pot_odd_chip_goes_left_of_button() {
        let hand = river_hand(
            vec![
                seat(1, 50, false, ["2S", "3D"]),
                seat(2, 25, true, ["KS", "KD"]),
                seat(3, 50, false, ["2D", "3S"]),
            ],
            "AC KH QD JS TC",
        );
        let HoldemEvent::HandSettled { results, .. } = HoldemState::settle(&hand) else {
            panic!("expected settlement");
        };
        // Both play the board straight: 75 splits 38/37, then 50 splits evenly.
        assert_eq!(results[0].won, 63);
        assert_eq!(results[2].won, 62);
        assert_eq!(results[1].delta, -25);
    }

    #[test]
    fn uncontested_pot_skips_showdown() {
        let hand = river_hand(
            vec![seat(1, 20, true, ["2S", "3D"]), seat(2, 40, false, ["7S", "8D"])],
            "AC KH QD JS TC",
        );
        let HoldemEvent::HandSettled {
            results, showdown, ..
        } = HoldemState::settle(&hand)
        else {
            panic!("expected settlement");
        };
        assert!(showdown.is_empty());
        assert_eq!(results[1].won, 60);
        assert_eq!(results[1].delta, 20);
    }

    fn funded(seats: u8) -> Vec<MatchPlayer> {
        (0..seats)
            .map(|seat| MatchPlayer {
                seat,
                user_id: None,
                display_name: format!("bot-{seat}"),
                is_bot: true,
                is_connected: false,
                autopilot: false,
                ready: true,
                left: false,
                initial_stack: 1000,
                stack: 1000,
                ledger_total: 0,
            })
            .collect()
    }

    #[test]
    fn oversized_table_deals_one_deck_through_the_river() {
        let rules = MatchRules::default();
        let players = funded(SEAT_LIMIT + 1);
        let table = StageCtx {
            now: 1_000,
            match_seed: 42,
            seq: 10,
            rules: &rules,
            players: &players,
        };
        let stacks: Vec<SeatAmount> = players
            .iter()
            .map(|p| SeatAmount {
                seat: p.seat,
                amount: p.stack,
            })
            .collect();
        let mut state = HoldemState::open(&stacks, &rules);

        let mut boards = Vec::new();
        for _ in 0..200 {
            let mut events = state.advance(&table);
            if events.is_empty() {
                let hand = state.hand.as_ref().unwrap();
                let seat = hand.to_act.unwrap();
                let me = hand.player(seat).unwrap();
                let action = if me.street_bet >= hand.current_bet {
                    PlayerAction::HoldemCheck
                } else {
                    PlayerAction::HoldemCall
                };
                events = state.decide(&table, seat, &action).unwrap();
            }
            for event in &events {
                if let HoldemEvent::HandStarted { seats, .. } = event {
                    assert_eq!(seats.len(), usize::from(SEAT_LIMIT));
                }
                state.check_and_apply(event, 1_000).unwrap();
            }
            if let Some(HoldemEvent::HandSettled { .. }) = events.last() {
                break;
            }
            if let Some(hand) = &state.hand {
                boards.push(hand.board.len());
            }
        }
        assert_eq!(boards.last(), Some(&5));
        assert!(state.hand.is_none(), "hand never settled");
    }

    #[test]
    fn stored_hand_for_too_many_seats_is_corruption() {
        let state = HoldemState::open(&[], &MatchRules::default());
        let seats = (0..=SEAT_LIMIT)
            .map(|seat| SeatAmount { seat, amount: 100 })
            .collect();
        let event = HoldemEvent::HandStarted {
            hand_no: 1,
            button: 0,
            sb: 10,
            bb: 20,
            deck_seed: 7,
            seats,
        };
        assert!(matches!(
            state.check(&event),
            Err(DomainError::Infra(InfraErrorKind::DataCorruption, _))
        ));
        let street = HoldemEvent::StreetDealt {
            street: Street::Flop,
            cards: vec![card("AS")],
        };
        assert!(state.check(&street).is_err());
    }

    #[test]
    fn short_all_in_is_allowed_below_minimum() {
        assert!(HoldemState::check_size(15, 40, 15).is_ok());
        assert!(HoldemState::check_size(30, 40, 100).is_err());
        assert!(HoldemState::check_size(120, 40, 100).is_err());
    }
}
