//! Shared-table blackjack.
//!
//! Round state machine: `BETTING → DEALING → PLAYER_TURNS → DEALER_RESOLVE →
//! SETTLED`. Seven spots are shared by the whole table; each spot carries at
//! most one bet per round and is played as an independent hand.
//!
//! House rules:
//!
//! | rule            | value                                                   |
//! |-----------------|---------------------------------------------------------|
//! | shoe            | 6 decks, reshuffled each round from `RoundOpened` seed  |
//! | wager           | 10..=100 per spot, total exposure <= stack              |
//! | dealer          | up card at deal, hole card at resolve, stands on all 17 |
//! | natural         | two-card 21 on an unsplit hand, pays 3:2                |
//! | three-card 21   | three cards, undoubled, pays 3:2, push on dealer 21     |
//! | double          | first decision only, one card, then stand               |
//! | split           | equal ranks, once per spot                              |
//! | player bust     | loses even when the dealer busts                        |
//! | timers          | betting window, per-decision window (auto-stand)        |

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::cards::{shuffled_shoe, Card, Rank};
use crate::domain::rules::{secs_to_millis, MatchRules};
use crate::domain::stages::{SeatAmount, StageCtx, StageReducer, StageSummary};
use crate::domain::types::{Chips, Millis, Seat};
use crate::errors::domain::{DomainError, IllegalKind};

pub const SPOTS: u8 = 7;
pub const MIN_WAGER: Chips = 10;
pub const MAX_WAGER: Chips = 100;
pub const SHOE_DECKS: usize = 6;
pub const DEALER_STANDS_ON: u8 = 17;

/// Best total for `cards` and whether an ace is still counted as 11.
pub fn hand_value(cards: &[Card]) -> (u8, bool) {
    let mut total: u16 = 0;
    let mut soft_aces = 0;
    for card in cards {
        total += card.rank.blackjack_value() as u16;
        if card.rank == Rank::Ace {
            soft_aces += 1;
        }
    }
    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    (total.min(u8::MAX as u16) as u8, soft_aces > 0)
}

pub fn total(cards: &[Card]) -> u8 {
    hand_value(cards).0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    Betting,
    Dealing,
    PlayerTurns,
    DealerResolve,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandAction {
    Hit,
    Stand,
    Double,
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandOutcome {
    Blackjack,
    ThreeCardTwentyOne,
    Win,
    Push,
    Lose,
    Bust,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotBet {
    pub spot: u8,
    pub seat: Seat,
    pub wager: Chips,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BjHand {
    pub spot: u8,
    /// 0 for the original hand, 1 for the split-off hand.
    pub index: u8,
    pub seat: Seat,
    pub cards: Vec<Card>,
    pub wager: Chips,
    pub doubled: bool,
    pub from_split: bool,
    pub decisions: u8,
    pub done: bool,
    pub resolved: bool,
}

impl BjHand {
    pub fn total(&self) -> u8 {
        total(&self.cards)
    }

    pub fn is_natural(&self) -> bool {
        !self.from_split && self.cards.len() == 2 && self.total() == 21
    }

    pub fn is_three_card_21(&self) -> bool {
        !self.doubled && self.cards.len() == 3 && self.total() == 21
    }

    pub fn can_split(&self) -> bool {
        self.decisions == 0
            && !self.from_split
            && self.cards.len() == 2
            && self.cards[0].rank == self.cards[1].rank
    }

    /// Split hands start with one decision counted, so they never double.
    pub fn can_double(&self) -> bool {
        self.decisions == 0 && self.cards.len() == 2
    }
}

/// Outcome and ledger delta for one finished hand against the dealer.
pub fn settle(hand: &BjHand, dealer: &[Card]) -> (HandOutcome, Chips) {
    let player = hand.total();
    let dealer_total = total(dealer);
    let dealer_natural = dealer.len() == 2 && dealer_total == 21;
    let enhanced = hand.wager * 3 / 2;

    if player > 21 {
        return (HandOutcome::Bust, -hand.wager);
    }
    if hand.is_natural() {
        return if dealer_natural {
            (HandOutcome::Push, 0)
        } else {
            (HandOutcome::Blackjack, enhanced)
        };
    }
    if hand.is_three_card_21() {
        return if dealer_total == 21 {
            (HandOutcome::Push, 0)
        } else {
            (HandOutcome::ThreeCardTwentyOne, enhanced)
        };
    }
    if dealer_natural {
        return (HandOutcome::Lose, -hand.wager);
    }
    if dealer_total > 21 || player > dealer_total {
        (HandOutcome::Win, hand.wager)
    } else if player == dealer_total {
        (HandOutcome::Push, 0)
    } else {
        (HandOutcome::Lose, -hand.wager)
    }
}

/// Cards the dealer draws at resolve: hole card first, then hits below 17.
pub fn dealer_draws(up: &[Card], shoe: &[Card], hit: bool) -> Vec<Card> {
    let mut hand = up.to_vec();
    let mut drawn = Vec::new();
    let mut next = shoe.iter();
    if let Some(hole) = next.next() {
        hand.push(*hole);
        drawn.push(*hole);
    }
    if hit {
        while total(&hand) < DEALER_STANDS_ON {
            let Some(card) = next.next() else { break };
            hand.push(*card);
            drawn.push(*card);
        }
    }
    drawn
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealtHand {
    pub spot: u8,
    pub seat: Seat,
    pub cards: [Card; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlackjackEvent {
    RoundOpened {
        round: u32,
        shoe_seed: u64,
    },
    BetPlaced {
        seat: Seat,
        spot: u8,
        amount: Chips,
    },
    BettingFinished {
        seat: Seat,
    },
    BettingClosed {
        round: u32,
    },
    CardsDealt {
        hands: Vec<DealtHand>,
        dealer_up: Card,
    },
    HandActed {
        seat: Seat,
        spot: u8,
        hand: u8,
        action: HandAction,
        cards: Vec<Card>,
    },
    DealerResolved {
        cards: Vec<Card>,
    },
    HandResolved {
        seat: Seat,
        spot: u8,
        hand: u8,
        wager: Chips,
        outcome: HandOutcome,
        delta: Chips,
    },
    RoundCompleted {
        round: u32,
    },
    TableClosed,
}

impl BlackjackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BlackjackEvent::RoundOpened { .. } => "RoundOpened",
            BlackjackEvent::BetPlaced { .. } => "BetPlaced",
            BlackjackEvent::BettingFinished { .. } => "BettingFinished",
            BlackjackEvent::BettingClosed { .. } => "BettingClosed",
            BlackjackEvent::CardsDealt { .. } => "CardsDealt",
            BlackjackEvent::HandActed { .. } => "HandActed",
            BlackjackEvent::DealerResolved { .. } => "DealerResolved",
            BlackjackEvent::HandResolved { .. } => "HandResolved",
            BlackjackEvent::RoundCompleted { .. } => "RoundCompleted",
            BlackjackEvent::TableClosed => "TableClosed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackjackState {
    /// Rounds opened so far; 0 before the first `RoundOpened`.
    pub round: u32,
    pub rounds_total: Option<u32>,
    pub phase: RoundPhase,
    pub seats: Vec<Seat>,
    pub start_stacks: Vec<SeatAmount>,
    /// Net result per seat across the stage.
    pub net: Vec<SeatAmount>,
    pub bets: Vec<SpotBet>,
    pub finished_betting: Vec<Seat>,
    pub hands: Vec<BjHand>,
    pub dealer: Vec<Card>,
    pub shoe_seed: u64,
    pub shoe_pos: usize,
    pub phase_deadline: Option<Millis>,
    pub betting_ms: Millis,
    pub decision_ms: Millis,
    pub closed: bool,
}

impl BlackjackState {
    pub fn open(start_stacks: Vec<SeatAmount>, rules: &MatchRules) -> Self {
        Self {
            round: 0,
            rounds_total: rules.bj_rounds,
            phase: RoundPhase::Settled,
            seats: start_stacks.iter().map(|s| s.seat).collect(),
            net: start_stacks
                .iter()
                .map(|s| SeatAmount {
                    seat: s.seat,
                    amount: 0,
                })
                .collect(),
            start_stacks,
            bets: Vec::new(),
            finished_betting: Vec::new(),
            hands: Vec::new(),
            dealer: Vec::new(),
            shoe_seed: 0,
            shoe_pos: 0,
            phase_deadline: None,
            betting_ms: secs_to_millis(rules.bj_betting_secs),
            decision_ms: secs_to_millis(rules.bj_decision_secs),
            closed: false,
        }
    }

    /// First unfinished hand in spot order.
    pub fn active_hand(&self) -> Option<&BjHand> {
        self.hands.iter().find(|h| !h.done)
    }

    pub fn hand(&self, spot: u8, index: u8) -> Option<&BjHand> {
        self.hands
            .iter()
            .find(|h| h.spot == spot && h.index == index)
    }

    fn hand_mut(&mut self, spot: u8, index: u8) -> Option<&mut BjHand> {
        self.hands
            .iter_mut()
            .find(|h| h.spot == spot && h.index == index)
    }

    pub fn bet_on(&self, spot: u8) -> Option<&SpotBet> {
        self.bets.iter().find(|b| b.spot == spot)
    }

    /// Chips a seat currently has at risk this round.
    pub fn exposure(&self, seat: Seat) -> Chips {
        if self.hands.is_empty() {
            self.bets
                .iter()
                .filter(|b| b.seat == seat)
                .map(|b| b.wager)
                .sum()
        } else {
            self.hands
                .iter()
                .filter(|h| h.seat == seat)
                .map(|h| h.wager)
                .sum()
        }
    }

    fn shoe_draw(&self, n: usize) -> Vec<Card> {
        let shoe = shuffled_shoe(SHOE_DECKS, self.shoe_seed);
        shoe.into_iter().skip(self.shoe_pos).take(n).collect()
    }

    fn rounds_done(&self) -> bool {
        self.rounds_total.is_some_and(|t| self.round >= t)
    }

    /// Seats that may still bet this round.
    fn betting_seats(&self, ctx: &StageCtx<'_>) -> Vec<Seat> {
        self.seats
            .iter()
            .copied()
            .filter(|s| ctx.is_active(*s) && ctx.stack(*s) >= MIN_WAGER)
            .collect()
    }

    fn require_phase(&self, phase: RoundPhase) -> Result<(), DomainError> {
        if self.phase != phase {
            return Err(DomainError::illegal(
                IllegalKind::WrongPhase,
                format!("round is in {:?}, not {:?}", self.phase, phase),
            ));
        }
        Ok(())
    }

    fn decide_bet(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        spot: u8,
        amount: Chips,
    ) -> Result<Vec<BlackjackEvent>, DomainError> {
        self.require_phase(RoundPhase::Betting)?;
        if !self.seats.contains(&seat) || !ctx.is_active(seat) {
            return Err(DomainError::illegal(
                IllegalKind::NotSeated,
                format!("seat {seat} is not at the table"),
            ));
        }
        if self.finished_betting.contains(&seat) {
            return Err(DomainError::illegal(
                IllegalKind::AlreadyActed,
                format!("seat {seat} already finished betting"),
            ));
        }
        if self.bet_on(spot).is_some() {
            return Err(DomainError::illegal(
                IllegalKind::SpotTaken,
                format!("spot {spot} already has a pending bet"),
            ));
        }
        if self.exposure(seat) + amount > ctx.stack(seat) {
            return Err(DomainError::illegal(
                IllegalKind::InsufficientStack,
                format!("seat {seat} cannot cover {amount} more"),
            ));
        }
        Ok(vec![BlackjackEvent::BetPlaced { seat, spot, amount }])
    }

    fn decide_hand(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        spot: u8,
        index: u8,
        action: HandAction,
    ) -> Result<Vec<BlackjackEvent>, DomainError> {
        self.require_phase(RoundPhase::PlayerTurns)?;
        let active = self.active_hand().ok_or_else(|| {
            DomainError::illegal(IllegalKind::WrongPhase, "no hand is awaiting a decision")
        })?;
        if active.spot != spot || active.index != index {
            return Err(DomainError::illegal(
                IllegalKind::StaleSubState,
                format!(
                    "hand {spot}/{index} is not active; spot {}/{} is",
                    active.spot, active.index
                ),
            ));
        }
        if active.seat != seat {
            return Err(DomainError::illegal(
                IllegalKind::OutOfTurn,
                format!("spot {spot} belongs to seat {}", active.seat),
            ));
        }
        let extra_needed = matches!(action, HandAction::Double | HandAction::Split);
        if extra_needed && self.exposure(seat) + active.wager > ctx.stack(seat) {
            return Err(DomainError::illegal(
                IllegalKind::InsufficientStack,
                format!("seat {seat} cannot cover another {}", active.wager),
            ));
        }
        let draw = match action {
            HandAction::Hit => 1,
            HandAction::Stand => 0,
            HandAction::Double => {
                if !active.can_double() {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongPhase,
                        "double is only allowed as the first decision",
                    ));
                }
                1
            }
            HandAction::Split => {
                if !active.can_split() {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongPhase,
                        "split needs two cards of equal rank as the first decision",
                    ));
                }
                2
            }
        };
        Ok(vec![BlackjackEvent::HandActed {
            seat,
            spot,
            hand: index,
            action,
            cards: self.shoe_draw(draw),
        }])
    }

    fn resolve_hands(&self) -> Vec<BlackjackEvent> {
        let mut events: Vec<BlackjackEvent> = self
            .hands
            .iter()
            .filter(|h| !h.resolved)
            .map(|h| {
                let (outcome, delta) = settle(h, &self.dealer);
                BlackjackEvent::HandResolved {
                    seat: h.seat,
                    spot: h.spot,
                    hand: h.index,
                    wager: h.wager,
                    outcome,
                    delta,
                }
            })
            .collect();
        events.push(BlackjackEvent::RoundCompleted { round: self.round });
        events
    }

    fn apply_hand_action(&mut self, spot: u8, index: u8, action: HandAction, cards: &[Card]) {
        match action {
            HandAction::Split => {
                let Some(pos) = self
                    .hands
                    .iter()
                    .position(|h| h.spot == spot && h.index == index)
                else {
                    return;
                };
                let original = &mut self.hands[pos];
                let moved = original.cards.pop();
                original.from_split = true;
                original.decisions += 1;
                if let Some(first) = cards.first() {
                    original.cards.push(*first);
                }
                original.done = original.total() >= 21;
                let mut split = BjHand {
                    spot,
                    index: index + 1,
                    seat: original.seat,
                    cards: moved.into_iter().collect(),
                    wager: original.wager,
                    doubled: false,
                    from_split: true,
                    decisions: 1,
                    done: false,
                    resolved: false,
                };
                if let Some(second) = cards.get(1) {
                    split.cards.push(*second);
                }
                split.done = split.total() >= 21;
                self.hands.insert(pos + 1, split);
            }
            _ => {
                let Some(hand) = self.hand_mut(spot, index) else {
                    return;
                };
                hand.decisions += 1;
                hand.cards.extend_from_slice(cards);
                match action {
                    HandAction::Stand => hand.done = true,
                    HandAction::Double => {
                        hand.wager *= 2;
                        hand.doubled = true;
                        hand.done = true;
                    }
                    _ => hand.done = hand.total() >= 21,
                }
            }
        }
    }
}

impl StageReducer for BlackjackState {
    type Event = BlackjackEvent;

    fn decide(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<BlackjackEvent>, DomainError> {
        match action {
            PlayerAction::PlaceBet { spot, amount } => self.decide_bet(ctx, seat, *spot, *amount),
            PlayerAction::FinishBetting => {
                self.require_phase(RoundPhase::Betting)?;
                if self.finished_betting.contains(&seat) {
                    return Err(DomainError::illegal(
                        IllegalKind::AlreadyActed,
                        format!("seat {seat} already finished betting"),
                    ));
                }
                Ok(vec![BlackjackEvent::BettingFinished { seat }])
            }
            PlayerAction::Hit { spot, hand } => {
                self.decide_hand(ctx, seat, *spot, *hand, HandAction::Hit)
            }
            PlayerAction::Stand { spot, hand } => {
                self.decide_hand(ctx, seat, *spot, *hand, HandAction::Stand)
            }
            PlayerAction::Double { spot, hand } => {
                self.decide_hand(ctx, seat, *spot, *hand, HandAction::Double)
            }
            PlayerAction::Split { spot, hand } => {
                self.decide_hand(ctx, seat, *spot, *hand, HandAction::Split)
            }
            other => Err(DomainError::illegal(
                IllegalKind::WrongStage,
                format!("{} is not a blackjack action", other.name()),
            )),
        }
    }

    fn advance(&self, ctx: &StageCtx<'_>) -> Vec<BlackjackEvent> {
        if self.closed {
            return Vec::new();
        }
        match self.phase {
            RoundPhase::Settled => {
                if self.rounds_done() {
                    return Vec::new();
                }
                if self.rounds_total.is_none()
                    && (!ctx.has_active_human() || self.betting_seats(ctx).is_empty())
                {
                    return vec![BlackjackEvent::TableClosed];
                }
                vec![BlackjackEvent::RoundOpened {
                    round: self.round + 1,
                    shoe_seed: ctx.rng(0).next_u64(),
                }]
            }
            RoundPhase::Betting => {
                let pending = self
                    .betting_seats(ctx)
                    .into_iter()
                    .any(|s| !self.finished_betting.contains(&s));
                if pending {
                    Vec::new()
                } else {
                    vec![BlackjackEvent::BettingClosed { round: self.round }]
                }
            }
            RoundPhase::Dealing => {
                if self.bets.is_empty() {
                    return vec![BlackjackEvent::RoundCompleted { round: self.round }];
                }
                let drawn = self.shoe_draw(self.bets.len() * 2 + 1);
                let n = self.bets.len();
                let hands = self
                    .bets
                    .iter()
                    .enumerate()
                    .map(|(i, bet)| DealtHand {
                        spot: bet.spot,
                        seat: bet.seat,
                        cards: [drawn[i], drawn[n + i]],
                    })
                    .collect();
                vec![BlackjackEvent::CardsDealt {
                    hands,
                    dealer_up: drawn[2 * n],
                }]
            }
            RoundPhase::PlayerTurns => {
                if self.active_hand().is_some() {
                    return Vec::new();
                }
                let live = self.hands.iter().any(|h| h.total() <= 21);
                let shoe: Vec<Card> = self.shoe_draw(usize::MAX);
                vec![BlackjackEvent::DealerResolved {
                    cards: dealer_draws(&self.dealer, &shoe, live),
                }]
            }
            RoundPhase::DealerResolve => self.resolve_hands(),
        }
    }

    fn expire(&self, ctx: &StageCtx<'_>) -> Vec<BlackjackEvent> {
        if self.phase_deadline.map_or(true, |d| d > ctx.now) {
            return Vec::new();
        }
        match self.phase {
            RoundPhase::Betting => vec![BlackjackEvent::BettingClosed { round: self.round }],
            RoundPhase::PlayerTurns => match self.active_hand() {
                Some(hand) => vec![BlackjackEvent::HandActed {
                    seat: hand.seat,
                    spot: hand.spot,
                    hand: hand.index,
                    action: HandAction::Stand,
                    cards: Vec::new(),
                }],
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn apply(&mut self, event: &BlackjackEvent, ts: Millis) {
        match event {
            BlackjackEvent::RoundOpened { round, shoe_seed } => {
                self.round = *round;
                self.phase = RoundPhase::Betting;
                self.shoe_seed = *shoe_seed;
                self.shoe_pos = 0;
                self.bets.clear();
                self.finished_betting.clear();
                self.hands.clear();
                self.dealer.clear();
                self.phase_deadline = Some(ts + self.betting_ms);
            }
            BlackjackEvent::BetPlaced { seat, spot, amount } => {
                self.bets.push(SpotBet {
                    spot: *spot,
                    seat: *seat,
                    wager: *amount,
                });
                self.bets.sort_by_key(|b| b.spot);
            }
            BlackjackEvent::BettingFinished { seat } => {
                self.finished_betting.push(*seat);
            }
            BlackjackEvent::BettingClosed { .. } => {
                self.phase = RoundPhase::Dealing;
                self.phase_deadline = None;
            }
            BlackjackEvent::CardsDealt { hands, dealer_up } => {
                self.hands = hands
                    .iter()
                    .map(|d| {
                        let wager = self.bet_on(d.spot).map_or(0, |b| b.wager);
                        let mut hand = BjHand {
                            spot: d.spot,
                            index: 0,
                            seat: d.seat,
                            cards: d.cards.to_vec(),
                            wager,
                            doubled: false,
                            from_split: false,
                            decisions: 0,
                            done: false,
                            resolved: false,
                        };
                        hand.done = hand.total() == 21;
                        hand
                    })
                    .collect();
                self.dealer = vec![*dealer_up];
                self.shoe_pos += hands.len() * 2 + 1;
                self.phase = RoundPhase::PlayerTurns;
                self.phase_deadline = Some(ts + self.decision_ms);
            }
            BlackjackEvent::HandActed {
                spot,
                hand,
                action,
                cards,
                ..
            } => {
                self.apply_hand_action(*spot, *hand, *action, cards);
                self.shoe_pos += cards.len();
                self.phase_deadline = Some(ts + self.decision_ms);
            }
            BlackjackEvent::DealerResolved { cards } => {
                self.dealer.extend_from_slice(cards);
                self.shoe_pos += cards.len();
                self.phase = RoundPhase::DealerResolve;
                self.phase_deadline = None;
            }
            BlackjackEvent::HandResolved {
                seat,
                spot,
                hand,
                delta,
                ..
            } => {
                if let Some(h) = self.hand_mut(*spot, *hand) {
                    h.resolved = true;
                }
                if let Some(n) = self.net.iter_mut().find(|n| n.seat == *seat) {
                    n.amount += delta;
                }
            }
            BlackjackEvent::RoundCompleted { .. } => {
                self.phase = RoundPhase::Settled;
                self.phase_deadline = None;
            }
            BlackjackEvent::TableClosed => {
                self.closed = true;
                self.phase_deadline = None;
            }
        }
    }

    fn deadline(&self) -> Option<Millis> {
        match self.phase {
            RoundPhase::Betting | RoundPhase::PlayerTurns => self.phase_deadline,
            _ => None,
        }
    }

    fn awaiting(&self) -> Vec<Seat> {
        match self.phase {
            RoundPhase::Betting => self
                .seats
                .iter()
                .copied()
                .filter(|s| !self.finished_betting.contains(s))
                .collect(),
            RoundPhase::PlayerTurns => self.active_hand().map(|h| h.seat).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn summary(&self) -> Option<StageSummary> {
        let done = self.closed || (self.phase == RoundPhase::Settled && self.rounds_done());
        if !done {
            return None;
        }
        Some(StageSummary::Blackjack {
            results: self
                .start_stacks
                .iter()
                .map(|start| {
                    let net = self
                        .net
                        .iter()
                        .find(|n| n.seat == start.seat)
                        .map_or(0, |n| n.amount);
                    BlackjackResult {
                        seat: start.seat,
                        bj_start: start.amount,
                        bj_end: start.amount + net,
                    }
                })
                .collect(),
        })
    }
}

/// Stack movement across the blackjack stage, consumed by the roulette cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackjackResult {
    pub seat: Seat,
    pub bj_start: Chips,
    pub bj_end: Chips,
}

impl BlackjackResult {
    pub fn profit(&self) -> Chips {
        crate::domain::ledger::bj_profit(self.bj_start, self.bj_end)
    }
}
