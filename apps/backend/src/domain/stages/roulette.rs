//! Side-bet roulette between Blackjack and Trivia.
//!
//! Each seat may risk at most its blackjack profit `P`, locked when the
//! blackjack stage closed. Every wager consumes cap; wins never restore it.

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::ledger;
use crate::domain::rules::{secs_to_millis, MatchRules};
use crate::domain::stages::blackjack::BlackjackResult;
use crate::domain::stages::{SeatAmount, StageCtx, StageReducer, StageSummary};
use crate::domain::types::{Chips, Millis, Seat};
use crate::errors::domain::{DomainError, IllegalKind, InfraErrorKind, ValidationKind};

/// European single-zero wheel.
pub const POCKETS: u64 = 37;
pub const RED_POCKETS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouletteColor {
    Red,
    Black,
}

/// `None` for the green zero.
pub fn pocket_color(pocket: u8) -> Option<RouletteColor> {
    match pocket {
        0 => None,
        p if RED_POCKETS.contains(&p) => Some(RouletteColor::Red),
        _ => Some(RouletteColor::Black),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpinPhase {
    Idle,
    Betting,
    Spun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCap {
    pub seat: Seat,
    /// Blackjack profit at the moment blackjack closed.
    pub locked: Chips,
    pub remaining: Chips,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouletteWager {
    pub seat: Seat,
    pub color: RouletteColor,
    pub amount: Chips,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RouletteEvent {
    SpinOpened {
        spin: u32,
    },
    WagerPlaced {
        seat: Seat,
        color: RouletteColor,
        amount: Chips,
    },
    Passed {
        seat: Seat,
    },
    WheelSpun {
        spin: u32,
        pocket: u8,
    },
    WagerSettled {
        seat: Seat,
        color: RouletteColor,
        amount: Chips,
        delta: Chips,
    },
    SpinClosed {
        spin: u32,
    },
    InterludeEnded,
}

impl RouletteEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RouletteEvent::SpinOpened { .. } => "SpinOpened",
            RouletteEvent::WagerPlaced { .. } => "WagerPlaced",
            RouletteEvent::Passed { .. } => "Passed",
            RouletteEvent::WheelSpun { .. } => "WheelSpun",
            RouletteEvent::WagerSettled { .. } => "WagerSettled",
            RouletteEvent::SpinClosed { .. } => "SpinClosed",
            RouletteEvent::InterludeEnded => "InterludeEnded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouletteState {
    pub spin: u32,
    pub spins_total: u32,
    pub phase: SpinPhase,
    pub caps: Vec<SeatCap>,
    pub wagers: Vec<RouletteWager>,
    pub passed: Vec<Seat>,
    pub pocket: Option<u8>,
    pub total_wagered: Vec<SeatAmount>,
    pub deadline: Option<Millis>,
    pub betting_ms: Millis,
    pub ended: bool,
}

impl RouletteState {
    pub fn open(results: &[BlackjackResult], seats: &[Seat], rules: &MatchRules) -> Self {
        let caps: Vec<SeatCap> = seats
            .iter()
            .map(|seat| {
                let locked = results
                    .iter()
                    .find(|r| r.seat == *seat)
                    .map_or(0, BlackjackResult::profit);
                SeatCap {
                    seat: *seat,
                    locked,
                    remaining: locked,
                }
            })
            .collect();
        Self {
            spin: 0,
            spins_total: rules.roulette_spins,
            phase: SpinPhase::Idle,
            total_wagered: caps
                .iter()
                .map(|c| SeatAmount {
                    seat: c.seat,
                    amount: 0,
                })
                .collect(),
            caps,
            wagers: Vec::new(),
            passed: Vec::new(),
            pocket: None,
            deadline: None,
            betting_ms: secs_to_millis(rules.roulette_betting_secs),
            ended: false,
        }
    }

    pub fn cap(&self, seat: Seat) -> Option<&SeatCap> {
        self.caps.iter().find(|c| c.seat == seat)
    }

    fn has_acted(&self, seat: Seat) -> bool {
        self.passed.contains(&seat) || self.wagers.iter().any(|w| w.seat == seat)
    }

    /// Seats that can still place a wager this interlude.
    fn eligible(&self, ctx: &StageCtx<'_>) -> Vec<Seat> {
        self.caps
            .iter()
            .filter(|c| c.remaining > 0 && ctx.is_active(c.seat) && ctx.stack(c.seat) > 0)
            .map(|c| c.seat)
            .collect()
    }
}

impl StageReducer for RouletteState {
    type Event = RouletteEvent;

    fn decide(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<RouletteEvent>, DomainError> {
        let is_roulette = matches!(
            action,
            PlayerAction::RouletteBet { .. } | PlayerAction::RoulettePass
        );
        if !is_roulette {
            return Err(DomainError::illegal(
                IllegalKind::WrongStage,
                format!("{} is not a roulette action", action.name()),
            ));
        }
        if self.phase != SpinPhase::Betting {
            return Err(DomainError::illegal(
                IllegalKind::WrongPhase,
                "the wheel is not taking bets",
            ));
        }
        let cap = self.cap(seat).ok_or_else(|| {
            DomainError::illegal(IllegalKind::NotSeated, format!("seat {seat} has no cap"))
        })?;
        if self.has_acted(seat) {
            return Err(DomainError::illegal(
                IllegalKind::AlreadyActed,
                format!("seat {seat} already acted on spin {}", self.spin),
            ));
        }
        match action {
            PlayerAction::RouletteBet { color, amount } => {
                if *amount <= 0 {
                    return Err(DomainError::validation(
                        ValidationKind::InvalidAmount,
                        format!("amount must be positive, got {amount}"),
                    ));
                }
                if *amount > cap.remaining {
                    return Err(DomainError::illegal(
                        IllegalKind::CapExceeded,
                        format!(
                            "wager {amount} exceeds remaining cap {} of {}",
                            cap.remaining, cap.locked
                        ),
                    ));
                }
                if *amount > ctx.stack(seat) {
                    return Err(DomainError::illegal(
                        IllegalKind::InsufficientStack,
                        format!("seat {seat} cannot cover {amount}"),
                    ));
                }
                Ok(vec![RouletteEvent::WagerPlaced {
                    seat,
                    color: *color,
                    amount: *amount,
                }])
            }
            _ => Ok(vec![RouletteEvent::Passed { seat }]),
        }
    }

    fn advance(&self, ctx: &StageCtx<'_>) -> Vec<RouletteEvent> {
        if self.ended {
            return Vec::new();
        }
        match self.phase {
            SpinPhase::Idle => {
                if self.spin >= self.spins_total || self.eligible(ctx).is_empty() {
                    vec![RouletteEvent::InterludeEnded]
                } else {
                    vec![RouletteEvent::SpinOpened {
                        spin: self.spin + 1,
                    }]
                }
            }
            SpinPhase::Betting => {
                if self.eligible(ctx).iter().all(|s| self.has_acted(*s)) {
                    vec![RouletteEvent::WheelSpun {
                        spin: self.spin,
                        pocket: ctx.rng(0).below(POCKETS) as u8,
                    }]
                } else {
                    Vec::new()
                }
            }
            SpinPhase::Spun => {
                let pocket = self.pocket.unwrap_or(0);
                let mut events: Vec<RouletteEvent> = self
                    .wagers
                    .iter()
                    .map(|w| RouletteEvent::WagerSettled {
                        seat: w.seat,
                        color: w.color,
                        amount: w.amount,
                        delta: ledger::roulette_delta(pocket_color(pocket) == Some(w.color), w.amount),
                    })
                    .collect();
                events.push(RouletteEvent::SpinClosed { spin: self.spin });
                events
            }
        }
    }

    fn expire(&self, ctx: &StageCtx<'_>) -> Vec<RouletteEvent> {
        match (self.phase, self.deadline) {
            (SpinPhase::Betting, Some(d)) if d <= ctx.now => vec![RouletteEvent::WheelSpun {
                spin: self.spin,
                pocket: ctx.rng(0).below(POCKETS) as u8,
            }],
            _ => Vec::new(),
        }
    }

    fn apply(&mut self, event: &RouletteEvent, ts: Millis) {
        match event {
            RouletteEvent::SpinOpened { spin } => {
                self.spin = *spin;
                self.phase = SpinPhase::Betting;
                self.wagers.clear();
                self.passed.clear();
                self.pocket = None;
                self.deadline = Some(ts + self.betting_ms);
            }
            RouletteEvent::WagerPlaced {
                seat,
                color,
                amount,
            } => {
                if let Some(cap) = self.caps.iter_mut().find(|c| c.seat == *seat) {
                    cap.remaining -= amount;
                }
                if let Some(t) = self.total_wagered.iter_mut().find(|t| t.seat == *seat) {
                    t.amount += amount;
                }
                self.wagers.push(RouletteWager {
                    seat: *seat,
                    color: *color,
                    amount: *amount,
                });
            }
            RouletteEvent::Passed { seat } => self.passed.push(*seat),
            RouletteEvent::WheelSpun { pocket, .. } => {
                self.pocket = Some(*pocket);
                self.phase = SpinPhase::Spun;
                self.deadline = None;
            }
            RouletteEvent::WagerSettled { .. } => {}
            RouletteEvent::SpinClosed { .. } => {
                self.phase = SpinPhase::Idle;
                self.wagers.clear();
                self.passed.clear();
            }
            RouletteEvent::InterludeEnded => {
                self.ended = true;
                self.deadline = None;
            }
        }
    }

    fn check(&self, event: &RouletteEvent) -> Result<(), DomainError> {
        let RouletteEvent::WagerPlaced { seat, amount, .. } = event else {
            return Ok(());
        };
        let remaining = self.cap(*seat).map_or(0, |c| c.remaining);
        if *amount <= 0 || *amount > remaining {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("seat {seat} stored wager {amount} against remaining cap {remaining}"),
            ));
        }
        Ok(())
    }

    fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    fn awaiting(&self) -> Vec<Seat> {
        if self.phase != SpinPhase::Betting {
            return Vec::new();
        }
        self.caps
            .iter()
            .filter(|c| c.remaining > 0 && !self.has_acted(c.seat))
            .map(|c| c.seat)
            .collect()
    }

    fn summary(&self) -> Option<StageSummary> {
        self.ended.then(|| StageSummary::Roulette {
            wagered: self.total_wagered.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::player::MatchPlayer;

    fn player(seat: Seat, stack: Chips) -> MatchPlayer {
        MatchPlayer {
            seat,
            user_id: Some(seat as i64 + 1),
            display_name: format!("p{seat}"),
            is_bot: false,
            is_connected: true,
            autopilot: false,
            ready: true,
            left: false,
            initial_stack: stack,
            stack,
            ledger_total: 0,
        }
    }

    fn ctx<'a>(rules: &'a MatchRules, players: &'a [MatchPlayer]) -> StageCtx<'a> {
        StageCtx {
            now: 0,
            match_seed: 42,
            seq: 10,
            rules,
            players,
        }
    }

    fn table(profit: Chips, rules: &MatchRules) -> RouletteState {
        let results = [BlackjackResult {
            seat: 0,
            bj_start: 2200,
            bj_end: 2200 + profit,
        }];
        RouletteState::open(&results, &[0], rules)
    }

    proptest! {
        #[test]
        fn stakes_never_exceed_blackjack_profit(
            profit in 0i64..2_000,
            bets in prop::collection::vec((-100i64..3_000, any::<bool>()), 1..24),
        ) {
            let rules = MatchRules::default();
            let players = [player(0, 10_000)];
            let ctx = ctx(&rules, &players);
            let mut state = table(profit, &rules);
            let mut staked: Chips = 0;

            for (spin, (amount, red)) in (1u32..).zip(bets) {
                state.apply(&RouletteEvent::SpinOpened { spin }, 0);
                let color = if red { RouletteColor::Red } else { RouletteColor::Black };
                let before = state.clone();
                match state.decide(&ctx, 0, &PlayerAction::RouletteBet { color, amount }) {
                    Ok(events) => {
                        for event in &events {
                            state
                                .check_and_apply(event, 0)
                                .map_err(|e| TestCaseError::fail(e.to_string()))?;
                        }
                        staked += amount;
                    }
                    Err(err) => {
                        let expected = if amount > 0 {
                            matches!(err, DomainError::Illegal(IllegalKind::CapExceeded, _))
                        } else {
                            matches!(err, DomainError::Validation(ValidationKind::InvalidAmount, _))
                        };
                        prop_assert!(expected, "amount {} rejected with {:?}", amount, err);
                        prop_assert_eq!(&state, &before);
                    }
                }
                prop_assert!(staked <= profit, "staked {} over profit {}", staked, profit);
                prop_assert_eq!(state.cap(0).map(|c| c.remaining), Some(profit - staked));
                state.apply(&RouletteEvent::SpinClosed { spin }, 0);
            }
        }
    }

    #[test]
    fn stored_wager_over_the_cap_is_corruption() {
        let rules = MatchRules::default();
        let mut state = table(400, &rules);
        state.apply(&RouletteEvent::SpinOpened { spin: 1 }, 0);
        let over = RouletteEvent::WagerPlaced {
            seat: 0,
            color: RouletteColor::Red,
            amount: 401,
        };
        let err = state.check(&over).unwrap_err();
        assert!(matches!(err, DomainError::Infra(InfraErrorKind::DataCorruption, _)));
        assert_eq!(state.cap(0).map(|c| c.remaining), Some(400));

        let exact = RouletteEvent::WagerPlaced {
            seat: 0,
            color: RouletteColor::Red,
            amount: 400,
        };
        state.check_and_apply(&exact, 0).unwrap();
        assert_eq!(state.cap(0).map(|c| c.remaining), Some(0));
    }

    #[test]
    fn wheel_colors() {
        assert_eq!(pocket_color(0), None);
        assert_eq!(pocket_color(1), Some(RouletteColor::Red));
        assert_eq!(pocket_color(2), Some(RouletteColor::Black));
        assert_eq!(pocket_color(36), Some(RouletteColor::Red));
        let reds = (1..=36).filter(|p| pocket_color(*p) == Some(RouletteColor::Red)).count();
        assert_eq!(reds, 18);
    }

    #[test]
    fn caps_come_from_blackjack_profit_only() {
        let results = vec![
            BlackjackResult {
                seat: 0,
                bj_start: 2200,
                bj_end: 2600,
            },
            BlackjackResult {
                seat: 1,
                bj_start: 1000,
                bj_end: 700,
            },
        ];
        let state = RouletteState::open(&results, &[0, 1], &MatchRules::default());
        assert_eq!(state.cap(0).map(|c| c.locked), Some(400));
        assert_eq!(state.cap(1).map(|c| c.locked), Some(0));
    }
}
