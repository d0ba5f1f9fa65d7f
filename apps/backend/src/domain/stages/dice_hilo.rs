//! Dice Hi/Lo: call whether the second die beats the first.

use serde::{Deserialize, Serialize};

use crate::domain::actions::PlayerAction;
use crate::domain::ledger;
use crate::domain::rules::{secs_to_millis, MatchRules};
use crate::domain::stages::{SeatAmount, StageCtx, StageReducer, StageSummary};
use crate::domain::types::{Chips, Millis, Seat};
use crate::errors::domain::{DomainError, IllegalKind};

pub const MIN_CALL: Chips = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HiLoCall {
    Higher,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DicePhase {
    Idle,
    Calling,
    Rolled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceCall {
    pub seat: Seat,
    pub call: HiLoCall,
    pub amount: Chips,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DiceEvent {
    RoundOpened {
        round: u32,
        first_die: u8,
    },
    CallPlaced {
        seat: Seat,
        round: u32,
        call: HiLoCall,
        amount: Chips,
    },
    CallPassed {
        seat: Seat,
        round: u32,
    },
    SecondDieRolled {
        round: u32,
        die: u8,
    },
    CallSettled {
        seat: Seat,
        round: u32,
        call: HiLoCall,
        amount: Chips,
        delta: Chips,
    },
    RoundClosed {
        round: u32,
    },
    DiceEnded,
}

impl DiceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DiceEvent::RoundOpened { .. } => "RoundOpened",
            DiceEvent::CallPlaced { .. } => "CallPlaced",
            DiceEvent::CallPassed { .. } => "CallPassed",
            DiceEvent::SecondDieRolled { .. } => "SecondDieRolled",
            DiceEvent::CallSettled { .. } => "CallSettled",
            DiceEvent::RoundClosed { .. } => "RoundClosed",
            DiceEvent::DiceEnded => "DiceEnded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceHiLoState {
    pub round: u32,
    pub rounds_total: u32,
    pub phase: DicePhase,
    pub seats: Vec<Seat>,
    pub first_die: Option<u8>,
    pub second_die: Option<u8>,
    pub calls: Vec<DiceCall>,
    pub passed: Vec<Seat>,
    pub net: Vec<SeatAmount>,
    pub deadline: Option<Millis>,
    pub call_ms: Millis,
    pub ended: bool,
}

impl DiceHiLoState {
    pub fn open(seats: &[Seat], rules: &MatchRules) -> Self {
        Self {
            round: 0,
            rounds_total: rules.dice_rounds,
            phase: DicePhase::Idle,
            seats: seats.to_vec(),
            first_die: None,
            second_die: None,
            calls: Vec::new(),
            passed: Vec::new(),
            net: seats
                .iter()
                .map(|s| SeatAmount {
                    seat: *s,
                    amount: 0,
                })
                .collect(),
            deadline: None,
            call_ms: secs_to_millis(rules.dice_call_secs),
            ended: false,
        }
    }

    fn has_acted(&self, seat: Seat) -> bool {
        self.passed.contains(&seat) || self.calls.iter().any(|c| c.seat == seat)
    }

    /// Seats that can cover the minimum call this round.
    fn eligible(&self, ctx: &StageCtx<'_>) -> Vec<Seat> {
        self.seats
            .iter()
            .copied()
            .filter(|s| ctx.is_active(*s) && ctx.stack(*s) >= MIN_CALL)
            .collect()
    }

    fn pending(&self, ctx: &StageCtx<'_>) -> Vec<Seat> {
        self.eligible(ctx)
            .into_iter()
            .filter(|s| !self.has_acted(*s))
            .collect()
    }
}

impl StageReducer for DiceHiLoState {
    type Event = DiceEvent;

    fn decide(
        &self,
        ctx: &StageCtx<'_>,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<Vec<DiceEvent>, DomainError> {
        let round = match action {
            PlayerAction::DiceCall { round, .. } | PlayerAction::DicePass { round } => *round,
            other => {
                return Err(DomainError::illegal(
                    IllegalKind::WrongStage,
                    format!("{} is not a dice action", other.name()),
                ))
            }
        };
        if self.phase != DicePhase::Calling {
            return Err(DomainError::illegal(
                IllegalKind::WrongPhase,
                "no dice round is taking calls",
            ));
        }
        if round != self.round {
            return Err(DomainError::illegal(
                IllegalKind::StaleSubState,
                format!("round {round} is not open; {} is", self.round),
            ));
        }
        if !self.seats.contains(&seat) {
            return Err(DomainError::illegal(
                IllegalKind::NotSeated,
                format!("seat {seat} is not at the dice table"),
            ));
        }
        if self.has_acted(seat) {
            return Err(DomainError::illegal(
                IllegalKind::AlreadyActed,
                format!("seat {seat} already acted in round {round}"),
            ));
        }
        match action {
            PlayerAction::DiceCall { call, amount, .. } => {
                if *amount > ctx.stack(seat) {
                    return Err(DomainError::illegal(
                        IllegalKind::InsufficientStack,
                        format!("seat {seat} cannot cover {amount}"),
                    ));
                }
                Ok(vec![DiceEvent::CallPlaced {
                    seat,
                    round,
                    call: *call,
                    amount: *amount,
                }])
            }
            _ => Ok(vec![DiceEvent::CallPassed { seat, round }]),
        }
    }

    fn advance(&self, ctx: &StageCtx<'_>) -> Vec<DiceEvent> {
        if self.ended {
            return Vec::new();
        }
        match self.phase {
            DicePhase::Idle => {
                if self.round >= self.rounds_total || self.eligible(ctx).is_empty() {
                    return vec![DiceEvent::DiceEnded];
                }
                vec![DiceEvent::RoundOpened {
                    round: self.round + 1,
                    first_die: ctx.rng(0).die(),
                }]
            }
            DicePhase::Calling => {
                if self.pending(ctx).is_empty() {
                    vec![DiceEvent::SecondDieRolled {
                        round: self.round,
                        die: ctx.rng(0).die(),
                    }]
                } else {
                    Vec::new()
                }
            }
            DicePhase::Rolled => {
                let (Some(first), Some(second)) = (self.first_die, self.second_die) else {
                    return Vec::new();
                };
                let mut events: Vec<DiceEvent> = self
                    .calls
                    .iter()
                    .map(|c| DiceEvent::CallSettled {
                        seat: c.seat,
                        round: self.round,
                        call: c.call,
                        amount: c.amount,
                        delta: ledger::dice_hilo_delta(c.call, first, second, c.amount),
                    })
                    .collect();
                events.push(DiceEvent::RoundClosed { round: self.round });
                events
            }
        }
    }

    fn expire(&self, ctx: &StageCtx<'_>) -> Vec<DiceEvent> {
        match (self.phase, self.deadline) {
            (DicePhase::Calling, Some(d)) if d <= ctx.now => self
                .pending(ctx)
                .into_iter()
                .map(|seat| DiceEvent::CallPassed {
                    seat,
                    round: self.round,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn apply(&mut self, event: &DiceEvent, ts: Millis) {
        match event {
            DiceEvent::RoundOpened { round, first_die } => {
                self.round = *round;
                self.phase = DicePhase::Calling;
                self.first_die = Some(*first_die);
                self.second_die = None;
                self.calls.clear();
                self.passed.clear();
                self.deadline = Some(ts + self.call_ms);
            }
            DiceEvent::CallPlaced {
                seat, call, amount, ..
            } => self.calls.push(DiceCall {
                seat: *seat,
                call: *call,
                amount: *amount,
            }),
            DiceEvent::CallPassed { seat, .. } => self.passed.push(*seat),
            DiceEvent::SecondDieRolled { die, .. } => {
                self.second_die = Some(*die);
                self.phase = DicePhase::Rolled;
                self.deadline = None;
            }
            DiceEvent::CallSettled { seat, delta, .. } => {
                if let Some(n) = self.net.iter_mut().find(|n| n.seat == *seat) {
                    n.amount += delta;
                }
            }
            DiceEvent::RoundClosed { .. } => self.phase = DicePhase::Idle,
            DiceEvent::DiceEnded => {
                self.ended = true;
                self.deadline = None;
            }
        }
    }

    fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    fn awaiting(&self) -> Vec<Seat> {
        if self.phase != DicePhase::Calling {
            return Vec::new();
        }
        self.seats
            .iter()
            .copied()
            .filter(|s| !self.has_acted(*s))
            .collect()
    }

    fn summary(&self) -> Option<StageSummary> {
        self.ended.then(|| StageSummary::DiceHiLo {
            net: self.net.clone(),
        })
    }
}
