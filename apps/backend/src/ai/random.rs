//! Random fallback bot.
//!
//! Picks uniformly among a small set of actions that are legal for the seat
//! in the current view. Used when no specialised strategy covers a stage and
//! as a baseline in tests.

use parking_lot::Mutex;

use rand::prelude::*;

use super::cautious::ROULETTE_TABLE_MIN;
use super::trait_def::BotStrategy;
use crate::domain::actions::PlayerAction;
use crate::domain::stages::blackjack::{RoundPhase, MIN_WAGER};
use crate::domain::stages::dice_hilo::{DicePhase, HiLoCall, MIN_CALL};
use crate::domain::stages::quiz::QuizKind;
use crate::domain::stages::roulette::{RouletteColor, SpinPhase};
use crate::domain::stages::yatzy::MAX_ROLLS;
use crate::domain::types::Seat;
use crate::domain::view::{MatchView, StageView};

pub struct RandomBot {
    rng: Mutex<StdRng>,
}

impl RandomBot {
    pub const NAME: &'static str = "random";
    pub const VERSION: &'static str = "1.0.0";

    /// `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn candidates(view: &MatchView, seat: Seat) -> Vec<PlayerAction> {
        let stack = view.stack(seat);
        match &view.detail {
            StageView::Yatzy(y) => {
                let Some(card) = y.card(seat) else {
                    return Vec::new();
                };
                if card.is_complete() {
                    return Vec::new();
                }
                let mut out = Vec::new();
                if card.rolls_used < MAX_ROLLS {
                    out.push(PlayerAction::YatzyRoll { hold: [false; 5] });
                    out.push(PlayerAction::YatzyRoll {
                        hold: [true, true, false, false, false],
                    });
                }
                if card.rolls_used > 0 {
                    out.extend(
                        card.open_categories()
                            .map(|category| PlayerAction::YatzyScore { category }),
                    );
                }
                out
            }
            StageView::Blackjack(bj) => match bj.phase {
                RoundPhase::Betting if !bj.finished_betting.contains(&seat) => {
                    let mut out = vec![PlayerAction::FinishBetting];
                    if let Some(spot) = bj.free_spot() {
                        if bj.exposure(seat) + MIN_WAGER <= stack {
                            out.push(PlayerAction::PlaceBet {
                                spot,
                                amount: MIN_WAGER,
                            });
                        }
                    }
                    out
                }
                RoundPhase::PlayerTurns => match bj.active_hand() {
                    Some(h) if h.seat == seat => vec![
                        PlayerAction::Hit {
                            spot: h.spot,
                            hand: h.index,
                        },
                        PlayerAction::Stand {
                            spot: h.spot,
                            hand: h.index,
                        },
                    ],
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            },
            StageView::RouletteInterlude(r) if r.phase == SpinPhase::Betting => {
                let acted = r.passed.contains(&seat) || r.wagers.iter().any(|w| w.seat == seat);
                let Some(cap) = r.cap(seat).filter(|_| !acted) else {
                    return Vec::new();
                };
                let mut out = vec![PlayerAction::RoulettePass];
                let amount = ROULETTE_TABLE_MIN.min(cap.remaining).min(stack);
                if amount > 0 {
                    for color in [RouletteColor::Red, RouletteColor::Black] {
                        out.push(PlayerAction::RouletteBet { color, amount });
                    }
                }
                out
            }
            StageView::Trivia(q) | StageView::MusicQuiz(q) => {
                let Some(question) = q.question.as_ref().filter(|_| !q.answered.contains(&seat))
                else {
                    return Vec::new();
                };
                let choices = question.choices.len().min(4) as u8;
                (0..choices)
                    .map(|choice| match q.kind {
                        QuizKind::Trivia => PlayerAction::SubmitAnswer {
                            question: question.index,
                            choice,
                        },
                        QuizKind::Music => PlayerAction::MusicGuess {
                            round: question.index,
                            choice,
                        },
                    })
                    .collect()
            }
            StageView::DiceHiLo(d) if d.phase == DicePhase::Calling => {
                let acted = d.passed.contains(&seat) || d.calls.iter().any(|c| c.seat == seat);
                if acted || !d.seats.contains(&seat) {
                    return Vec::new();
                }
                let mut out = vec![PlayerAction::DicePass { round: d.round }];
                if stack >= MIN_CALL {
                    for call in [HiLoCall::Higher, HiLoCall::Lower] {
                        out.push(PlayerAction::DiceCall {
                            round: d.round,
                            call,
                            amount: MIN_CALL,
                        });
                    }
                }
                out
            }
            StageView::Holdem(h) => {
                let Some(hand) = h.hand.as_ref().filter(|hand| hand.to_act == Some(seat)) else {
                    return Vec::new();
                };
                let Some(me) = hand.seat(seat) else {
                    return Vec::new();
                };
                if me.street_bet >= hand.current_bet {
                    vec![PlayerAction::HoldemCheck]
                } else {
                    vec![PlayerAction::HoldemCall, PlayerAction::HoldemFold]
                }
            }
            _ => Vec::new(),
        }
    }
}

impl BotStrategy for RandomBot {
    fn next_action(&self, view: &MatchView, seat: Seat) -> Option<PlayerAction> {
        let candidates = Self::candidates(view, seat);
        let mut rng = self.rng.lock();
        candidates.choose(&mut *rng).cloned()
    }
}
