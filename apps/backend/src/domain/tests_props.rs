//! Whole-match properties, driven by the house bot with a simulated clock.

use std::collections::HashMap;

use proptest::prelude::*;

use crate::ai::{BotStrategy, SputnikBot};
use crate::domain::actions::{Actor, Command, PlayerAction, SystemInput};
use crate::domain::events::{MatchEvent, MatchEventKind};
use crate::domain::match_state::MatchState;
use crate::domain::rules::MatchRules;
use crate::domain::stages::blackjack::RoundPhase;
use crate::domain::stages::roulette::RouletteEvent;
use crate::domain::stages::{StageState, StageSummary};
use crate::domain::types::{Chips, MatchMode, MatchStatus, Millis, Seat, Stage, UserId};
use crate::domain::view::MatchView;

const HOST: UserId = 42;
const MAX_STEPS: usize = 20_000;
/// An open-ended blackjack table runs until its last human walks away.
const HOST_LEAVES_AFTER_ROUND: u32 = 3;

struct Run {
    state: MatchState,
    events: Vec<MatchEvent>,
    /// `is_conserved` after every committed transition.
    conserved_throughout: bool,
}

fn next_command(state: &MatchState, bot: &SputnikBot) -> Option<Command> {
    let host_seat = state.seat_of(HOST)?;
    if let StageState::ReadyCheck(_) = state.stage {
        if state.player(host_seat).is_some_and(|p| !p.ready) {
            return Some(Command::Act {
                actor: Actor::User { user_id: HOST },
                action: PlayerAction::ConfirmReady,
                client_ts: None,
            });
        }
        return None;
    }
    if let StageState::Blackjack(bj) = &state.stage {
        let walk_away = bj.rounds_total.is_none()
            && bj.round >= HOST_LEAVES_AFTER_ROUND
            && bj.phase == RoundPhase::Betting
            && state.player(host_seat).is_some_and(|p| !p.left);
        if walk_away {
            return Some(Command::Act {
                actor: Actor::User { user_id: HOST },
                action: PlayerAction::Leave,
                client_ts: None,
            });
        }
    }
    state.stage.awaiting().into_iter().find_map(|seat: Seat| {
        let view = MatchView::for_viewer(state, Some(seat));
        let action = bot.next_action(&view, seat)?;
        let actor = if state.player(seat)?.is_automated() {
            Actor::Seat { seat }
        } else {
            Actor::User { user_id: HOST }
        };
        Some(Command::Act {
            actor,
            action,
            client_ts: None,
        })
    })
}

fn drive(mode: MatchMode, seed: u64, bot_seed: u64) -> Run {
    let bot = SputnikBot::new(Some(bot_seed));
    let mut now: Millis = 1_000;
    let created =
        MatchState::create(1, mode, MatchRules::for_mode(mode), seed, HOST, "host", now).unwrap();
    let mut state = created.state;
    let mut events = created.events;
    let mut conserved_throughout = state.is_conserved();

    let start = Command::Act {
        actor: Actor::User { user_id: HOST },
        action: PlayerAction::StartMatch,
        client_ts: None,
    };
    let t = state.handle(&start, now).unwrap();
    state = t.state;
    events.extend(t.events);

    for _ in 0..MAX_STEPS {
        if state.status.is_terminal() {
            break;
        }
        now += 25;
        let moved = next_command(&state, &bot)
            .and_then(|cmd| state.handle(&cmd, now).ok())
            .filter(|t| !t.is_empty());
        let t = match moved {
            Some(t) => t,
            None => {
                let deadline = state
                    .next_deadline()
                    .expect("a running match waiting on nobody must have a deadline");
                now = now.max(deadline);
                state
                    .handle(&Command::System(SystemInput::Timeout), now)
                    .unwrap()
            }
        };
        state = t.state;
        events.extend(t.events);
        conserved_throughout &= state.is_conserved();
    }

    Run {
        state,
        events,
        conserved_throughout,
    }
}

fn mode_strategy() -> impl Strategy<Value = MatchMode> {
    prop_oneof![
        Just(MatchMode::FiveKamp),
        Just(MatchMode::ChickenRun),
        Just(MatchMode::BlackjackOnly),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn same_seed_same_match(mode in mode_strategy(), seed in any::<u64>(), bot_seed in any::<u64>()) {
        let a = drive(mode, seed, bot_seed);
        let b = drive(mode, seed, bot_seed);
        prop_assert_eq!(&a.events, &b.events);
        prop_assert_eq!(&a.state, &b.state);
    }

    #[test]
    fn matches_finish_with_chips_conserved(mode in mode_strategy(), seed in any::<u64>()) {
        let run = drive(mode, seed, seed.rotate_left(17));
        prop_assert_eq!(run.state.status, MatchStatus::Completed);
        prop_assert!(run.conserved_throughout);
        let completed = matches!(
            run.events.last().map(|e| &e.kind),
            Some(MatchEventKind::MatchCompleted { .. })
        );
        prop_assert!(completed);
    }

    #[test]
    fn seqs_are_dense_and_stages_only_move_forward(mode in mode_strategy(), seed in any::<u64>()) {
        let run = drive(mode, seed, 7);
        for (i, event) in run.events.iter().enumerate() {
            prop_assert_eq!(event.seq, i as i64 + 1);
        }
        let started: Vec<Stage> = run
            .events
            .iter()
            .filter_map(|e| match e.kind {
                MatchEventKind::StageStarted { stage } => Some(stage),
                _ => None,
            })
            .collect();
        prop_assert!(started.windows(2).all(|w| w[0] < w[1]), "stages: {:?}", started);
        prop_assert!(run.events.windows(2).all(|w| w[0].server_ts <= w[1].server_ts));
    }

    #[test]
    fn replaying_the_log_rebuilds_the_final_state(mode in mode_strategy(), seed in any::<u64>()) {
        let run = drive(mode, seed, 11);
        let replayed = MatchState::replay(MatchState::empty(1), &run.events).unwrap();
        prop_assert_eq!(replayed, run.state);
    }

    #[test]
    fn roulette_never_exceeds_blackjack_profit(seed in any::<u64>()) {
        let run = drive(MatchMode::FiveKamp, seed, seed ^ 0x5eed);
        let mut caps: HashMap<Seat, Chips> = HashMap::new();
        let mut wagered: HashMap<Seat, Chips> = HashMap::new();
        for event in &run.events {
            match &event.kind {
                MatchEventKind::StageCompleted {
                    summary: StageSummary::Blackjack { results },
                    ..
                } => {
                    for r in results {
                        caps.insert(r.seat, (r.bj_end - r.bj_start).max(0));
                    }
                }
                MatchEventKind::Roulette(RouletteEvent::WagerPlaced { seat, amount, .. }) => {
                    *wagered.entry(*seat).or_default() += amount;
                }
                _ => {}
            }
        }
        for (seat, total) in wagered {
            let cap = caps.get(&seat).copied().unwrap_or(0);
            prop_assert!(total <= cap, "seat {} wagered {} over cap {}", seat, total, cap);
        }
    }
}
