//! Authoritative match state machine.
//!
//! `handle` is pure: it works on a clone, appends every produced event through
//! `apply`, and returns the new state with the events and ledger entries to
//! persist. Replaying those events with `apply` on the previous state yields
//! exactly the returned state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::actions::{Actor, Command, PlayerAction, SystemInput};
use crate::domain::events::{MatchEvent, MatchEventKind};
use crate::domain::ledger::{self, LedgerEntry};
use crate::domain::player::MatchPlayer;
use crate::domain::rules::{secs_to_millis, MatchRules};
use crate::domain::stages::blackjack::{BlackjackResult, BlackjackState};
use crate::domain::stages::dice_hilo::DiceHiLoState;
use crate::domain::stages::holdem::HoldemState;
use crate::domain::stages::quiz::{QuizKind, QuizState};
use crate::domain::stages::roulette::RouletteState;
use crate::domain::stages::yatzy::YatzyState;
use crate::domain::stages::{ReadyCheckState, SeatAmount, StageCtx, StageState, StageSummary};
use crate::domain::types::{MatchMode, MatchStatus, Millis, Seat, Stage, UserId};
use crate::errors::domain::{
    ConflictKind, DomainError, IllegalKind, InfraErrorKind, NotFoundKind,
};

/// Upper bound on automatic progression steps per command.
const MAX_ITERATIONS: usize = 512;

pub const BOT_NAME_PREFIX: &str = "Sputnik";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub match_id: i64,
    pub mode: MatchMode,
    pub status: MatchStatus,
    pub rules: MatchRules,
    pub seed: u64,
    pub host_user_id: UserId,
    pub players: Vec<MatchPlayer>,
    pub stage: StageState,
    /// Blackjack outcome, kept for the roulette cap.
    pub bj_results: Vec<BlackjackResult>,
    pub last_seq: i64,
    pub last_ts: Millis,
}

/// Result of handling one command.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: MatchState,
    pub events: Vec<MatchEvent>,
    pub ledger: Vec<LedgerEntry>,
}

impl Transition {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn crosses_stage(&self) -> bool {
        self.events.iter().any(|e| e.kind.is_stage_boundary())
    }
}

/// Accumulates events produced while handling one command.
struct Pending {
    state: MatchState,
    events: Vec<MatchEvent>,
    ledger: Vec<LedgerEntry>,
    now: Millis,
    client_ts: Option<Millis>,
}

impl Pending {
    fn new(state: MatchState, now: Millis, client_ts: Option<Millis>) -> Self {
        // Server time never runs backwards within a match.
        let now = now.max(state.last_ts);
        Self {
            state,
            events: Vec::new(),
            ledger: Vec::new(),
            now,
            client_ts,
        }
    }

    fn push(&mut self, kind: MatchEventKind) -> Result<(), DomainError> {
        let event = MatchEvent {
            match_id: self.state.match_id,
            seq: self.state.last_seq + 1,
            server_ts: self.now,
            // Only the event the client caused carries its timestamp.
            client_ts: if self.events.is_empty() {
                self.client_ts
            } else {
                None
            },
            kind,
        };
        let entries = self.state.apply(&event)?;
        self.events.push(event);
        self.ledger.extend(entries);
        Ok(())
    }

    fn push_all(&mut self, kinds: Vec<MatchEventKind>) -> Result<(), DomainError> {
        kinds.into_iter().try_for_each(|k| self.push(k))
    }

    fn finish(self) -> Transition {
        Transition {
            state: self.state,
            events: self.events,
            ledger: self.ledger,
        }
    }
}

impl MatchState {
    /// State before `MatchCreated`.
    pub fn empty(match_id: i64) -> Self {
        Self {
            match_id,
            mode: MatchMode::FiveKamp,
            status: MatchStatus::Created,
            rules: MatchRules::default(),
            seed: 0,
            host_user_id: 0,
            players: Vec::new(),
            stage: StageState::Lobby,
            bj_results: Vec::new(),
            last_seq: 0,
            last_ts: 0,
        }
    }

    /// Opens a lobby and seats the host.
    pub fn create(
        match_id: i64,
        mode: MatchMode,
        rules: MatchRules,
        seed: u64,
        host_user_id: UserId,
        host_name: &str,
        now: Millis,
    ) -> Result<Transition, DomainError> {
        PlayerAction::Join {
            display_name: host_name.to_string(),
        }
        .validate()?;
        rules.validate()?;
        let initial_stack = rules.buy_in;
        let mut pending = Pending::new(Self::empty(match_id), now, None);
        pending.push(MatchEventKind::MatchCreated {
            mode,
            rules,
            seed,
            host_user_id,
        })?;
        pending.push(MatchEventKind::PlayerJoined {
            seat: 0,
            user_id: Some(host_user_id),
            display_name: host_name.trim().to_string(),
            is_bot: false,
            initial_stack,
        })?;
        Ok(pending.finish())
    }

    /// Replays `events` on top of `base`.
    pub fn replay(base: MatchState, events: &[MatchEvent]) -> Result<MatchState, DomainError> {
        let mut state = base;
        for event in events {
            state.apply(event)?;
        }
        Ok(state)
    }

    pub fn current_stage(&self) -> Stage {
        self.stage.stage()
    }

    pub fn player(&self, seat: Seat) -> Option<&MatchPlayer> {
        self.players.iter().find(|p| p.seat == seat)
    }

    pub fn seat_of(&self, user_id: UserId) -> Option<Seat> {
        self.players
            .iter()
            .find(|p| p.user_id == Some(user_id))
            .map(|p| p.seat)
    }

    fn player_mut(&mut self, seat: Seat) -> Option<&mut MatchPlayer> {
        self.players.iter_mut().find(|p| p.seat == seat)
    }

    /// When the runtime should synthesize a `Timeout`.
    pub fn next_deadline(&self) -> Option<Millis> {
        if self.status.is_terminal() {
            return None;
        }
        self.stage.deadline()
    }

    /// Seats owed a decision whose moves come from a bot strategy.
    pub fn automated_awaiting(&self) -> Vec<Seat> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        self.stage
            .awaiting()
            .into_iter()
            .filter(|s| self.player(*s).is_some_and(MatchPlayer::is_automated))
            .collect()
    }

    /// `initial + Σ delta == stack` for every seat.
    pub fn is_conserved(&self) -> bool {
        self.players.iter().all(MatchPlayer::is_conserved)
    }

    pub fn handle(&self, cmd: &Command, now: Millis) -> Result<Transition, DomainError> {
        let presence = matches!(
            cmd,
            Command::System(SystemInput::Connected { .. } | SystemInput::Disconnected { .. })
        );
        if self.status.is_terminal() {
            if presence {
                return Ok(Pending::new(self.clone(), now, None).finish());
            }
            return Err(DomainError::not_running(format!(
                "match {} is {}",
                self.match_id, self.status
            )));
        }

        let client_ts = match cmd {
            Command::Act { client_ts, .. } => *client_ts,
            Command::System(_) => None,
        };
        let mut pending = Pending::new(self.clone(), now, client_ts);
        match cmd {
            Command::Act { actor, action, .. } => {
                action.validate()?;
                Self::act(&mut pending, *actor, action)?;
            }
            Command::System(SystemInput::Timeout) => Self::timeout(&mut pending)?,
            Command::System(SystemInput::Connected { user_id }) => {
                let seat = Self::require_user_seat(&pending.state, *user_id)?;
                if let Some(p) = pending.state.player(seat) {
                    let (connected, autopilot, left) = (p.is_connected, p.autopilot, p.left);
                    if !connected {
                        pending.push(MatchEventKind::PlayerConnected { seat })?;
                    }
                    if autopilot && !left {
                        pending.push(MatchEventKind::AutopilotReleased { seat })?;
                    }
                }
            }
            Command::System(SystemInput::Disconnected { user_id }) => {
                let seat = Self::require_user_seat(&pending.state, *user_id)?;
                if pending.state.player(seat).is_some_and(|p| p.is_connected) {
                    pending.push(MatchEventKind::PlayerDisconnected { seat })?;
                }
            }
        }
        Self::progress(&mut pending)?;
        Ok(pending.finish())
    }

    fn require_user_seat(state: &MatchState, user_id: UserId) -> Result<Seat, DomainError> {
        state.seat_of(user_id).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Player,
                format!("user {user_id} is not in match {}", state.match_id),
            )
        })
    }

    fn act(pending: &mut Pending, actor: Actor, action: &PlayerAction) -> Result<(), DomainError> {
        let state = &pending.state;
        match action {
            PlayerAction::Join { display_name } => {
                let Actor::User { user_id } = actor else {
                    return Err(DomainError::illegal(IllegalKind::NotSeated, "only users join"));
                };
                if state.current_stage() != Stage::Lobby {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongStage,
                        "the lobby is closed",
                    ));
                }
                if state.seat_of(user_id).is_some() {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadyJoined,
                        format!("user {user_id} already has a seat"),
                    ));
                }
                let seat = state.free_seat()?;
                let initial_stack = state.rules.buy_in;
                pending.push(MatchEventKind::PlayerJoined {
                    seat,
                    user_id: Some(user_id),
                    display_name: display_name.trim().to_string(),
                    is_bot: false,
                    initial_stack,
                })
            }
            PlayerAction::Cancel => {
                let allowed = match actor {
                    Actor::Operator => true,
                    Actor::User { user_id } => user_id == state.host_user_id,
                    Actor::Seat { .. } => false,
                };
                if !allowed {
                    return Err(DomainError::illegal(
                        IllegalKind::NotHost,
                        "only the host or an operator may cancel",
                    ));
                }
                let reason = match actor {
                    Actor::Operator => "cancelled by operator",
                    _ => "cancelled by host",
                };
                pending.push(MatchEventKind::MatchCancelled {
                    reason: reason.to_string(),
                })
            }
            _ => {
                let seat = state.acting_seat(actor)?;
                Self::act_seated(pending, actor, seat, action)
            }
        }
    }

    fn act_seated(
        pending: &mut Pending,
        actor: Actor,
        seat: Seat,
        action: &PlayerAction,
    ) -> Result<(), DomainError> {
        let state = &pending.state;
        match action {
            PlayerAction::Leave => pending.push(MatchEventKind::PlayerLeft { seat }),
            PlayerAction::StartMatch => {
                if !matches!(actor, Actor::User { user_id } if user_id == state.host_user_id) {
                    return Err(DomainError::illegal(
                        IllegalKind::NotHost,
                        "only the host may start the match",
                    ));
                }
                if state.current_stage() != Stage::Lobby {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongStage,
                        "the match has already started",
                    ));
                }
                let seated = state.players.iter().filter(|p| !p.left).count();
                let missing = (state.rules.min_players as usize).saturating_sub(seated);
                for n in 0..missing {
                    let seat = pending.state.free_seat()?;
                    let initial_stack = pending.state.rules.buy_in;
                    pending.push(MatchEventKind::PlayerJoined {
                        seat,
                        user_id: None,
                        display_name: format!("{BOT_NAME_PREFIX} {}", n + 1),
                        is_bot: true,
                        initial_stack,
                    })?;
                }
                Self::complete_stage(pending, StageSummary::Lobby)
            }
            PlayerAction::ConfirmReady => {
                if state.current_stage() != Stage::ReadyCheck {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongStage,
                        format!("ready check is not open during {}", state.current_stage()),
                    ));
                }
                if state.player(seat).is_some_and(|p| p.ready) {
                    return Err(DomainError::illegal(
                        IllegalKind::AlreadyActed,
                        format!("seat {seat} is already ready"),
                    ));
                }
                pending.push(MatchEventKind::ReadyConfirmed { seat })
            }
            _ => {
                if action.stage() != Some(state.current_stage()) {
                    return Err(DomainError::illegal(
                        IllegalKind::WrongStage,
                        format!(
                            "{} is not accepted during {}",
                            action.name(),
                            state.current_stage()
                        ),
                    ));
                }
                let events = state.stage.decide(&state.ctx(pending.now), seat, action)?;
                pending.push_all(events)
            }
        }
    }

    /// Seat the actor may act for.
    fn acting_seat(&self, actor: Actor) -> Result<Seat, DomainError> {
        match actor {
            Actor::User { user_id } => {
                let seat = self.seat_of(user_id).ok_or_else(|| {
                    DomainError::illegal(
                        IllegalKind::NotSeated,
                        format!("user {user_id} has no seat in match {}", self.match_id),
                    )
                })?;
                if self.player(seat).is_some_and(|p| p.left) {
                    return Err(DomainError::illegal(
                        IllegalKind::NotSeated,
                        format!("seat {seat} has left"),
                    ));
                }
                Ok(seat)
            }
            Actor::Seat { seat } => match self.player(seat) {
                Some(p) if p.is_automated() => Ok(seat),
                _ => Err(DomainError::illegal(
                    IllegalKind::NotSeated,
                    format!("seat {seat} is not automated"),
                )),
            },
            Actor::Operator => Err(DomainError::illegal(
                IllegalKind::NotSeated,
                "operators do not hold a seat",
            )),
        }
    }

    fn free_seat(&self) -> Result<Seat, DomainError> {
        (0..self.rules.max_seats)
            .find(|s| self.player(*s).is_none())
            .ok_or_else(|| {
                DomainError::conflict(
                    ConflictKind::MatchFull,
                    format!("match {} has no free seat", self.match_id),
                )
            })
    }

    fn ctx(&self, now: Millis) -> StageCtx<'_> {
        StageCtx {
            now,
            match_seed: self.seed,
            seq: self.last_seq + 1,
            rules: &self.rules,
            players: &self.players,
        }
    }

    fn timeout(pending: &mut Pending) -> Result<(), DomainError> {
        let state = &pending.state;
        match state.stage.deadline() {
            Some(deadline) if deadline <= pending.now => {}
            _ => return Ok(()),
        }
        let substitute = state.rules.bot_substitution;
        if let StageState::ReadyCheck(_) = state.stage {
            let absent: Vec<Seat> = state
                .players
                .iter()
                .filter(|p| p.is_human() && !p.left && !p.ready)
                .map(|p| p.seat)
                .collect();
            let disconnected: Vec<Seat> = state
                .players
                .iter()
                .filter(|p| absent.contains(&p.seat) && !p.is_connected && !p.autopilot)
                .map(|p| p.seat)
                .collect();
            if substitute {
                for seat in disconnected {
                    pending.push(MatchEventKind::BotSubstituted { seat })?;
                }
            }
            return Self::complete_stage(pending, StageSummary::ReadyCheck { absent });
        }

        if substitute {
            let stalled: Vec<Seat> = state
                .stage
                .awaiting()
                .into_iter()
                .filter(|s| {
                    state
                        .player(*s)
                        .is_some_and(|p| p.is_human() && !p.is_connected && !p.autopilot)
                })
                .collect();
            for seat in stalled {
                pending.push(MatchEventKind::BotSubstituted { seat })?;
            }
        }
        let defaults = pending.state.stage.expire(&pending.state.ctx(pending.now));
        pending.push_all(defaults)
    }

    /// Runs automatic progression until the match waits on input.
    fn progress(pending: &mut Pending) -> Result<(), DomainError> {
        for _ in 0..MAX_ITERATIONS {
            let state = &pending.state;
            if state.status.is_terminal() {
                return Ok(());
            }
            match &state.stage {
                StageState::Lobby | StageState::Completed | StageState::Cancelled => return Ok(()),
                StageState::ReadyCheck(_) => {
                    let all_ready = state
                        .players
                        .iter()
                        .filter(|p| p.is_human() && !p.left)
                        .all(|p| p.ready);
                    if !all_ready {
                        return Ok(());
                    }
                    Self::complete_stage(pending, StageSummary::ReadyCheck { absent: Vec::new() })?;
                }
                stage => {
                    if let Some(summary) = stage.summary() {
                        Self::complete_stage(pending, summary)?;
                        continue;
                    }
                    let events = stage.advance(&state.ctx(pending.now));
                    if events.is_empty() {
                        return Ok(());
                    }
                    pending.push_all(events)?;
                }
            }
        }
        Err(DomainError::infra(
            InfraErrorKind::Other("progress".into()),
            format!(
                "match {} did not settle after {MAX_ITERATIONS} steps",
                pending.state.match_id
            ),
        ))
    }

    /// `StageCompleted` followed immediately by the next `StageStarted` or
    /// `MatchCompleted`.
    fn complete_stage(pending: &mut Pending, summary: StageSummary) -> Result<(), DomainError> {
        let stage = pending.state.current_stage();
        pending.push(MatchEventKind::StageCompleted { stage, summary })?;
        match stage.next(pending.state.mode) {
            Some(Stage::Completed) | None => {
                let final_stacks = pending
                    .state
                    .players
                    .iter()
                    .map(|p| SeatAmount {
                        seat: p.seat,
                        amount: p.stack,
                    })
                    .collect();
                pending.push(MatchEventKind::MatchCompleted { final_stacks })
            }
            Some(next) => pending.push(MatchEventKind::StageStarted { stage: next }),
        }
    }

    /// Folds one event into the state and returns the ledger entries it caused.
    pub fn apply(&mut self, event: &MatchEvent) -> Result<Vec<LedgerEntry>, DomainError> {
        if event.seq != self.last_seq + 1 {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!(
                    "match {} expected seq {}, got {}",
                    self.match_id,
                    self.last_seq + 1,
                    event.seq
                ),
            ));
        }
        let ts = event.server_ts;
        let entries = ledger::entries_for(event, self.current_stage(), &self.players);
        for entry in &entries {
            let p = self.player_mut(entry.seat).ok_or_else(|| {
                DomainError::infra(
                    InfraErrorKind::DataCorruption,
                    format!("ledger entry for unknown seat {}", entry.seat),
                )
            })?;
            p.stack = ledger::apply(p.stack, entry);
            p.ledger_total += entry.delta;
        }

        match &event.kind {
            MatchEventKind::MatchCreated {
                mode,
                rules,
                seed,
                host_user_id,
            } => {
                rules.validate().map_err(|e| {
                    DomainError::infra(
                        InfraErrorKind::DataCorruption,
                        format!("match {} was created with invalid rules: {e}", self.match_id),
                    )
                })?;
                self.mode = *mode;
                self.rules = rules.clone();
                self.seed = *seed;
                self.host_user_id = *host_user_id;
                self.status = MatchStatus::Created;
            }
            MatchEventKind::PlayerJoined {
                seat,
                user_id,
                display_name,
                is_bot,
                initial_stack,
            } => self.players.push(MatchPlayer {
                seat: *seat,
                user_id: *user_id,
                display_name: display_name.clone(),
                is_bot: *is_bot,
                is_connected: !*is_bot,
                autopilot: false,
                ready: false,
                left: false,
                initial_stack: *initial_stack,
                stack: *initial_stack,
                ledger_total: 0,
            }),
            MatchEventKind::PlayerLeft { seat } => self.update_player(*seat, |p| p.left = true)?,
            MatchEventKind::PlayerConnected { seat } => {
                self.update_player(*seat, |p| p.is_connected = true)?
            }
            MatchEventKind::PlayerDisconnected { seat } => {
                self.update_player(*seat, |p| p.is_connected = false)?
            }
            MatchEventKind::BotSubstituted { seat } => {
                self.update_player(*seat, |p| p.autopilot = true)?
            }
            MatchEventKind::AutopilotReleased { seat } => {
                self.update_player(*seat, |p| p.autopilot = false)?
            }
            MatchEventKind::ReadyConfirmed { seat } => self.update_player(*seat, |p| p.ready = true)?,
            MatchEventKind::StageStarted { stage } => {
                if *stage <= self.current_stage() {
                    return Err(DomainError::infra(
                        InfraErrorKind::DataCorruption,
                        format!("stage regressed from {} to {stage}", self.current_stage()),
                    ));
                }
                self.stage = self.open_stage(*stage, ts);
                self.status = MatchStatus::Running;
            }
            MatchEventKind::StageCompleted { stage, summary } => {
                if *stage != self.current_stage() {
                    return Err(DomainError::infra(
                        InfraErrorKind::DataCorruption,
                        format!("{stage} completed while in {}", self.current_stage()),
                    ));
                }
                if let StageSummary::Blackjack { results } = summary {
                    self.bj_results = results.clone();
                }
            }
            MatchEventKind::MatchCompleted { .. } => {
                self.stage = StageState::Completed;
                self.status = MatchStatus::Completed;
            }
            MatchEventKind::MatchCancelled { .. } => {
                self.stage = StageState::Cancelled;
                self.status = MatchStatus::Cancelled;
            }
            MatchEventKind::StackCorrected { .. } => {}
            stage_event => {
                if !self.stage.apply_event(stage_event, ts)? {
                    return Err(DomainError::infra(
                        InfraErrorKind::DataCorruption,
                        format!(
                            "{} does not belong to {}",
                            stage_event.event_type(),
                            self.current_stage()
                        ),
                    ));
                }
            }
        }

        self.last_seq = event.seq;
        self.last_ts = ts;
        debug!(
            match_id = self.match_id,
            seq = event.seq,
            event_type = event.event_type(),
            "event applied"
        );
        Ok(entries)
    }

    fn update_player(
        &mut self,
        seat: Seat,
        f: impl FnOnce(&mut MatchPlayer),
    ) -> Result<(), DomainError> {
        let p = self.player_mut(seat).ok_or_else(|| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("event for unknown seat {seat}"),
            )
        })?;
        f(p);
        Ok(())
    }

    /// Fresh sub-state for `stage`, built only from state already applied.
    fn open_stage(&self, stage: Stage, ts: Millis) -> StageState {
        let seats: Vec<Seat> = self
            .players
            .iter()
            .filter(|p| !p.left)
            .map(|p| p.seat)
            .collect();
        let stacks: Vec<SeatAmount> = self
            .players
            .iter()
            .filter(|p| !p.left)
            .map(|p| SeatAmount {
                seat: p.seat,
                amount: p.stack,
            })
            .collect();
        let rules = &self.rules;
        match stage {
            Stage::Lobby => StageState::Lobby,
            Stage::ReadyCheck => StageState::ReadyCheck(ReadyCheckState {
                deadline: ts + secs_to_millis(rules.ready_check_secs),
            }),
            Stage::Yatzy => StageState::Yatzy(YatzyState::open(&seats, rules, ts)),
            Stage::Blackjack => StageState::Blackjack(BlackjackState::open(stacks, rules)),
            Stage::RouletteInterlude => {
                StageState::RouletteInterlude(RouletteState::open(&self.bj_results, &seats, rules))
            }
            Stage::Trivia => StageState::Trivia(QuizState::open(QuizKind::Trivia, &seats, rules)),
            Stage::DiceHiLo => StageState::DiceHiLo(DiceHiLoState::open(&seats, rules)),
            Stage::MusicQuiz => {
                StageState::MusicQuiz(QuizState::open(QuizKind::Music, &seats, rules))
            }
            Stage::Holdem => StageState::Holdem(HoldemState::open(&stacks, rules)),
            Stage::Completed => StageState::Completed,
            Stage::Cancelled => StageState::Cancelled,
        }
    }
}
