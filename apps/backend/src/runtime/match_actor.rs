//! Single writer for one match.
//!
//! Commands arrive on a bounded inbox and are handled strictly one at a time:
//! reduce, commit in one transaction, swap the in-memory state, broadcast,
//! reply. Deadlines and bot turns are driven from the same loop so they can
//! never race a player's command.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::clock::{instant_for, now_millis};
use super::MatchObserver;
use crate::ai::BotStrategy;
use crate::db::txn::with_txn;
use crate::domain::actions::{Actor, Command, SystemInput};
use crate::domain::events::MatchEvent;
use crate::domain::match_state::{MatchState, Transition};
use crate::domain::types::Seat;
use crate::domain::view::MatchView;
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use crate::repos::matches;
use crate::services::match_flow::MatchFlowService;
use crate::services::snapshots;

/// Upper bound on bot actions handled in one pass before yielding to the inbox.
pub const MAX_BOT_ACTIONS_PER_PASS: usize = 64;

/// Pause after a deadline fired but the reducer had nothing to do.
const IDLE_TIMEOUT_BACKOFF: Duration = Duration::from_secs(1);

/// What a successful submission produced.
#[derive(Debug, Clone)]
pub struct Accepted {
    /// Seq of the first new event, or the current seq when nothing changed.
    pub first_seq: i64,
    pub last_seq: i64,
    pub events: Vec<MatchEvent>,
    pub state: Arc<MatchState>,
}

pub(crate) enum ActorMsg {
    Submit {
        command: Command,
        reply: oneshot::Sender<Result<Accepted, DomainError>>,
    },
}

/// Everything an actor needs besides its state.
#[derive(Clone)]
pub struct ActorDeps {
    pub db: DatabaseConnection,
    pub flow: MatchFlowService,
    pub observer: Arc<dyn MatchObserver>,
    pub bots: Arc<dyn BotStrategy>,
    pub bot_think: Duration,
    pub queue_capacity: usize,
}

/// Cheap, cloneable address of a running actor.
#[derive(Clone)]
pub struct MatchHandle {
    match_id: i64,
    tx: mpsc::Sender<ActorMsg>,
    state_rx: watch::Receiver<Arc<MatchState>>,
    cancel: CancellationToken,
}

impl MatchHandle {
    pub fn match_id(&self) -> i64 {
        self.match_id
    }

    /// Enqueue `command` and wait for its outcome.
    ///
    /// Fails fast with `Busy` when the inbox is full instead of waiting.
    pub async fn submit(&self, command: Command) -> Result<Accepted, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .try_send(ActorMsg::Submit { command, reply })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => {
                    warn!(match_id = self.match_id, "match queue full");
                    DomainError::busy(self.match_id)
                }
                mpsc::error::TrySendError::Closed(_) => stopped(self.match_id),
            })?;
        rx.await.map_err(|_| stopped(self.match_id))?
    }

    /// Latest committed state.
    pub fn state(&self) -> Arc<MatchState> {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MatchState>> {
        self.state_rx.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

fn stopped(match_id: i64) -> DomainError {
    DomainError::infra(
        InfraErrorKind::Other("ActorStopped".into()),
        format!("match {match_id} actor has stopped"),
    )
}

pub struct MatchActor {
    state: Arc<MatchState>,
    deps: ActorDeps,
    state_tx: watch::Sender<Arc<MatchState>>,
    degraded: bool,
    idle_until: Option<Instant>,
    bot_due: Option<Instant>,
}

impl MatchActor {
    /// Start an actor for an already-loaded state.
    pub fn spawn(state: MatchState, deps: ActorDeps, parent: &CancellationToken) -> MatchHandle {
        let match_id = state.match_id;
        let state = Arc::new(state);
        let (tx, rx) = mpsc::channel(deps.queue_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(Arc::clone(&state));
        let cancel = parent.child_token();

        let mut actor = MatchActor {
            state,
            deps,
            state_tx,
            degraded: false,
            idle_until: None,
            bot_due: None,
        };
        actor.arm_bots();

        let token = cancel.clone();
        tokio::spawn(async move {
            actor.run(rx, token).await;
        });

        MatchHandle {
            match_id,
            tx,
            state_rx,
            cancel,
        }
    }

    async fn run(&mut self, mut rx: mpsc::Receiver<ActorMsg>, cancel: CancellationToken) {
        let match_id = self.state.match_id;
        info!(match_id, seq = self.state.last_seq, "match actor started");
        loop {
            let deadline = self.deadline_instant();
            let bot_due = self.bot_due;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some(ActorMsg::Submit { command, reply }) => {
                        let outcome = self.execute(command).await;
                        if outcome.as_ref().is_ok_and(|a| !a.events.is_empty()) {
                            self.arm_bots();
                        }
                        // The submitter may have given up; the command still counts.
                        let _ = reply.send(outcome);
                    }
                    None => break,
                },
                _ = sleep_until(deadline) => self.on_deadline().await,
                _ = sleep_until(bot_due) => self.drive_bots().await,
            }
        }
        info!(match_id, seq = self.state.last_seq, "match actor stopped");
    }

    fn deadline_instant(&self) -> Option<Instant> {
        let deadline = self.state.next_deadline()?;
        let at = instant_for(deadline, now_millis());
        Some(match self.idle_until {
            Some(idle) if idle > at => idle,
            _ => at,
        })
    }

    fn arm_bots(&mut self) {
        self.bot_due = if self.state.automated_awaiting().is_empty() {
            None
        } else {
            Some(Instant::now() + self.deps.bot_think)
        };
    }

    async fn on_deadline(&mut self) {
        let match_id = self.state.match_id;
        match self.execute(Command::System(SystemInput::Timeout)).await {
            Ok(accepted) if accepted.events.is_empty() => {
                self.idle_until = Some(Instant::now() + IDLE_TIMEOUT_BACKOFF);
            }
            Ok(accepted) => {
                self.idle_until = None;
                debug!(match_id, seq = accepted.last_seq, "deadline handled");
                self.arm_bots();
            }
            Err(err) => {
                warn!(match_id, error = %err, "deadline handling failed");
                self.idle_until = Some(Instant::now() + IDLE_TIMEOUT_BACKOFF);
            }
        }
    }

    /// Let every automated seat that is owed a decision act, through the
    /// same path as a human submission.
    async fn drive_bots(&mut self) {
        self.bot_due = None;
        let match_id = self.state.match_id;
        let mut stuck: Vec<Seat> = Vec::new();
        let mut accepted = 0usize;
        let mut hit_cap = true;

        for _ in 0..MAX_BOT_ACTIONS_PER_PASS {
            let next = self
                .state
                .automated_awaiting()
                .into_iter()
                .filter(|seat| !stuck.contains(seat))
                .find_map(|seat| {
                    let view = MatchView::for_viewer(&self.state, Some(seat));
                    self.deps.bots.next_action(&view, seat).map(|a| (seat, a))
                });
            let Some((seat, action)) = next else {
                hit_cap = false;
                break;
            };
            let name = action.name();
            let command = Command::Act {
                actor: Actor::Seat { seat },
                action,
                client_ts: None,
            };
            match self.execute(command).await {
                Ok(_) => accepted += 1,
                Err(err) => {
                    warn!(match_id, seat, action = name, error = %err, "bot action rejected");
                    if matches!(err, DomainError::Infra(..)) {
                        hit_cap = false;
                        break;
                    }
                    stuck.push(seat);
                }
            }
        }

        debug!(match_id, accepted, "bot pass finished");
        if hit_cap {
            self.arm_bots();
        }
    }

    /// Reduce, persist, publish. The in-memory state only moves once the
    /// transaction has committed.
    async fn execute(&mut self, command: Command) -> Result<Accepted, DomainError> {
        if self.degraded {
            self.recover().await?;
        }
        let match_id = self.state.match_id;
        let transition = match self.state.handle(&command, now_millis()) {
            Ok(t) => t,
            Err(err) => {
                warn!(match_id, command = command.name(), error = %err, "command rejected");
                return Err(err);
            }
        };
        if transition.is_empty() {
            return Ok(Accepted {
                first_seq: self.state.last_seq,
                last_seq: self.state.last_seq,
                events: Vec::new(),
                state: Arc::clone(&self.state),
            });
        }

        let transition = self.persist(transition).await?;
        let first_seq = transition.events.first().map_or(0, |e| e.seq);
        let state = Arc::new(transition.state);
        self.state = Arc::clone(&state);
        self.state_tx.send_replace(Arc::clone(&state));

        for event in &transition.events {
            info!(
                match_id,
                seq = event.seq,
                stage = %state.current_stage(),
                event_type = event.event_type(),
                "event accepted"
            );
        }
        self.deps.observer.on_commit(&state, &transition.events);

        Ok(Accepted {
            first_seq,
            last_seq: state.last_seq,
            events: transition.events,
            state,
        })
    }

    async fn persist(&mut self, transition: Transition) -> Result<Transition, DomainError> {
        let match_id = self.state.match_id;
        let prev_seq = self.state.last_seq;
        let flow = self.deps.flow.clone();
        let result = with_txn(&self.deps.db, move |txn| {
            Box::pin(async move {
                flow.commit(txn, prev_seq, &transition).await?;
                Ok::<_, DomainError>(transition)
            })
        })
        .await;

        match result {
            Ok(transition) => Ok(transition),
            Err(err) => {
                error!(match_id, seq = prev_seq, error = %err, "commit failed; match degraded");
                self.degraded = true;
                if let Err(flag_err) = matches::set_degraded(&self.deps.db, match_id, true).await {
                    warn!(match_id, error = %flag_err, "could not flag match as degraded");
                }
                Err(match err {
                    DomainError::Conflict(ConflictKind::OutOfOrder, _) => err,
                    other => DomainError::infra(
                        InfraErrorKind::PersistenceFailure,
                        format!("could not persist match {match_id}: {other}"),
                    ),
                })
            }
        }
    }

    async fn recover(&mut self) -> Result<(), DomainError> {
        let match_id = self.state.match_id;
        match snapshots::rehydrate(&self.deps.db, match_id).await {
            Ok(state) => {
                info!(match_id, seq = state.last_seq, "match recovered from storage");
                let state = Arc::new(state);
                self.state = Arc::clone(&state);
                self.state_tx.send_replace(state);
                self.degraded = false;
                if let Err(err) = matches::set_degraded(&self.deps.db, match_id, false).await {
                    warn!(match_id, error = %err, "could not clear degraded flag");
                }
                Ok(())
            }
            Err(err) => {
                error!(match_id, error = %err, "match still degraded");
                Err(DomainError::infra(
                    InfraErrorKind::Degraded,
                    format!("match {match_id} is degraded; retry later"),
                ))
            }
        }
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
