//! Live match actors.
//!
//! Each running match is owned by exactly one `MatchActor`; the
//! `MatchRegistry` finds or lazily starts it. Everything else talks to a
//! match through its `MatchHandle`.

pub mod clock;
pub mod match_actor;
pub mod registry;

use std::sync::Arc;

use crate::domain::events::MatchEvent;
use crate::domain::match_state::MatchState;

pub use match_actor::{Accepted, ActorDeps, MatchActor, MatchHandle};
pub use registry::MatchRegistry;

/// Notified after every committed, non-empty transition.
pub trait MatchObserver: Send + Sync {
    fn on_commit(&self, state: &Arc<MatchState>, events: &[MatchEvent]);
}

/// Observer for contexts without connected clients (CLI, tests).
pub struct NoopObserver;

impl MatchObserver for NoopObserver {
    fn on_commit(&self, _state: &Arc<MatchState>, _events: &[MatchEvent]) {}
}
