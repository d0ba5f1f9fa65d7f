use std::collections::BTreeMap;
use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::protocol::{commit_messages, ServerMsg};
use crate::domain::events::MatchEvent;
use crate::domain::match_state::MatchState;
use crate::domain::types::{Seat, UserId};
use crate::runtime::MatchObserver;

/// A batch of outbound messages for one session.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Push(pub Arc<Vec<ServerMsg>>);

struct Subscriber {
    user_id: UserId,
    recipient: Recipient<Push>,
}

/// Connected WebSocket sessions per match.
///
/// The seat is resolved from the committed state on every broadcast, so a
/// user who joins after connecting starts seeing their own cards at once.
#[derive(Default)]
pub struct MatchSessionRegistry {
    sessions: DashMap<i64, DashMap<Uuid, Subscriber>>,
}

impl MatchSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, match_id: i64, user_id: UserId, recipient: Recipient<Push>) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions
            .entry(match_id)
            .or_default()
            .insert(token, Subscriber { user_id, recipient });
        token
    }

    pub fn unregister(&self, match_id: i64, token: Uuid) {
        let now_empty = self
            .sessions
            .get(&match_id)
            .map(|entry| {
                entry.remove(&token);
                entry.is_empty()
            })
            .unwrap_or(false);
        if now_empty {
            self.sessions.remove_if(&match_id, |_, entry| entry.is_empty());
        }
    }

    pub fn connection_count(&self, match_id: i64) -> usize {
        self.sessions.get(&match_id).map_or(0, |entry| entry.len())
    }
}

impl MatchObserver for MatchSessionRegistry {
    fn on_commit(&self, state: &Arc<MatchState>, events: &[MatchEvent]) {
        let Some(entry) = self.sessions.get(&state.match_id) else {
            return;
        };
        // Seats share a view; compute each one once.
        let mut batches: BTreeMap<Option<Seat>, Push> = BTreeMap::new();
        for sub in entry.iter() {
            let seat = state.seat_of(sub.user_id);
            let push = batches
                .entry(seat)
                .or_insert_with(|| Push(Arc::new(commit_messages(state, events, seat))))
                .clone();
            sub.recipient.do_send(push);
        }
        debug!(
            match_id = state.match_id,
            sessions = entry.len(),
            views = batches.len(),
            "broadcast"
        );
    }
}
