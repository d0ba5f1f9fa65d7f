use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::match_actor::{Accepted, ActorDeps, MatchActor, MatchHandle};
use crate::domain::actions::Command;
use crate::domain::match_state::MatchState;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::matches;
use crate::services::snapshots;

/// Live actors by match id.
///
/// Actors are started on first use from the latest snapshot plus the event
/// tail, so a restart only costs a replay per touched match.
pub struct MatchRegistry {
    actors: DashMap<i64, MatchHandle>,
    deps: ActorDeps,
    root: CancellationToken,
    // Serialises cold starts so two requests can't spawn two writers.
    loading: Mutex<()>,
}

impl MatchRegistry {
    pub fn new(deps: ActorDeps) -> Self {
        Self {
            actors: DashMap::new(),
            deps,
            root: CancellationToken::new(),
            loading: Mutex::new(()),
        }
    }

    fn live(&self, match_id: i64) -> Option<MatchHandle> {
        self.actors
            .get(&match_id)
            .map(|h| h.clone())
            .filter(|h| !h.is_closed())
    }

    /// Handle for `match_id`, starting its actor if needed.
    pub async fn handle(&self, match_id: i64) -> Result<MatchHandle, DomainError> {
        if let Some(handle) = self.live(match_id) {
            return Ok(handle);
        }
        let _guard = self.loading.lock().await;
        if let Some(handle) = self.live(match_id) {
            return Ok(handle);
        }

        let row = matches::require(&self.deps.db, match_id).await?;
        let state = snapshots::rehydrate(&self.deps.db, match_id).await?;
        snapshots::ensure_row_matches(row.last_seq, &state)?;
        if row.degraded {
            warn!(match_id, "match was flagged degraded; resuming from storage");
            matches::set_degraded(&self.deps.db, match_id, false).await?;
        }
        Ok(self.register(state))
    }

    /// Start an actor for a state that is already persisted.
    pub fn register(&self, state: MatchState) -> MatchHandle {
        let match_id = state.match_id;
        let handle = MatchActor::spawn(state, self.deps.clone(), &self.root);
        if let Some(previous) = self.actors.insert(match_id, handle.clone()) {
            previous.shutdown();
        }
        handle
    }

    pub async fn submit(&self, match_id: i64, command: Command) -> Result<Accepted, DomainError> {
        let handle = self.handle(match_id).await?;
        let result = handle.submit(command).await;
        if let Err(DomainError::Infra(InfraErrorKind::Other(_), _)) = &result {
            if handle.is_closed() {
                self.actors.remove(&match_id);
            }
        }
        result
    }

    pub async fn state(&self, match_id: i64) -> Result<Arc<MatchState>, DomainError> {
        Ok(self.handle(match_id).await?.state())
    }

    /// Stop and forget the actor for `match_id`, if any.
    pub fn evict(&self, match_id: i64) {
        if let Some((_, handle)) = self.actors.remove(&match_id) {
            handle.shutdown();
        }
    }

    pub fn live_count(&self) -> usize {
        self.actors.len()
    }

    /// Restart actors for matches that were running when the process last
    /// stopped, so their deadlines keep firing without a client poking them.
    pub async fn resume_live(&self, limit: u64) -> Result<usize, DomainError> {
        let ids = matches::live_match_ids(&self.deps.db, limit).await?;
        let mut resumed = 0;
        for match_id in ids {
            match self.handle(match_id).await {
                Ok(_) => resumed += 1,
                Err(err) => warn!(match_id, error = %err, "could not resume match"),
            }
        }
        info!(resumed, "live matches resumed");
        Ok(resumed)
    }

    pub fn shutdown(&self) {
        self.root.cancel();
    }
}
