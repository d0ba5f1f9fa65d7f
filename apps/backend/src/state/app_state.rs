use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::ai::BotStrategy;
use crate::config::orchestrator::OrchestratorConfig;
use crate::error::AppError;
use crate::runtime::{ActorDeps, MatchRegistry};
use crate::services::match_flow::MatchFlowService;
use crate::ws::MatchSessionRegistry;

/// Shared resources handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Absent only in tests that never touch storage.
    pub db: Option<DatabaseConnection>,
    pub config: OrchestratorConfig,
    pub flow: MatchFlowService,
    sessions: Arc<MatchSessionRegistry>,
    registry: Option<Arc<MatchRegistry>>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: OrchestratorConfig,
        bots: Arc<dyn BotStrategy>,
    ) -> Self {
        let flow = MatchFlowService::new(config.snapshot_every_events);
        let sessions = Arc::new(MatchSessionRegistry::new());
        let deps = ActorDeps {
            db: db.clone(),
            flow: flow.clone(),
            observer: sessions.clone(),
            bots,
            bot_think: Duration::from_millis(config.bot_think_ms),
            queue_capacity: config.queue_capacity,
        };
        Self {
            db: Some(db),
            config,
            flow,
            sessions,
            registry: Some(Arc::new(MatchRegistry::new(deps))),
        }
    }

    pub fn without_db(config: OrchestratorConfig) -> Self {
        Self {
            db: None,
            flow: MatchFlowService::new(config.snapshot_every_events),
            config,
            sessions: Arc::new(MatchSessionRegistry::new()),
            registry: None,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn registry(&self) -> Result<Arc<MatchRegistry>, AppError> {
        self.registry.clone().ok_or_else(AppError::db_unavailable)
    }

    pub fn sessions(&self) -> Arc<MatchSessionRegistry> {
        Arc::clone(&self.sessions)
    }
}
