use std::sync::Arc;

use crate::config::db::DbProfile;
use crate::config::orchestrator::OrchestratorConfig;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;

/// Builder for `AppState`, shared by `main`, the integration tests and the
/// admin CLI.
pub struct StateBuilder {
    config: OrchestratorConfig,
    db_profile: Option<DbProfile>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            db_profile: None,
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = Some(profile);
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let Some(profile) = self.db_profile else {
            return Ok(AppState::without_db(self.config));
        };
        let bots = Arc::from(self.config.make_bot()?);
        let conn = bootstrap_db(profile).await?;
        Ok(AppState::new(conn, self.config, bots))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_without_db() {
        let state = build_state().build().await.unwrap();
        assert!(state.db().is_none());
        assert!(matches!(state.registry(), Err(AppError::DbUnavailable)));
    }

    #[tokio::test]
    async fn builds_against_in_memory_sqlite() {
        let state = build_state()
            .with_db(DbProfile::Test)
            .build()
            .await
            .unwrap();
        assert!(state.db().is_some());
        assert_eq!(state.registry().unwrap().live_count(), 0);
    }
}
