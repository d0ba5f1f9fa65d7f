pub mod txn;

use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// The connection every handler and service goes through.
pub fn require_db(state: &AppState) -> Result<&DatabaseConnection, AppError> {
    state.db().ok_or_else(AppError::db_unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::orchestrator::OrchestratorConfig;

    #[test]
    fn require_db_without_connection_is_unavailable() {
        let state = AppState::without_db(OrchestratorConfig::default());
        assert!(matches!(require_db(&state), Err(AppError::DbUnavailable)));
    }
}
