use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::db::{db_url, DbProfile};
use crate::error::AppError;

/// Opens a pool for `profile`. Does not touch the schema.
pub async fn connect_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let url = db_url(profile)?;
    connect_url(&url).await
}

pub async fn connect_url(url: &str) -> Result<DatabaseConnection, AppError> {
    let mut opts = ConnectOptions::new(url.to_string());
    opts.connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if url.starts_with("sqlite::memory:") {
        // Every pooled connection would otherwise see its own empty database.
        opts.max_connections(1).min_connections(1);
    }
    let conn = Database::connect(opts).await?;
    Ok(conn)
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(profile).await?;
    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::db(format!("migration failed: {e}")))?;
    info!(?profile, "database ready");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use sea_orm::ConnectionTrait;

    use super::*;

    #[tokio::test]
    async fn in_memory_bootstrap_applies_schema() {
        let conn = connect_url("sqlite::memory:").await.unwrap();
        migrate(&conn, MigrationCommand::Up).await.unwrap();
        let applied = migration::count_applied_migrations(&conn).await.unwrap();
        assert_eq!(applied, 1);
        assert_eq!(conn.get_database_backend(), sea_orm::DatabaseBackend::Sqlite);
    }
}
