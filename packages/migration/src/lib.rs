pub use sea_orm_migration::prelude::*;
pub use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use sea_orm_migration::sea_orm::Statement;

mod m20261001_000001_match_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261001_000001_match_log::Migration)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Status,
}

/// Runs `command` against an already open connection. Shared by the admin
/// CLI, the server bootstrap and tests.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let backend = format!("{:?}", db.get_database_backend());
    let name = database_name(db).await?;
    let before = count_applied_migrations(db).await?;
    tracing::info!(
        ?command,
        backend = %backend,
        database = %name,
        defined = Migrator::migrations().len(),
        applied = before,
        "running migrations"
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            let after = count_applied_migrations(db).await?;
            tracing::info!(?command, applied = after, "migrations done");
            Ok(())
        }
        Err(e) => {
            tracing::error!(?command, error = %e, "migrations failed");
            Err(e)
        }
    }
}

async fn database_name(db: &DatabaseConnection) -> Result<String, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        sea_orm::DatabaseBackend::Postgres => "select current_database() as name",
        sea_orm::DatabaseBackend::Sqlite => {
            "SELECT file AS name FROM pragma_database_list WHERE name = 'main'"
        }
        _ => return Ok("<unsupported>".to_string()),
    };
    let row = db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await?;
    Ok(match row.and_then(|r| r.try_get::<String>("", "name").ok()) {
        Some(name) if name.is_empty() => ":memory:".to_string(),
        Some(name) => name,
        None => "<unknown>".to_string(),
    })
}

/// Applied migration count; 0 before the bookkeeping table exists.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0),
        Err(e) => Err(e),
    }
}
