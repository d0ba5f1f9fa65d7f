use actix_web::{web, HttpResponse};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::db::require_db;
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    db: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    migrations: Option<usize>,
    live_matches: usize,
    time: String,
}

/// GET /health
///
/// Always 200; the body says whether the database answered.
async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let (db, db_error, migrations) = match require_db(&app_state) {
        Ok(conn) => {
            let ping = Statement::from_string(conn.get_database_backend(), "SELECT 1");
            match conn.query_one(ping).await {
                Ok(_) => ("ok", None, migration::count_applied_migrations(conn).await.ok()),
                Err(e) => ("error", Some(format!("DB query failed: {e}")), None),
            }
        }
        Err(e) => ("error", Some(e.detail()), None),
    };

    let live_matches = app_state.registry().map_or(0, |r| r.live_count());

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        db,
        db_error,
        migrations,
        live_matches,
        time,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
