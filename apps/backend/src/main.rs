use actix_web::{web, App, HttpServer};
use orchestrator::config::db::DbProfile;
use orchestrator::config::orchestrator::OrchestratorConfig;
use orchestrator::infra::state::build_state;
use orchestrator::middleware::cors::cors_middleware;
use orchestrator::middleware::request_trace::RequestTrace;
use orchestrator::middleware::structured_logger::StructuredLogger;
use orchestrator::middleware::trace_span::TraceSpan;
use orchestrator::{routes, telemetry};
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = match std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
    {
        Ok(port) => port,
        Err(_) => {
            error!("BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        }
    };

    let config = match OrchestratorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    let resume_limit = config.resume_limit;

    let app_state = match build_state()
        .with_db(DbProfile::Prod)
        .with_config(config)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    let registry = match app_state.registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "match runtime unavailable");
            std::process::exit(1);
        }
    };
    match registry.resume_live(resume_limit).await {
        Ok(resumed) => info!(resumed, "live matches resumed"),
        Err(e) => warn!(error = %e, "could not resume live matches"),
    }

    info!(%host, port, "starting match orchestrator");

    let data = web::Data::new(app_state);

    let served = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    registry.shutdown();
    info!("match orchestrator stopped");
    served
}
