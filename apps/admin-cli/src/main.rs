use clap::{Parser, Subcommand, ValueEnum};
use migration::{migrate, MigrationCommand};
use orchestrator::config::db::DbProfile;
use orchestrator::config::orchestrator::OrchestratorConfig;
use orchestrator::domain::match_state::MatchState;
use orchestrator::infra::db::{connect_db, connect_url};
use orchestrator::runtime::clock::now_millis;
use orchestrator::services::match_flow::MatchFlowService;
use orchestrator::services::snapshots;
use orchestrator::AppError;
use sea_orm::DatabaseConnection;
use serde_json::json;

#[derive(Clone, ValueEnum)]
enum Env {
    Prod,
    Test,
}

#[derive(Clone, Copy, ValueEnum)]
enum Migration {
    Up,
    Down,
    Fresh,
    Reset,
    Status,
}

impl From<Migration> for MigrationCommand {
    fn from(m: Migration) -> Self {
        match m {
            Migration::Up => MigrationCommand::Up,
            Migration::Down => MigrationCommand::Down,
            Migration::Fresh => MigrationCommand::Fresh,
            Migration::Reset => MigrationCommand::Reset,
            Migration::Status => MigrationCommand::Status,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run schema migrations
    Migrate {
        #[arg(value_enum, default_value = "up")]
        command: Migration,
    },
    /// Rebuild a match from its first event and compare with the snapshot path
    Replay { match_id: i64 },
    /// Write a snapshot at the match's current seq
    Snapshot { match_id: i64 },
    /// Cancel a match as operator
    Cancel { match_id: i64 },
    /// Check seq continuity, snapshot consistency and ledger conservation
    Verify { match_id: i64 },
}

#[derive(Parser)]
#[command(name = "admin")]
#[command(about = "Match orchestrator operator tool")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Which environment variable supplies the database URL
    #[arg(short, long, value_enum, default_value = "prod")]
    env: Env,

    /// Explicit database URL, overrides --env
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "orchestrator=info,migration=info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    }
}

async fn connect(args: &Args) -> Result<DatabaseConnection, AppError> {
    if let Some(url) = &args.database_url {
        if url.starts_with("sqlite::memory:") {
            return Err(AppError::config(
                "in-memory sqlite is empty for every CLI run; use a file or postgres URL",
            ));
        }
        return connect_url(url).await;
    }
    let profile = match args.env {
        Env::Prod => DbProfile::Prod,
        Env::Test => DbProfile::Test,
    };
    connect_db(profile).await
}

/// `Ok(false)` means the command ran but found a problem.
async fn run(args: Args) -> Result<bool, AppError> {
    let db = connect(&args).await?;
    match args.command {
        Command::Migrate { command } => {
            migrate(&db, command.into())
                .await
                .map_err(|e| AppError::db(format!("migration failed: {e}")))?;
            Ok(true)
        }
        Command::Replay { match_id } => {
            let full = snapshots::replay_full(&db, match_id).await?;
            let via_snapshot = snapshots::rehydrate(&db, match_id).await?;
            let consistent = full == via_snapshot;
            print_json(&json!({
                "match_id": match_id,
                "last_seq": full.last_seq,
                "status": full.status,
                "stage": full.current_stage(),
                "snapshot_consistent": consistent,
                "stacks": stacks(&full),
            }));
            Ok(consistent)
        }
        Command::Snapshot { match_id } => {
            let state = snapshots::rehydrate(&db, match_id).await?;
            let created = snapshots::take(&db, &state).await?;
            print_json(&json!({
                "match_id": match_id,
                "seq": state.last_seq,
                "created": created,
            }));
            Ok(true)
        }
        Command::Cancel { match_id } => {
            let config = OrchestratorConfig::from_env()?;
            let flow = MatchFlowService::new(config.snapshot_every_events);
            let state = flow.cancel_offline(&db, match_id, now_millis()).await?;
            print_json(&json!({
                "match_id": match_id,
                "seq": state.last_seq,
                "status": state.status,
            }));
            Ok(true)
        }
        Command::Verify { match_id } => {
            let report = snapshots::verify(&db, match_id).await?;
            let ok = report.is_ok();
            print_json(&json!({ "ok": ok, "report": report }));
            Ok(ok)
        }
    }
}

fn stacks(state: &MatchState) -> serde_json::Value {
    state
        .players
        .iter()
        .map(|p| {
            json!({
                "seat": p.seat,
                "name": p.display_name,
                "stack": p.stack,
                "conserved": p.is_conserved(),
            })
        })
        .collect()
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("❌ could not render output: {e}"),
    }
}
