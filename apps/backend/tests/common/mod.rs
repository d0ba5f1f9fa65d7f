#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use backend_test_support::problem_details::{assert_problem_response, Problem};
use orchestrator::config::db::DbProfile;
use orchestrator::config::orchestrator::OrchestratorConfig;
use orchestrator::infra::state::build_state;
use orchestrator::{AppError, AppState};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Short timers and instant bots so whole matches finish in a test.
pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        bot_think_ms: 0,
        bot_seed: Some(7),
        ready_check_secs: 2,
        yatzy_turn_secs: 2,
        bj_betting_secs: 2,
        bj_decision_secs: 2,
        bj_rounds_five_kamp: 2,
        bj_rounds_chicken_run: 2,
        roulette_spins: 2,
        roulette_betting_secs: 2,
        trivia_questions: 3,
        dice_rounds: 2,
        dice_call_secs: 2,
        music_rounds: 2,
        holdem_max_hands: 3,
        holdem_decision_secs: 2,
        ..OrchestratorConfig::default()
    }
}

/// Fresh state on the test database; every call gets its own in-memory
/// sqlite unless `TEST_DATABASE_URL` says otherwise.
pub async fn test_state() -> Result<AppState, AppError> {
    test_state_with(fast_config()).await
}

pub async fn test_state_with(config: OrchestratorConfig) -> Result<AppState, AppError> {
    build_state()
        .with_db(DbProfile::Test)
        .with_config(config)
        .build()
        .await
}

/// Problem-details assertions shared by the HTTP suites.
pub async fn assert_problem(
    resp: ServiceResponse<BoxBody>,
    status: StatusCode,
    code: &str,
) -> Problem {
    assert_problem_response(resp, code, status, None).await
}
