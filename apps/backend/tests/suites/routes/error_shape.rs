use actix_web::http::StatusCode;
use actix_web::test;
use orchestrator::config::orchestrator::OrchestratorConfig;
use orchestrator::AppState;
use serde_json::json;

use crate::common::{assert_problem, test_state};
use crate::support::create_test_app;
use crate::support::matches::post;

#[actix_web::test]
async fn malformed_json_is_a_validation_problem() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;

    let req = post("/api/matches", 5)
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"mode\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem(resp, StatusCode::BAD_REQUEST, "VALIDATION_FAILED").await;
    assert_eq!(problem.title, "Validation Failed");
    Ok(())
}

#[actix_web::test]
async fn unknown_mode_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;

    let req = post("/api/matches", 5)
        .set_json(json!({ "mode": "SPEED_CHESS" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, StatusCode::BAD_REQUEST, "VALIDATION_FAILED").await;
    Ok(())
}

#[actix_web::test]
async fn oversized_bodies_are_bad_requests() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;

    let name = "x".repeat(20 * 1024);
    let req = post("/api/matches", 5)
        .set_json(json!({ "mode": "FIVE_KAMP", "display_name": name }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
    Ok(())
}

#[actix_web::test]
async fn missing_database_is_retryable() {
    let app = create_test_app(AppState::without_db(OrchestratorConfig::default()))
        .build()
        .await;

    let req = post("/api/matches", 5)
        .set_json(json!({ "mode": "FIVE_KAMP" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("retry-after").and_then(|v| v.to_str().ok()),
        Some("1")
    );
    assert_problem(resp, StatusCode::SERVICE_UNAVAILABLE, "DB_UNAVAILABLE").await;
}
