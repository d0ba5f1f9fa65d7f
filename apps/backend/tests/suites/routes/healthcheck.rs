use actix_web::test;
use orchestrator::config::orchestrator::OrchestratorConfig;
use orchestrator::AppState;
use serde_json::Value;

use crate::common::test_state;
use crate::support::create_test_app;

#[actix_web::test]
async fn health_reports_db_and_migrations() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert_eq!(body["migrations"], 1);
    assert_eq!(body["live_matches"], 0);
    assert!(body["app_version"].is_string());
    Ok(())
}

#[actix_web::test]
async fn health_without_database_still_answers() {
    let app = create_test_app(AppState::without_db(OrchestratorConfig::default()))
        .build()
        .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["db"], "error");
    assert!(body["db_error"].is_string());
    assert!(body["migrations"].is_null());
}
