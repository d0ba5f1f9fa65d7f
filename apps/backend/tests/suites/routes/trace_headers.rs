use actix_web::test;
use orchestrator::config::orchestrator::OrchestratorConfig;
use orchestrator::AppState;
use uuid::Uuid;

use crate::support::create_test_app;

fn request_id(resp: &actix_web::dev::ServiceResponse) -> Option<String> {
    resp.headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[actix_web::test]
async fn every_response_carries_a_request_id() {
    let app = create_test_app(AppState::without_db(OrchestratorConfig::default()))
        .build()
        .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    let id = request_id(&resp).expect("x-request-id");
    assert!(Uuid::parse_str(&id).is_ok(), "{id}");
}

#[actix_web::test]
async fn gateway_ids_are_kept_when_sane() {
    let app = create_test_app(AppState::without_db(OrchestratorConfig::default()))
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("x-request-id", "gw-0001-abcdef"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(request_id(&resp).as_deref(), Some("gw-0001-abcdef"));

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("x-request-id", "no"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_ne!(request_id(&resp).as_deref(), Some("no"));
}

#[actix_web::test]
async fn problem_trace_id_matches_request_id() {
    let app = create_test_app(AppState::without_db(OrchestratorConfig::default()))
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri("/api/matches/1/state")
        .insert_header(("x-user-id", "3"))
        .insert_header(("x-request-id", "trace-from-gateway"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(request_id(&resp).as_deref(), Some("trace-from-gateway"));
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["trace_id"], "trace-from-gateway");
}
