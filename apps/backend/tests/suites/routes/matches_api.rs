use actix_web::http::header::{ETAG, IF_NONE_MATCH, LOCATION};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use crate::common::{assert_problem, test_state};
use crate::support::create_test_app;
use crate::support::matches::{act, create_match, get, join, post};

const HOST: i64 = 10;
const GUEST: i64 = 11;

#[actix_web::test]
async fn create_returns_location_and_host_view() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;

    let req = post("/api/matches", HOST)
        .set_json(json!({ "mode": "FIVE_KAMP", "display_name": "Ana" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("location header");

    let view: Value = test::read_body_json(resp).await;
    let match_id = view["match_id"].as_i64().expect("match id");
    assert_eq!(location, format!("/api/matches/{match_id}"));
    assert_eq!(view["you"], 0);
    assert_eq!(view["stage"], "LOBBY");
    assert_eq!(view["status"], "CREATED");
    assert_eq!(view["last_seq"], 2);
    assert_eq!(view["players"][0]["display_name"], "Ana");
    Ok(())
}

#[actix_web::test]
async fn requests_without_identity_are_unauthorized() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;

    let req = test::TestRequest::post()
        .uri("/api/matches")
        .set_json(json!({ "mode": "FIVE_KAMP" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    Ok(())
}

#[actix_web::test]
async fn second_join_by_same_user_conflicts() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;

    let joined = join(&app, match_id, GUEST).await;
    assert_eq!(joined["seat"], 1);
    assert_eq!(joined["accepted_seq"], 3);

    let req = post(&format!("/api/matches/{match_id}/join"), GUEST).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, StatusCode::CONFLICT, "ALREADY_JOINED").await;
    Ok(())
}

#[actix_web::test]
async fn host_starts_and_guest_cannot() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;
    join(&app, match_id, GUEST).await;

    let resp = act(&app, match_id, GUEST, json!({ "type": "StartMatch" })).await;
    assert_problem(resp, StatusCode::UNPROCESSABLE_ENTITY, "ILLEGAL_ACTION").await;

    let resp = act(&app, match_id, HOST, json!({ "type": "StartMatch" })).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let types: Vec<&str> = body["events"]
        .as_array()
        .expect("events")
        .iter()
        .filter_map(|e| e["event_type"].as_str())
        .collect();
    assert_eq!(types, vec!["StageCompleted", "StageStarted"]);
    assert_eq!(body["accepted_seq"], 5);

    let req = get(&format!("/api/matches/{match_id}/state"), GUEST).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["stage"], "READY_CHECK");
    assert_eq!(view["you"], 1);
    Ok(())
}

#[actix_web::test]
async fn actions_for_the_wrong_stage_are_illegal() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;

    let resp = act(&app, match_id, HOST, json!({ "type": "ConfirmReady" })).await;
    let problem = assert_problem(resp, StatusCode::UNPROCESSABLE_ENTITY, "ILLEGAL_ACTION").await;
    assert!(problem.detail.contains("ready check"), "{}", problem.detail);

    // Rejections never advance the log.
    let req = get(&format!("/api/matches/{match_id}/state"), HOST).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["last_seq"], 2);
    Ok(())
}

#[actix_web::test]
async fn malformed_actions_fail_validation() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;

    let resp = act(&app, match_id, HOST, json!({ "type": "TeleportChips" })).await;
    assert_problem(resp, StatusCode::BAD_REQUEST, "VALIDATION_FAILED").await;
    Ok(())
}

#[actix_web::test]
async fn unseated_users_cannot_act() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;

    let resp = act(&app, match_id, GUEST, json!({ "type": "ConfirmReady" })).await;
    assert_problem(resp, StatusCode::FORBIDDEN, "NOT_A_PARTICIPANT").await;

    let resp = act(
        &app,
        match_id,
        GUEST,
        json!({ "type": "Join", "payload": { "display_name": "late" } }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[actix_web::test]
async fn unknown_and_invalid_match_ids() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;

    let req = get("/api/matches/999/state", HOST).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, StatusCode::NOT_FOUND, "MATCH_NOT_FOUND").await;

    let req = get("/api/matches/abc/state", HOST).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, StatusCode::BAD_REQUEST, "INVALID_MATCH_ID").await;

    let req = get("/api/matches/0/state", HOST).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, StatusCode::BAD_REQUEST, "INVALID_MATCH_ID").await;
    Ok(())
}

#[actix_web::test]
async fn state_honors_if_none_match_per_viewer() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;
    let path = format!("/api/matches/{match_id}/state");

    let resp = test::call_service(&app, get(&path, HOST).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("etag");

    let req = get(&path, HOST)
        .insert_header((IF_NONE_MATCH, etag.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

    // A spectator's view differs, so the host's tag does not match it.
    let req = get(&path, 77)
        .insert_header((IF_NONE_MATCH, etag.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Any accepted event invalidates the tag.
    join(&app, match_id, GUEST).await;
    let req = get(&path, HOST).insert_header((IF_NONE_MATCH, etag)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[actix_web::test]
async fn events_are_paged_by_seq() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;
    join(&app, match_id, GUEST).await;

    let req = get(&format!("/api/matches/{match_id}/events?since=0&limit=2"), HOST).to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    let seqs: Vec<i64> = page["events"]
        .as_array()
        .expect("events")
        .iter()
        .filter_map(|e| e["seq"].as_i64())
        .collect();
    assert_eq!(seqs, vec![1, 2]);
    assert_eq!(page["events"][0]["event_type"], "MatchCreated");
    assert_eq!(page["next_since"], 2);

    let req = get(&format!("/api/matches/{match_id}/events?since=2"), HOST).to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["events"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["events"][0]["event_type"], "PlayerJoined");
    assert!(page["next_since"].is_null());
    Ok(())
}

#[actix_web::test]
async fn ledger_is_conserved_after_start() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "BLACKJACK_ONLY").await;
    let resp = act(&app, match_id, HOST, json!({ "type": "StartMatch" })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = get(&format!("/api/matches/{match_id}/ledger"), HOST).to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["conserved"], true);
    assert_eq!(report["seats"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[actix_web::test]
async fn only_the_host_snapshots() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;
    join(&app, match_id, GUEST).await;
    let path = format!("/api/matches/{match_id}/snapshot");

    let resp = test::call_service(&app, post(&path, GUEST).to_request()).await;
    assert_problem(resp, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let first: Value = test::call_and_read_body_json(&app, post(&path, HOST).to_request()).await;
    assert_eq!(first["created"], true);
    assert_eq!(first["seq"], 3);

    let again: Value = test::call_and_read_body_json(&app, post(&path, HOST).to_request()).await;
    assert_eq!(again["created"], false);
    Ok(())
}

#[actix_web::test]
async fn cancelled_matches_reject_further_actions() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state().await?).build().await;
    let match_id = create_match(&app, HOST, "FIVE_KAMP").await;
    join(&app, match_id, GUEST).await;
    let path = format!("/api/matches/{match_id}/cancel");

    let resp = test::call_service(&app, post(&path, GUEST).to_request()).await;
    assert_problem(resp, StatusCode::UNPROCESSABLE_ENTITY, "ILLEGAL_ACTION").await;

    let body: Value = test::call_and_read_body_json(&app, post(&path, HOST).to_request()).await;
    assert_eq!(body["events"][0]["event_type"], "MatchCancelled");

    let resp = act(&app, match_id, HOST, json!({ "type": "StartMatch" })).await;
    let problem = assert_problem(resp, StatusCode::CONFLICT, "MATCH_NOT_RUNNING").await;
    assert_eq!(problem.status, 409);
    Ok(())
}
