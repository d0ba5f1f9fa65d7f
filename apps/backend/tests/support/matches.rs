//! Request helpers for the match API.

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, Error};
use serde_json::{json, Value};

pub fn post(path: &str, user_id: i64) -> test::TestRequest {
    test::TestRequest::post()
        .uri(path)
        .insert_header(("x-user-id", user_id.to_string()))
}

pub fn get(path: &str, user_id: i64) -> test::TestRequest {
    test::TestRequest::get()
        .uri(path)
        .insert_header(("x-user-id", user_id.to_string()))
}

/// Creates a match hosted by `host` and returns its id.
pub async fn create_match<S>(app: &S, host: i64, mode: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = post("/api/matches", host)
        .set_json(json!({ "mode": mode, "display_name": format!("host-{host}") }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let view: Value = test::read_body_json(resp).await;
    view["match_id"].as_i64().expect("match_id in view")
}

pub async fn join<S>(app: &S, match_id: i64, user_id: i64) -> Value
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = post(&format!("/api/matches/{match_id}/join"), user_id).to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    test::read_body_json(resp).await
}

pub async fn act<S>(app: &S, match_id: i64, user_id: i64, action: Value) -> ServiceResponse<BoxBody>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = post(&format!("/api/matches/{match_id}/actions"), user_id)
        .set_json(json!({ "action": action }))
        .to_request();
    test::call_service(app, req).await
}
