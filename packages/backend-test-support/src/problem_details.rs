//! Assertions for the `application/problem+json` error contract.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Checks status, code, trace id parity between header and body, and
/// optionally a detail substring. Returns the parsed problem.
pub fn assert_problem(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
    detail_contains: Option<&str>,
) -> Problem {
    assert_eq!(status, expected_status, "unexpected status");

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(content_type, "application/problem+json");

    let problem: Problem =
        serde_json::from_slice(body).expect("body should be problem details JSON");
    let header_trace = headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present");
    assert_eq!(problem.trace_id, header_trace, "trace id mismatch");
    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());
    if let Some(fragment) = detail_contains {
        assert!(
            problem.detail.contains(fragment),
            "detail {:?} does not contain {fragment:?}",
            problem.detail
        );
    }
    problem
}

pub async fn assert_problem_response(
    resp: ServiceResponse<BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
    detail_contains: Option<&str>,
) -> Problem {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;
    assert_problem(
        status,
        &headers,
        &body,
        expected_code,
        expected_status,
        detail_contains,
    )
}
