//! Problem Details assertions for route tests.
//!
//! Works on raw actix responses so this crate never depends on the backend.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Mirror of the backend's Problem Details body, kept free of backend types
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

/// Parse a Problem Details body and check the `x-trace-id` header agrees with it.
pub async fn read_problem(resp: ServiceResponse<BoxBody>) -> (StatusCode, Problem) {
    let status = resp.status();
    let header = resp
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = actix_web::test::read_body(resp).await;

    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    let problem: Problem = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "body is not Problem Details ({e}): {}",
            String::from_utf8_lossy(&body)
        )
    });
    assert_eq!(
        header.as_deref(),
        Some(problem.trace_id.as_str()),
        "x-trace-id header must match body trace_id"
    );
    (status, problem)
}

/// Assert that a response is a Problem Details error with the given code and status.
pub async fn assert_problem_details(
    resp: ServiceResponse<BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) {
    let (status, problem) = read_problem(resp).await;

    assert_eq!(status, expected_status);
    assert_eq!(problem.status, expected_status.as_u16());
    assert_eq!(problem.code, expected_code);
    assert!(problem.type_.ends_with(expected_code));

    if let Some(expected_detail) = expected_detail_contains {
        assert!(
            problem.detail.contains(expected_detail),
            "Expected detail to contain '{expected_detail}', but got '{}'",
            problem.detail
        );
    }
}
