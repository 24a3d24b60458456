//! Tests for domain error construction, trace capture and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case::invalid(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::unauthorized(Error::unauthorized("login required"), ErrorCode::Unauthorized)]
#[case::forbidden(Error::forbidden("not yours"), ErrorCode::Forbidden)]
#[case::not_found(Error::not_found("missing"), ErrorCode::NotFound)]
#[case::conflict(Error::conflict("already accepted"), ErrorCode::Conflict)]
#[case::unavailable(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] code: ErrorCode) {
    assert_eq!(error.code(), code);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_a_generic_message_for_blank_input() {
    let error = Error::new(ErrorCode::Conflict, "");
    assert_eq!(error.message(), "unspecified error");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
fn with_trace_id_ignores_blank_values() {
    let error = Error::not_found("missing").with_trace_id("  ");
    assert!(error.trace_id().is_none());
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::invalid_request("bad").try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::conflict("lost the race") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_with_camel_case_trace_id(expected_trace_id: String) {
    let error = Error::invalid_request("rating must be between 1 and 5")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"field": "rating"}));

    let value = serde_json::to_value(&error).expect("serialise");

    assert_eq!(
        value,
        json!({
            "code": "invalid_request",
            "message": "rating must be between 1 and 5",
            "traceId": expected_trace_id,
            "details": {"field": "rating"}
        })
    );
}

#[rstest]
fn omits_absent_optional_fields() {
    let value = serde_json::to_value(Error::service_unavailable("db down")).expect("serialise");
    assert_eq!(value, json!({"code": "service_unavailable", "message": "db down"}));
}

#[rstest]
#[case::blank_message(json!({"code": "conflict", "message": " "}))]
#[case::blank_trace(json!({"code": "conflict", "message": "taken", "traceId": ""}))]
fn deserialisation_rejects_invalid_payloads(#[case] payload: serde_json::Value) {
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
