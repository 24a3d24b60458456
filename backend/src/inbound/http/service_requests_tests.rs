//! Tests for service request HTTP handlers.

use super::*;
use crate::domain::ports::{MechanicMatch, RequestHistoryEntry};
use crate::domain::{RatingSummary, ServiceRequestStatus};
use crate::inbound::http::test_utils::{
    MockPorts, mechanic_fixture, request_fixture, sign_in, test_app,
};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

fn submission() -> Value {
    json!({
        "vehicleType": "car",
        "vehicleBrand": "Maruti",
        "vehicleModel": "Swift",
        "vehicleYear": 2019,
        "vehicleNumber": "ka 01 ab 1234",
        "ownerName": "Asha Rao",
        "phone": "91234 56780",
        "location": "12 MG Road, Bengaluru",
        "serviceType": "towing"
    })
}

#[actix_web::test]
async fn submit_forwards_the_session_account_as_requester() {
    let requester = AccountId::random();
    let created = request_fixture(requester, ServiceRequestStatus::Pending);
    let created_id = created.id;
    let mut ports = MockPorts::default();
    ports
        .service_requests
        .expect_submit()
        .withf(move |command| {
            command.requester_id == requester
                && command.vehicle_number == "ka 01 ab 1234"
                && command.latitude.is_none()
        })
        .times(1)
        .return_once(move |_| Ok(created));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, requester).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/service-requests")
        .cookie(cookie)
        .set_json(submission())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], created_id.to_string());
    assert_eq!(body["status"], "pending");
}

#[actix_web::test]
async fn submit_requires_a_session() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/service-requests")
        .set_json(submission())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn submit_rejects_a_non_numeric_year() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;
    let cookie = sign_in(&app, AccountId::random()).await;
    let mut body = submission();
    body["vehicleYear"] = json!("twenty nineteen");

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/service-requests")
        .cookie(cookie)
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn history_flags_feedback_eligibility() {
    let requester = AccountId::random();
    let completed = request_fixture(requester, ServiceRequestStatus::Completed);
    let mechanic = mechanic_fixture(AccountId::random());
    let entries = vec![RequestHistoryEntry {
        request: completed,
        mechanic: Some(mechanic),
        can_give_feedback: true,
        feedback: None,
    }];
    let mut ports = MockPorts::default();
    ports
        .service_requests_query
        .expect_history()
        .withf(move |actor| *actor == requester)
        .return_once(move |_| Ok(entries));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, requester).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/service-requests")
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Vec<Value> = actix_test::read_body_json(response).await;
    assert_eq!(body[0]["canGiveFeedback"], true);
    assert_eq!(body[0]["request"]["status"], "completed");
    assert_eq!(body[0]["feedback"], Value::Null);
}

#[actix_web::test]
async fn nearby_mechanics_applies_the_requested_radius() {
    let requester = AccountId::random();
    let request_id = ServiceRequestId::random();
    let matches = vec![MechanicMatch {
        mechanic: mechanic_fixture(AccountId::random()),
        distance_km: 2.5,
        rating: RatingSummary::default(),
    }];
    let mut ports = MockPorts::default();
    ports
        .service_requests_query
        .expect_nearby_mechanics()
        .withf(move |actor, id, radius| {
            *actor == requester && *id == request_id && radius.km() == 10.0
        })
        .return_once(move |_, _, _| Ok(matches));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, requester).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!(
            "/api/v1/service-requests/{request_id}/nearby-mechanics?radiusKm=10"
        ))
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Vec<Value> = actix_test::read_body_json(response).await;
    assert_eq!(body[0]["distanceKm"], 2.5);
}

#[actix_web::test]
async fn select_validates_the_mechanic_id() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;
    let cookie = sign_in(&app, AccountId::random()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!(
            "/api/v1/service-requests/{}/select",
            ServiceRequestId::random()
        ))
        .cookie(cookie)
        .set_json(json!({"mechanicId": "garage-7"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "mechanicId");
}

#[actix_web::test]
async fn select_passes_ids_through() {
    let requester = AccountId::random();
    let mechanic = mechanic_fixture(AccountId::random());
    let mechanic_id = mechanic.id;
    let mut selected = request_fixture(requester, ServiceRequestStatus::Pending);
    selected.mechanic_id = Some(mechanic_id);
    let request_id = selected.id;
    let mut ports = MockPorts::default();
    ports
        .service_requests
        .expect_select()
        .withf(move |actor, id, chosen| {
            *actor == requester && *id == request_id && *chosen == mechanic_id
        })
        .return_once(move |_, _, _| Ok(selected));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, requester).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/service-requests/{request_id}/select"))
        .cookie(cookie)
        .set_json(SelectMechanicBody {
            mechanic_id: mechanic_id.to_string(),
        })
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["mechanicId"], mechanic_id.to_string());
    assert_eq!(body["status"], "pending");
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Accept,
    Decline,
    Complete,
    Cancel,
}

impl Action {
    fn segment(self) -> &'static str {
        match self {
            Action::Accept => "accept",
            Action::Decline => "decline",
            Action::Complete => "complete",
            Action::Cancel => "cancel",
        }
    }
}

fn expect_action(ports: &mut MockPorts, action: Action, result: Result<ServiceRequest, Error>) {
    let commands = &mut ports.service_requests;
    match action {
        Action::Accept => {
            commands.expect_accept().return_once(move |_, _| result);
        }
        Action::Decline => {
            commands.expect_decline().return_once(move |_, _| result);
        }
        Action::Complete => {
            commands.expect_complete().return_once(move |_, _| result);
        }
        Action::Cancel => {
            commands.expect_cancel().return_once(move |_, _| result);
        }
    }
}

#[rstest]
#[case::accept(Action::Accept, ServiceRequestStatus::Accepted)]
#[case::decline(Action::Decline, ServiceRequestStatus::Pending)]
#[case::complete(Action::Complete, ServiceRequestStatus::Completed)]
#[case::cancel(Action::Cancel, ServiceRequestStatus::Cancelled)]
#[actix_web::test]
async fn lifecycle_actions_return_the_updated_request(
    #[case] action: Action,
    #[case] status: ServiceRequestStatus,
) {
    let updated = request_fixture(AccountId::random(), status);
    let id = updated.id;
    let mut ports = MockPorts::default();
    expect_action(&mut ports, action, Ok(updated));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, AccountId::random()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/service-requests/{id}/{}", action.segment()))
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["status"], status.as_str());
}

#[rstest]
#[case::second_accept(
    Action::Accept,
    Error::conflict("request is already accepted"),
    StatusCode::CONFLICT
)]
#[case::foreign_complete(
    Action::Complete,
    Error::forbidden("not the assigned mechanic"),
    StatusCode::FORBIDDEN
)]
#[case::missing(
    Action::Cancel,
    Error::not_found("service request not found"),
    StatusCode::NOT_FOUND
)]
#[actix_web::test]
async fn lifecycle_failures_map_to_statuses(
    #[case] action: Action,
    #[case] error: Error,
    #[case] status: StatusCode,
) {
    let mut ports = MockPorts::default();
    expect_action(&mut ports, action, Err(error));
    let app = actix_test::init_service(test_app(ports.into_state())).await;
    let cookie = sign_in(&app, AccountId::random()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!(
            "/api/v1/service-requests/{}/{}",
            ServiceRequestId::random(),
            action.segment()
        ))
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
}

#[actix_web::test]
async fn lifecycle_actions_reject_malformed_ids() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;
    let cookie = sign_in(&app, AccountId::random()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/service-requests/42/accept")
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
