use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use base64::{engine::general_purpose, Engine as _};

use crate::intake::processor::SubmissionProcessor;
use crate::intake::router::ACTOR_HEADER;
use crate::intake::service::StudentIntakeService;
use crate::intake::intake_router;

fn post_json(uri: &str, actor: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request")
}

fn get_with_actor(uri: &str, actor: &str) -> Request<Body> {
    Request::get(uri)
        .header(ACTOR_HEADER, actor)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn save_without_actor_is_unauthorized() {
    let router = intake_router_with_service(submitted_service());

    let response = router
        .oneshot(post_json("/student-profile/save", None, &json!({ "section_number": 1 })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn save_for_unknown_actor_is_forbidden() {
    let router = intake_router_with_service(submitted_service());

    let response = router
        .oneshot(post_json(
            "/student-profile/save",
            Some("someone-else"),
            &json!({ "section_number": 1 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "No student record found for the logged-in user.");
}

#[tokio::test]
async fn invalid_section_is_bad_request() {
    let router = intake_router_with_service(submitted_service());

    let response = router
        .oneshot(post_json(
            "/student-profile/save",
            Some(ACTOR),
            &json!({ "section_number": 9, "is_section_save": true }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Invalid section number");
}

#[tokio::test]
async fn validation_failure_lists_missing_fields() {
    let router = intake_router_with_service(submitted_service());
    let mut payload = family_payload();
    payload.insert("parentMaritalStatus".to_string(), json!("divorced"));

    let response = router
        .oneshot(post_json(
            "/student-profile/save",
            Some(ACTOR),
            &Value::Object(payload),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["section"], 4);
    let missing = body["missing_fields"].as_array().expect("missing list");
    assert_eq!(missing.len(), 4);
    let message = body["error"].as_str().expect("message");
    assert!(message.contains("Missing court_order_document file"));
    assert!(message.contains("Missing legal_rights_document file"));
}

#[tokio::test]
async fn saved_section_shows_up_in_form_context() {
    let router = intake_router_with_service(submitted_service());

    let response = router
        .clone()
        .oneshot(post_json(
            "/student-profile/save",
            Some(ACTOR),
            &Value::Object(health_payload()),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "saved");
    assert_eq!(body["section_submitted"], 3);

    let response = router
        .oneshot(get_with_actor("/student-profile", ACTOR))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["profile"]["fields"]["blood_group"], "b_pos");
    assert_eq!(body["profile"]["sections"]["health"], true);
    assert_eq!(body["options"]["blood_group"][0]["value"], "a_pos");
    assert_eq!(body["registration"]["stage"], "submitted");
}

#[tokio::test]
async fn draft_registration_reports_pending_profile() {
    let (service, _, _, _) = build_service();
    service
        .create_registration(&actor(), draft())
        .expect("registration opens");
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(get_with_actor("/student-profile", ACTOR))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(
        body["error"],
        "Application review pending. Please wait for confirmation link"
    );
}

#[tokio::test]
async fn registration_lifecycle_over_http() {
    let (service, _, _, notifier) = build_service();
    let router = intake_router_with_service(service);

    let response = router
        .clone()
        .oneshot(post_json(
            "/registrations",
            Some(ACTOR),
            &json!({ "full_name": "Asha Raman", "date_of_birth": "2014-08-21" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let id = created["id"].as_str().expect("registration id").to_string();
    assert_eq!(created["stage"], "draft");

    let response = router
        .clone()
        .oneshot(post_json(&format!("/registrations/{id}/submit"), Some(ACTOR), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(post_json(&format!("/registrations/{id}/review"), Some(REVIEWER), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(post_json(&format!("/registrations/{id}/submit"), Some(ACTOR), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(post_json(&format!("/registrations/{id}/reject"), Some(REVIEWER), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let rejected = read_json_body(response).await;
    assert_eq!(rejected["stage"], "rejected");

    assert_eq!(
        notifier.templates(),
        vec![
            "application_submitted".to_string(),
            "application_rejected".to_string()
        ]
    );
}

#[tokio::test]
async fn future_birth_date_is_unprocessable() {
    let router = intake_router_with_service(build_service().0);

    let response = router
        .oneshot(post_json(
            "/registrations",
            Some(ACTOR),
            &json!({ "full_name": "Asha Raman", "date_of_birth": "2999-01-01" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Date of birth cannot be in the future.");
}

#[tokio::test]
async fn unknown_lifecycle_action_is_not_found() {
    let router = intake_router_with_service(build_service().0);

    let response = router
        .oneshot(post_json("/registrations/reg-000001/archive", Some(REVIEWER), &json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn storage_failure_hides_details() {
    let service = StudentIntakeService::new(
        SubmissionProcessor::default(),
        Arc::new(UnavailableProfiles),
        Arc::new(MemoryRegistrations::default()),
        Arc::new(MemoryNotifier::default()),
    );
    let registration = service
        .create_registration(&actor(), draft())
        .expect("registration opens");
    let router = intake_router(Arc::new(service));

    let response = router
        .oneshot(post_json(
            &format!("/registrations/{}/submit", registration.id.0),
            Some(ACTOR),
            &json!({}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Sorry something went wrong. Please try again.");
}

async fn open_registration(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(post_json(
            "/registrations",
            Some(ACTOR),
            &json!({ "full_name": "Asha Raman" }),
        ))
        .await
        .expect("response");
    let created = read_json_body(response).await;
    created["id"].as_str().expect("registration id").to_string()
}

#[tokio::test]
async fn lifecycle_actions_require_an_actor() {
    let (service, _, _, notifier) = build_service();
    let router = intake_router_with_service(service);
    let id = open_registration(&router).await;

    for action in ["submit", "approve"] {
        let response = router
            .clone()
            .oneshot(post_json(&format!("/registrations/{id}/{action}"), None, &json!({})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    assert!(notifier.templates().is_empty());
}

#[tokio::test]
async fn lifecycle_actions_check_ownership_and_role() {
    let (service, _, _, notifier) = build_service();
    let router = intake_router_with_service(service);
    let id = open_registration(&router).await;

    let response = router
        .clone()
        .oneshot(post_json(&format!("/registrations/{id}/submit"), Some("someone-else"), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(post_json(&format!("/registrations/{id}/submit"), Some(ACTOR), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(post_json(&format!("/registrations/{id}/approve"), Some(ACTOR), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "You are not allowed to approve this application.");

    let response = router
        .oneshot(post_json(&format!("/registrations/{id}/approve"), Some(REVIEWER), &json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        notifier.templates(),
        vec![
            "application_submitted".to_string(),
            "application_approved".to_string()
        ]
    );
}

fn upload_of(name: &str, size: usize) -> Value {
    json!({
        "filename": name,
        "content": general_purpose::STANDARD.encode(vec![0x42u8; size]),
    })
}

#[tokio::test]
async fn multi_megabyte_photograph_is_saved() {
    let router = intake_router_with_service(submitted_service());
    let mut payload = personal_payload();
    payload.insert(
        "recentPhotograph".to_string(),
        upload_of("photo.jpg", 3 * 1024 * 1024),
    );

    let response = router
        .oneshot(post_json(
            "/student-profile/save",
            Some(ACTOR),
            &Value::Object(payload),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["section_submitted"], 1);
}

#[tokio::test]
async fn file_over_configured_limit_is_a_validation_error() {
    let (service, _, _, _) = build_service_with(SubmissionProcessor::new(1024 * 1024));
    let router = intake_router_with_service(submit_for(service));
    let mut payload = personal_payload();
    payload.insert(
        "birthCertificate".to_string(),
        upload_of("birth.pdf", 2 * 1024 * 1024),
    );

    let response = router
        .oneshot(post_json(
            "/student-profile/save",
            Some(ACTOR),
            &Value::Object(payload),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["section"], 1);
    assert!(body["error"]
        .as_str()
        .expect("message")
        .contains("birth_certificate"));
}
