use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use super::documents::{request_body_limit, MAX_SECTION_UPLOADS};
use super::payload::Payload;
use super::processor::{SectionRequest, SubmissionError};
use super::registration::{ActorId, LifecycleAction, LifecycleError, RegistrationDraft, RegistrationId};
use super::repository::{Notifier, ProfileRepository, RegistrationRepository, RepositoryError};
use super::service::{IntakeServiceError, StudentIntakeService};

/// Header carrying the authenticated portal user, set by the upstream gateway.
pub const ACTOR_HEADER: &str = "x-actor-id";

const SAVE_FAILED: &str =
    "Failed to save the application. Please try again or contact us over email/phone.";
const SOMETHING_WENT_WRONG: &str = "Sorry something went wrong. Please try again.";

/// Portal routes: profile form save/load and registration lifecycle.
///
/// The body limit admits a section carrying its full set of uploads at the configured size, so
/// oversized files reach the processor and come back as validation errors.
pub fn intake_router<P, R, N>(service: Arc<StudentIntakeService<P, R, N>>) -> Router
where
    P: ProfileRepository + 'static,
    R: RegistrationRepository + 'static,
    N: Notifier + 'static,
{
    let body_limit = request_body_limit(service.max_upload_bytes(), MAX_SECTION_UPLOADS);
    Router::new()
        .route("/student-profile", get(form_context_handler::<P, R, N>))
        .route("/student-profile/save", post(save_section_handler::<P, R, N>))
        .route("/registrations", post(create_registration_handler::<P, R, N>))
        .route(
            "/registrations/:registration_id/:action",
            post(lifecycle_handler::<P, R, N>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

fn actor_from(headers: &HeaderMap) -> Option<ActorId> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| ActorId(value.to_string()))
}

fn unauthenticated() -> Response {
    let payload = json!({
        "error": "authentication required",
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn parse_action(raw: &str) -> Option<LifecycleAction> {
    match raw {
        "submit" => Some(LifecycleAction::Submit),
        "review" => Some(LifecycleAction::Review),
        "approve" => Some(LifecycleAction::Approve),
        "reject" => Some(LifecycleAction::Reject),
        _ => None,
    }
}

pub(crate) async fn save_section_handler<P, R, N>(
    State(service): State<Arc<StudentIntakeService<P, R, N>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response
where
    P: ProfileRepository + 'static,
    R: RegistrationRepository + 'static,
    N: Notifier + 'static,
{
    let Some(actor) = actor_from(&headers) else {
        return unauthenticated();
    };
    let payload = match Payload::from_value(body) {
        Ok(payload) => payload,
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    let request = SectionRequest::from_payload(payload);
    match service.save_section(&actor, &request) {
        Ok(record) => {
            let payload = json!({
                "status": "saved",
                "section_submitted": record.section_submitted,
                "sections": record.sections,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error, SAVE_FAILED),
    }
}

pub(crate) async fn form_context_handler<P, R, N>(
    State(service): State<Arc<StudentIntakeService<P, R, N>>>,
    headers: HeaderMap,
) -> Response
where
    P: ProfileRepository + 'static,
    R: RegistrationRepository + 'static,
    N: Notifier + 'static,
{
    let Some(actor) = actor_from(&headers) else {
        return unauthenticated();
    };

    match service.form_context(&actor) {
        Ok(context) => (StatusCode::OK, axum::Json(context)).into_response(),
        Err(error) => error_response(error, SOMETHING_WENT_WRONG),
    }
}

pub(crate) async fn create_registration_handler<P, R, N>(
    State(service): State<Arc<StudentIntakeService<P, R, N>>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<RegistrationDraft>,
) -> Response
where
    P: ProfileRepository + 'static,
    R: RegistrationRepository + 'static,
    N: Notifier + 'static,
{
    let Some(actor) = actor_from(&headers) else {
        return unauthenticated();
    };

    match service.create_registration(&actor, draft) {
        Ok(registration) => (StatusCode::CREATED, axum::Json(registration)).into_response(),
        Err(error) => error_response(error, SOMETHING_WENT_WRONG),
    }
}

pub(crate) async fn lifecycle_handler<P, R, N>(
    State(service): State<Arc<StudentIntakeService<P, R, N>>>,
    Path((registration_id, action)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response
where
    P: ProfileRepository + 'static,
    R: RegistrationRepository + 'static,
    N: Notifier + 'static,
{
    let Some(actor) = actor_from(&headers) else {
        return unauthenticated();
    };
    let Some(action) = parse_action(&action) else {
        let payload = json!({
            "error": format!("unknown action '{action}'"),
        });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    match service.advance(&actor, &RegistrationId(registration_id), action) {
        Ok(registration) => (StatusCode::OK, axum::Json(registration)).into_response(),
        Err(error) => error_response(error, SOMETHING_WENT_WRONG),
    }
}

/// Input and access problems are echoed to the applicant; anything else is logged and hidden.
fn error_response(error: IntakeServiceError, fallback: &'static str) -> Response {
    let (status, payload) = match error {
        IntakeServiceError::Submission(SubmissionError::Validation(failure)) => (
            StatusCode::BAD_REQUEST,
            json!({
                "error": failure.message(),
                "section": failure.section.index(),
                "missing_fields": failure.missing_fields(),
            }),
        ),
        IntakeServiceError::Submission(error @ SubmissionError::InvalidSection(_)) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": error.to_string() }),
        ),
        IntakeServiceError::NoRegistration => (
            StatusCode::FORBIDDEN,
            json!({ "error": IntakeServiceError::NoRegistration.to_string() }),
        ),
        IntakeServiceError::NotPermitted(_) => (
            StatusCode::FORBIDDEN,
            json!({ "error": error.to_string() }),
        ),
        IntakeServiceError::ProfilePending(stage) => (
            StatusCode::CONFLICT,
            json!({
                "error": IntakeServiceError::pending_message(stage),
                "stage": stage,
            }),
        ),
        IntakeServiceError::Lifecycle(error @ LifecycleError::IllegalTransition { .. }) => (
            StatusCode::CONFLICT,
            json!({ "error": error.to_string() }),
        ),
        IntakeServiceError::Lifecycle(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string() }),
        ),
        IntakeServiceError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            json!({ "error": RepositoryError::NotFound.to_string() }),
        ),
        IntakeServiceError::Repository(error) => {
            tracing::error!(%error, "student intake request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": fallback }),
            )
        }
    };

    (status, axum::Json(payload)).into_response()
}
