use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::prepare::BINARY_FIELDS;
use super::repository::AdmissionRepository;
use crate::intake::documents::request_body_limit;
use super::service::{AdmissionError, AdmissionService};

pub const ADMISSION_PATH: &str = "/student-admission/create";

/// Public admission route. Cross-origin access is layered on by the caller.
pub fn admission_router<R>(service: Arc<AdmissionService<R>>) -> Router
where
    R: AdmissionRepository + 'static,
{
    let body_limit = request_body_limit(service.max_upload_bytes(), BINARY_FIELDS.len());
    Router::new()
        .route(ADMISSION_PATH, post(create_admission_handler::<R>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

pub(crate) async fn create_admission_handler<R>(
    State(service): State<Arc<AdmissionService<R>>>,
    body: Bytes,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    match service.create(&body) {
        Ok(id) => {
            let payload = json!({
                "success": true,
                "message": "Registration submitted successfully!",
                "registration_id": id,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(AdmissionError::InvalidJson(error)) => {
            tracing::error!(%error, "admission body is not valid JSON");
            failure(StatusCode::BAD_REQUEST, "Invalid JSON data format")
        }
        Err(AdmissionError::NotAnObject) => {
            failure(StatusCode::BAD_REQUEST, "Invalid JSON data format")
        }
        Err(AdmissionError::MissingFields(error)) => {
            tracing::error!(%error, "admission rejected");
            failure(StatusCode::BAD_REQUEST, &error.to_string())
        }
        Err(AdmissionError::Repository(error)) => {
            tracing::error!(%error, "admission could not be stored");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    let payload = json!({
        "success": false,
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::admission::{AdmissionId, AdmissionRecord};
    use crate::intake::repository::RepositoryError;

    #[derive(Default)]
    struct MemoryAdmissions {
        next: AtomicU64,
        records: Mutex<Vec<AdmissionRecord>>,
    }

    impl AdmissionRepository for MemoryAdmissions {
        fn create(&self, record: AdmissionRecord) -> Result<AdmissionId, RepositoryError> {
            self.records
                .lock()
                .expect("repository mutex poisoned")
                .push(record);
            Ok(AdmissionId(self.next.fetch_add(1, Ordering::Relaxed) + 1))
        }
    }

    struct OfflineAdmissions;

    impl AdmissionRepository for OfflineAdmissions {
        fn create(&self, _record: AdmissionRecord) -> Result<AdmissionId, RepositoryError> {
            Err(RepositoryError::Unavailable("database offline".to_string()))
        }
    }

    fn post(body: &'static str) -> Request<Body> {
        Request::post(ADMISSION_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn stores_complete_admission() {
        let repository = Arc::new(MemoryAdmissions::default());
        let router = admission_router(Arc::new(AdmissionService::new(repository.clone())));

        let response = router
            .oneshot(post(
                r#"{"full_name":"Kavin S","application_year":"2025-2026","applied_for":"Grade 2","date_of_birth":"2018-02-11","previous_schools":[]}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Registration submitted successfully!");
        assert_eq!(body["registration_id"], 1);

        let records = repository.records.lock().expect("repository mutex poisoned");
        assert_eq!(records.len(), 1);
        assert!(records[0].get("previous_schools").is_none());
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let router = admission_router(Arc::new(AdmissionService::new(Arc::new(
            MemoryAdmissions::default(),
        ))));

        let response = router
            .oneshot(post(r#"{"full_name":"Kavin S","date_of_birth":""}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "Missing required fields: application_year, applied_for, date_of_birth"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let router = admission_router(Arc::new(AdmissionService::new(Arc::new(
            MemoryAdmissions::default(),
        ))));

        let response = router.oneshot(post("{not json")).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid JSON data format");
    }

    #[tokio::test]
    async fn storage_failure_is_internal_error() {
        let router = admission_router(Arc::new(AdmissionService::new(Arc::new(OfflineAdmissions))));

        let response = router
            .oneshot(post(
                r#"{"full_name":"Kavin S","application_year":"2025-2026","applied_for":"Grade 2","date_of_birth":"2018-02-11"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn accepts_enquiry_with_large_attachment() {
        let repository = Arc::new(MemoryAdmissions::default());
        let router = admission_router(Arc::new(
            AdmissionService::new(repository.clone()).with_max_upload_bytes(4 * 1024 * 1024),
        ));
        let body = serde_json::json!({
            "full_name": "Kavin S",
            "application_year": "2025-2026",
            "applied_for": "Grade 2",
            "date_of_birth": "2018-02-11",
            "birth_certificate": "QkJC".repeat(1024 * 1024),
        });

        let response = router
            .oneshot(
                Request::post(ADMISSION_PATH)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let records = repository.records.lock().expect("repository mutex poisoned");
        assert_eq!(
            records[0].get("birth_certificate_filename"),
            Some(&Value::String("uploaded_birth_certificate.bin".to_string()))
        );
    }
}
