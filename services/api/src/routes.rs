use crate::infra::AppState;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use student_intake::admission::{admission_router, AdmissionRepository, AdmissionService};
use student_intake::config::ConfigError;
use student_intake::intake::{
    intake_router, Notifier, ProfileRepository, RegistrationRepository, StudentIntakeService,
};
use tower_http::cors::CorsLayer;

/// CORS policy for the public admission form: one origin, `POST` and preflight only.
pub(crate) fn admission_cors(allowed_origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = HeaderValue::from_str(allowed_origin).map_err(|_| ConfigError::InvalidOrigin {
        value: allowed_origin.to_string(),
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

pub(crate) fn with_intake_routes<P, R, N, A>(
    intake: Arc<StudentIntakeService<P, R, N>>,
    admissions: Arc<AdmissionService<A>>,
    cors: CorsLayer,
) -> axum::Router
where
    P: ProfileRepository + 'static,
    R: RegistrationRepository + 'static,
    N: Notifier + 'static,
    A: AdmissionRepository + 'static,
{
    intake_router(intake)
        .merge(admission_router(admissions).layer(cors))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
