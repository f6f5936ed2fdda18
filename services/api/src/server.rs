use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryAdmissionRepository, InMemoryNotifier, InMemoryProfileRepository,
    InMemoryRegistrationRepository,
};
use crate::routes::{admission_cors, with_intake_routes};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use student_intake::admission::AdmissionService;
use student_intake::config::AppConfig;
use student_intake::error::AppError;
use student_intake::intake::{ActorId, StudentIntakeService, SubmissionProcessor};
use student_intake::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let intake_service = Arc::new(StudentIntakeService::new(
        SubmissionProcessor::new(config.intake.max_upload_bytes),
        Arc::new(InMemoryProfileRepository::default()),
        Arc::new(InMemoryRegistrationRepository::default()),
        Arc::new(InMemoryNotifier::default()),
    )
    .with_reviewers(config.intake.reviewers.iter().cloned().map(ActorId)));
    let admission_service = Arc::new(
        AdmissionService::new(Arc::new(InMemoryAdmissionRepository::default()))
            .with_max_upload_bytes(config.intake.max_upload_bytes),
    );
    let cors = admission_cors(&config.intake.allowed_origin)?;

    let app = with_intake_routes(intake_service, admission_service, cors)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        allowed_origin = %config.intake.allowed_origin,
        reviewers = config.intake.reviewers.len(),
        "student intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
