use crate::cli::ServeArgs;
use crate::infra::{build_renderer, read_template, AppState, InMemoryFormRepository};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use booking_form::applications::BookingFormService;
use booking_form::config::AppConfig;
use booking_form::error::AppError;
use booking_form::pdf::LopdfMerger;
use booking_form::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let renderer = build_renderer(&config.form)?;
    let template = read_template(config.form.template_path.as_deref())?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryFormRepository::default());
    let merger = Arc::new(LopdfMerger::new(*renderer.constants()));
    let mut service = BookingFormService::new(repository, merger, renderer);
    match template {
        Some(bytes) => service = service.with_template(bytes),
        None => warn!("FORM_TEMPLATE_PATH not set; PDF generation is disabled"),
    }

    let app = with_application_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "booking form service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
