use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use booking_form::applications::{application_router, BookingFormService, FormRepository};
use booking_form::pdf::PdfMerger;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_application_routes<R, M>(service: Arc<BookingFormService<R, M>>) -> axum::Router
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    application_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryFormRepository;
    use axum::body::Body;
    use axum::http::Request;
    use booking_form::applications::FormRenderer;
    use booking_form::forms::{DocumentRuntime, DocumentRuntimeConfig, LayoutConstants};
    use booking_form::pdf::LopdfMerger;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn router(state: AppState) -> axum::Router {
        let runtime = DocumentRuntime::initialize(DocumentRuntimeConfig::default())
            .expect("runtime initializes");
        let renderer =
            FormRenderer::new(runtime, LayoutConstants::default()).expect("renderer builds");
        let service = Arc::new(BookingFormService::new(
            Arc::new(InMemoryFormRepository::default()),
            Arc::new(LopdfMerger::new(*renderer.constants())),
            renderer,
        ));
        with_application_routes(service).layer(Extension(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = router(app_state(false))
            .oneshot(get("/ready"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");

        let response = router(app_state(true))
            .oneshot(get("/ready"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn metrics_use_prometheus_text_format() {
        let response = router(app_state(true))
            .oneshot(get("/metrics"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn application_routes_are_mounted() {
        let response = router(app_state(true))
            .oneshot(get("/api/v1/applications/form-missing"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
