use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::forms::FormDataset;
use crate::pdf::PdfMerger;

use super::repository::{ApplicationId, FormRepository, RepositoryError};
use super::service::{BookingFormService, FormServiceError};

/// Router builder exposing HTTP endpoints for intake, preview and PDF generation.
pub fn application_router<R, M>(service: Arc<BookingFormService<R, M>>) -> Router
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<R, M>))
        .route(
            "/api/v1/applications/:application_id",
            get(fetch_handler::<R, M>).put(update_handler::<R, M>),
        )
        .route(
            "/api/v1/applications/:application_id/preview",
            get(preview_handler::<R, M>),
        )
        .route(
            "/api/v1/applications/:application_id/pages/:page",
            get(page_handler::<R, M>),
        )
        .route(
            "/api/v1/applications/:application_id/pdf",
            get(pdf_handler::<R, M>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, M>(
    State(service): State<Arc<BookingFormService<R, M>>>,
    axum::Json(dataset): axum::Json<FormDataset>,
) -> Response
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    match service.submit(dataset) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(FormServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "application already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => failure(other),
    }
}

pub(crate) async fn fetch_handler<R, M>(
    State(service): State<Arc<BookingFormService<R, M>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn update_handler<R, M>(
    State(service): State<Arc<BookingFormService<R, M>>>,
    Path(application_id): Path<String>,
    axum::Json(dataset): axum::Json<FormDataset>,
) -> Response
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    match service.update(&ApplicationId(application_id), dataset) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn preview_handler<R, M>(
    State(service): State<Arc<BookingFormService<R, M>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    match service.preview(&ApplicationId(application_id)) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn page_handler<R, M>(
    State(service): State<Arc<BookingFormService<R, M>>>,
    Path((application_id, page)): Path<(String, u32)>,
) -> Response
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    match service.document_page(&ApplicationId(application_id), page) {
        Ok(fragment) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            fragment.html,
        )
            .into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn pdf_handler<R, M>(
    State(service): State<Arc<BookingFormService<R, M>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    M: PdfMerger + 'static,
{
    match service.generate_pdf(&ApplicationId(application_id)) {
        Ok(generated) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/pdf")],
            generated.bytes,
        )
            .into_response(),
        Err(error) => failure(error),
    }
}

fn failure(error: FormServiceError) -> Response {
    let status = match &error {
        FormServiceError::Dataset(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FormServiceError::Repository(RepositoryError::NotFound)
        | FormServiceError::PageNotDesignated(_)
        | FormServiceError::PageOmitted(_) => StatusCode::NOT_FOUND,
        FormServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        FormServiceError::TemplateMissing => StatusCode::SERVICE_UNAVAILABLE,
        FormServiceError::Merge(_) => StatusCode::BAD_GATEWAY,
        FormServiceError::Repository(RepositoryError::Unavailable(_))
        | FormServiceError::Layout(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
