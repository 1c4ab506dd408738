use crate::applications::FormServiceError;
use crate::config::ConfigError;
use crate::forms::{DocumentRuntimeError, LayoutError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Json(serde_json::Error),
    Layout(LayoutError),
    Runtime(DocumentRuntimeError),
    Form(FormServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Json(err) => write!(f, "invalid form data: {}", err),
            AppError::Layout(err) => write!(f, "layout error: {}", err),
            AppError::Runtime(err) => write!(f, "document runtime error: {}", err),
            AppError::Form(err) => write!(f, "form error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Layout(err) => Some(err),
            AppError::Runtime(err) => Some(err),
            AppError::Form(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Json(_) | AppError::Form(FormServiceError::Dataset(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Layout(_)
            | AppError::Runtime(_)
            | AppError::Form(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<LayoutError> for AppError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl From<DocumentRuntimeError> for AppError {
    fn from(value: DocumentRuntimeError) -> Self {
        Self::Runtime(value)
    }
}

impl From<FormServiceError> for AppError {
    fn from(value: FormServiceError) -> Self {
        Self::Form(value)
    }
}
