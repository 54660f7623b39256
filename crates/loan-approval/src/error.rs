use crate::batch::BatchError;
use crate::config::ConfigError;
use crate::feedback::FeedbackError;
use crate::inference::{ArtifactLoadError, PipelineError, SchemaMismatch};
use crate::telemetry::TelemetryError;
use axum::extract::rejection::JsonRejection;
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
    Artifacts(ArtifactLoadError),
    Batch(BatchError),
    Pipeline(PipelineError),
    Feedback(FeedbackError),
    Request(JsonRejection),
    InvalidQuery(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Artifacts(err) => write!(f, "artifact error: {}", err),
            AppError::Batch(err) => write!(f, "batch error: {}", err),
            AppError::Pipeline(err) => write!(f, "prediction error: {}", err),
            AppError::Feedback(err) => write!(f, "feedback error: {}", err),
            AppError::Request(err) => write!(f, "request error: {}", err),
            AppError::InvalidQuery(message) => write!(f, "invalid query: {}", message),
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
            AppError::Artifacts(err) => Some(err),
            AppError::Batch(err) => Some(err),
            AppError::Pipeline(err) => Some(err),
            AppError::Feedback(err) => Some(err),
            AppError::Request(err) => Some(err),
            AppError::InvalidQuery(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Pipeline(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string(), "field": err.field() }),
            ),
            AppError::Feedback(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string(), "field": "rating" }),
            ),
            AppError::Batch(BatchError::Schema(mismatch)) => {
                let mut body = json!({
                    "error": mismatch.to_string(),
                    "column": mismatch.column(),
                });
                if let SchemaMismatch::MissingColumns(columns) = &mismatch {
                    body["missing_columns"] = json!(columns);
                }
                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            AppError::Batch(BatchError::Row(row_error)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": row_error.to_string(),
                    "row": row_error.row,
                    "column": row_error.column(),
                }),
            ),
            AppError::Batch(err @ BatchError::Csv(_)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
            }
            AppError::Request(rejection) => (
                rejection.status(),
                json!({ "error": rejection.body_text() }),
            ),
            AppError::InvalidQuery(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            err @ (AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Artifacts(_)
            | AppError::Batch(BatchError::Io(_))) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
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

impl From<ArtifactLoadError> for AppError {
    fn from(value: ArtifactLoadError) -> Self {
        Self::Artifacts(value)
    }
}

impl From<BatchError> for AppError {
    fn from(value: BatchError) -> Self {
        Self::Batch(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<FeedbackError> for AppError {
    fn from(value: FeedbackError) -> Self {
        Self::Feedback(value)
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self::Request(value)
    }
}
