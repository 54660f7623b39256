use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::batch::views::BatchReportView;
use crate::error::AppError;
use crate::feedback::FeedbackSubmission;
use crate::inference::{ApplicantRecord, PipelineError};
use crate::service::PredictionService;

const CSV_ATTACHMENT: &str = "attachment; filename=\"loan_predictions.csv\"";

/// Router builder exposing scoring, batch upload and feedback endpoints.
pub fn prediction_router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/api/v1/schema", get(schema_handler))
        .route("/api/v1/predictions", post(predict_handler))
        .route("/api/v1/predictions/batch", post(batch_handler))
        .route("/api/v1/feedback", post(feedback_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchQuery {
    #[serde(default)]
    pub format: BatchFormat,
    pub min_probability: Option<f32>,
    pub limit: Option<usize>,
}

pub(crate) async fn schema_handler(State(service): State<Arc<PredictionService>>) -> Response {
    (StatusCode::OK, axum::Json(service.schema())).into_response()
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<PredictionService>>,
    payload: Result<axum::Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let axum::Json(value) = payload?;
    let record = ApplicantRecord::from_json(value).map_err(PipelineError::from)?;
    let response = service.predict(&record)?;
    Ok((StatusCode::OK, axum::Json(response)).into_response())
}

pub(crate) async fn batch_handler(
    State(service): State<Arc<PredictionService>>,
    Query(query): Query<BatchQuery>,
    body: String,
) -> Result<Response, AppError> {
    let settings = service.settings();
    let min_probability = query.min_probability.unwrap_or(settings.preview_threshold);
    if !(0.0..=1.0).contains(&min_probability) {
        return Err(AppError::InvalidQuery(
            "min_probability must be between 0 and 1".to_string(),
        ));
    }

    let report = service.score_batch(body.as_bytes())?;

    match query.format {
        BatchFormat::Json => {
            let limit = query.limit.unwrap_or(settings.preview_limit);
            let view = BatchReportView::build(&report, min_probability, limit);
            Ok((StatusCode::OK, axum::Json(view)).into_response())
        }
        BatchFormat::Csv => {
            let csv = report.to_csv()?;
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (header::CONTENT_DISPOSITION, CSV_ATTACHMENT),
                ],
                csv,
            )
                .into_response())
        }
    }
}

pub(crate) async fn feedback_handler(
    State(service): State<Arc<PredictionService>>,
    axum::Json(submission): axum::Json<FeedbackSubmission>,
) -> Result<Response, AppError> {
    let ack = service.feedback(submission)?;
    Ok((StatusCode::OK, axum::Json(ack)).into_response())
}
