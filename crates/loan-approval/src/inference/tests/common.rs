use std::io::Cursor;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::batch::BatchSettings;
use crate::inference::{
    ApplicantRecord, ArtifactBundle, EncoderSet, GradientBoostedClassifier, InferencePipeline,
    ScalerParameters,
};
use crate::service::PredictionService;

pub(crate) const MODEL_JSON: &str = include_str!("../../../tests/fixtures/xgb_model.json");
pub(crate) const SCALER_JSON: &str = include_str!("../../../tests/fixtures/scaler.json");
pub(crate) const ENCODERS_JSON: &str =
    include_str!("../../../tests/fixtures/label_encoders.json");

/// Probability the fixture artifacts assign to [`sample_record`].
pub(crate) const SAMPLE_PROBABILITY: f32 = 0.537_429_9;

pub(crate) fn bundle() -> ArtifactBundle {
    ArtifactBundle {
        classifier: GradientBoostedClassifier::from_reader(Cursor::new(MODEL_JSON))
            .expect("fixture model loads"),
        scaler: ScalerParameters::from_reader(Cursor::new(SCALER_JSON))
            .expect("fixture scaler loads"),
        encoders: EncoderSet::from_reader(Cursor::new(ENCODERS_JSON))
            .expect("fixture encoders load"),
    }
}

pub(crate) fn pipeline() -> InferencePipeline {
    InferencePipeline::new(bundle()).expect("fixture pipeline builds")
}

pub(crate) fn service() -> PredictionService {
    PredictionService::new(Arc::new(pipeline()), BatchSettings::default())
}

pub(crate) fn sample_record() -> ApplicantRecord {
    ApplicantRecord {
        person_age: 30,
        person_gender: "male".to_string(),
        person_education: "Bachelor".to_string(),
        person_income: 50_000.0,
        person_home_ownership: "RENT".to_string(),
        previous_loan_defaults_on_file: "No".to_string(),
        loan_amnt: 10_000.0,
        loan_int_rate: 15.0,
        loan_percent_income: 0.2,
        credit_score: 650,
        loan_intent: "PERSONAL".to_string(),
    }
}

pub(crate) fn defaulted_record() -> ApplicantRecord {
    ApplicantRecord {
        previous_loan_defaults_on_file: "Yes".to_string(),
        ..sample_record()
    }
}

pub(crate) fn csv_header() -> &'static str {
    "person_age,person_gender,person_education,person_income,person_home_ownership,loan_amnt,loan_intent,loan_int_rate,loan_percent_income,credit_score,previous_loan_defaults_on_file"
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(crate) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
