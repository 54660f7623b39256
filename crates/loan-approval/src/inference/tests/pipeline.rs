use std::io::Cursor;

use super::common::*;
use crate::inference::{
    ArtifactBundle, ArtifactKind, ArtifactLoadError, EncoderSet, Feature, GradientBoostedClassifier,
    InferencePipeline, LoanDecision, PipelineError, ScalerParameters, SchemaMismatch,
    DECISION_THRESHOLD,
};

fn approx(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn encode_replaces_labels_with_fitted_codes() {
    let encoded = pipeline().encode(&sample_record()).expect("record encodes");

    assert_eq!(encoded.len(), Feature::COUNT);
    assert_eq!(encoded.get(Feature::PersonGender), Some(1.0));
    assert_eq!(encoded.get(Feature::PersonEducation), Some(1.0));
    assert_eq!(encoded.get(Feature::PersonHomeOwnership), Some(3.0));
    assert_eq!(encoded.get(Feature::PreviousLoanDefaultsOnFile), Some(0.0));
    assert_eq!(encoded.get(Feature::LoanIntent), Some(4.0));
    assert_eq!(encoded.get(Feature::PersonAge), Some(30.0));
    assert_eq!(encoded.get(Feature::LoanPercentIncome), Some(0.2));
}

#[test]
fn unknown_category_names_the_feature() {
    let mut record = sample_record();
    record.person_gender = "other".to_string();

    let error = pipeline().encode(&record).expect_err("unseen label rejected");
    assert_eq!(
        error,
        PipelineError::UnknownCategory {
            feature: Feature::PersonGender,
            value: "other".to_string(),
        }
    );
    assert_eq!(error.field(), Some("person_gender"));
}

#[test]
fn labels_are_case_sensitive() {
    let mut record = sample_record();
    record.person_home_ownership = "rent".to_string();

    assert!(matches!(
        pipeline().predict_record(&record),
        Err(PipelineError::UnknownCategory {
            feature: Feature::PersonHomeOwnership,
            ..
        })
    ));
}

#[test]
fn reorder_follows_model_column_order() {
    let pipeline = pipeline();
    assert_eq!(pipeline.columns()[5], Feature::LoanAmnt);
    assert_eq!(pipeline.columns()[10], Feature::PreviousLoanDefaultsOnFile);

    let encoded = pipeline.encode(&sample_record()).expect("record encodes");
    let vector = pipeline.reorder_and_scale(&encoded).expect("vector builds");

    assert_eq!(vector.len(), Feature::COUNT);
    let values = vector.as_slice();
    approx(values[0], ((30.0 - 27.76) / 6.05) as f32);
    approx(values[1], 0.9);
    approx(values[5], ((10_000.0 - 9_500.0) / 6_300.0) as f32);
    approx(values[10], -1.0);
}

#[test]
fn missing_feature_is_a_schema_mismatch() {
    let pipeline = pipeline();
    let mut encoded = pipeline.encode(&sample_record()).expect("record encodes");
    encoded.remove(Feature::CreditScore);

    assert_eq!(
        pipeline.reorder_and_scale(&encoded),
        Err(PipelineError::SchemaMismatch(SchemaMismatch::MissingFeature(
            "credit_score".to_string()
        )))
    );
}

#[test]
fn scores_reference_applicant() {
    let result = pipeline()
        .predict_record(&sample_record())
        .expect("record scores");

    assert_eq!(result.label, LoanDecision::Approved);
    approx(result.probability, SAMPLE_PROBABILITY);
}

#[test]
fn prior_default_flips_the_decision() {
    let result = pipeline()
        .predict_record(&defaulted_record())
        .expect("record scores");

    assert_eq!(result.label, LoanDecision::Rejected);
    approx(result.probability, 0.320_821_3);
}

#[test]
fn repeated_scoring_is_bit_identical() {
    let pipeline = pipeline();
    let first = pipeline
        .predict_record(&sample_record())
        .expect("record scores");
    let second = pipeline
        .predict_record(&sample_record())
        .expect("record scores");

    assert_eq!(first.probability.to_bits(), second.probability.to_bits());
    assert_eq!(first.label, second.label);
}

#[test]
fn label_agrees_with_probability() {
    let pipeline = pipeline();
    let mut cheaper = sample_record();
    cheaper.loan_int_rate = 9.0;
    cheaper.loan_percent_income = 0.1;
    cheaper.person_income = 90_000.0;
    let mut thin_credit = sample_record();
    thin_credit.loan_int_rate = 9.0;
    thin_credit.credit_score = 580;

    for record in [sample_record(), defaulted_record(), cheaper, thin_credit] {
        let result = pipeline.predict_record(&record).expect("record scores");
        assert!((0.0..=1.0).contains(&result.probability));
        assert_eq!(
            result.is_approved(),
            result.probability > DECISION_THRESHOLD,
            "{record:?}"
        );
    }
}

#[test]
fn out_of_range_values_are_still_scored() {
    let mut record = sample_record();
    record.person_age = 130;
    record.credit_score = 1_200;

    assert!(pipeline().predict_record(&record).is_ok());
    assert_eq!(pipeline().advisories(&record).len(), 2);
}

#[test]
fn batch_preserves_order_and_isolates_failures() {
    let mut unknown = sample_record();
    unknown.loan_intent = "VACATION".to_string();

    let results = pipeline().predict_batch(&[sample_record(), unknown, defaulted_record()]);

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().map(|result| result.label),
        Ok(LoanDecision::Approved)
    );
    assert!(matches!(
        results[1],
        Err(PipelineError::UnknownCategory {
            feature: Feature::LoanIntent,
            ..
        })
    ));
    assert_eq!(
        results[2].as_ref().map(|result| result.label),
        Ok(LoanDecision::Rejected)
    );
}

#[test]
fn empty_batch_yields_empty_results() {
    assert!(pipeline().predict_batch(&[]).is_empty());
}

#[test]
fn model_feature_outside_schema_fails_to_load() {
    let model = MODEL_JSON.replacen("\"person_age\"", "\"applicant_age\"", 1);
    let bundle = ArtifactBundle {
        classifier: GradientBoostedClassifier::from_reader(Cursor::new(model))
            .expect("model still parses"),
        ..bundle()
    };

    match InferencePipeline::new(bundle) {
        Err(error @ ArtifactLoadError::Invalid { .. }) => {
            assert_eq!(error.artifact(), ArtifactKind::Classifier);
            assert!(error.to_string().contains("applicant_age"));
        }
        other => panic!("expected invalid classifier, got {other:?}"),
    }
}

#[test]
fn scaler_must_cover_model_columns_positionally() {
    let scaler = r#"{"kind": "standard", "mean": [1.0, 2.0], "scale": [1.0, 1.0]}"#;
    let bundle = ArtifactBundle {
        scaler: ScalerParameters::from_reader(Cursor::new(scaler)).expect("scaler parses"),
        ..bundle()
    };

    let error = InferencePipeline::new(bundle).expect_err("width mismatch rejected");
    assert_eq!(error.artifact(), ArtifactKind::Scaler);
}

#[test]
fn classes_expose_encoder_domain() {
    let encoders = EncoderSet::from_reader(Cursor::new(ENCODERS_JSON)).expect("encoders load");
    let pipeline = pipeline();

    assert_eq!(
        pipeline.classes(Feature::PreviousLoanDefaultsOnFile),
        Some(&["No".to_string(), "Yes".to_string()][..])
    );
    assert_eq!(pipeline.classes(Feature::CreditScore), None);
    assert_eq!(encoders.len(), Feature::CATEGORICAL.len());
}
