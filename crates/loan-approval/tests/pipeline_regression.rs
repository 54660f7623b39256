//! Regression checks for the end-to-end scoring path over the fixture artifacts.
//!
//! The fixtures are a three-tree ensemble, a standard scaler and the fitted
//! label encoders, loaded from disk exactly as the service loads them at startup.

mod common {
    use std::path::PathBuf;

    use loan_approval::inference::{ApplicantRecord, ArtifactPaths, InferencePipeline};

    pub(super) fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    pub(super) fn pipeline() -> InferencePipeline {
        InferencePipeline::load(&ArtifactPaths::in_dir(fixture_dir())).expect("fixtures load")
    }

    pub(super) fn reference_applicant() -> ApplicantRecord {
        serde_json::from_value(serde_json::json!({
            "person_age": 30,
            "person_gender": "male",
            "person_education": "Bachelor",
            "person_income": 50000.0,
            "person_home_ownership": "RENT",
            "loan_amnt": 10000.0,
            "loan_intent": "PERSONAL",
            "loan_int_rate": 15.0,
            "loan_percent_income": 0.2,
            "credit_score": 650,
            "previous_loan_defaults_on_file": "No"
        }))
        .expect("record deserializes")
    }

    pub(super) fn assert_probability(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected probability {expected}, got {actual}"
        );
    }
}

mod scoring {
    use super::common::*;
    use loan_approval::inference::{LoanDecision, DECISION_THRESHOLD};

    #[test]
    fn reference_applicant_is_approved() {
        let result = pipeline()
            .predict_record(&reference_applicant())
            .expect("record scores");

        assert_eq!(result.label, LoanDecision::Approved);
        assert_probability(result.probability, 0.537_429_9);
        assert!(result.probability > DECISION_THRESHOLD);
    }

    #[test]
    fn lower_rate_and_ratio_raise_probability() {
        let mut applicant = reference_applicant();
        applicant.loan_int_rate = 9.0;
        applicant.loan_percent_income = 0.1;
        applicant.person_income = 90_000.0;

        let result = pipeline().predict_record(&applicant).expect("record scores");
        assert_eq!(result.label, LoanDecision::Approved);
        assert_probability(result.probability, 0.679_178_7);
    }

    #[test]
    fn weak_credit_history_is_rejected() {
        let mut applicant = reference_applicant();
        applicant.loan_int_rate = 9.0;
        applicant.credit_score = 580;

        let result = pipeline().predict_record(&applicant).expect("record scores");
        assert_eq!(result.label, LoanDecision::Rejected);
        assert_probability(result.probability, 0.342_989_5);
    }

    #[test]
    fn staged_operations_match_single_call() {
        let pipeline = pipeline();
        let applicant = reference_applicant();

        let encoded = pipeline.encode(&applicant).expect("record encodes");
        let vector = pipeline.reorder_and_scale(&encoded).expect("vector builds");
        let staged = pipeline.predict(&vector);

        let direct = pipeline.predict_record(&applicant).expect("record scores");
        assert_eq!(staged, direct);
    }
}

mod loading {
    use super::common::*;
    use loan_approval::inference::{
        ArtifactKind, ArtifactLoadError, ArtifactPaths, InferencePipeline,
    };

    #[test]
    fn missing_model_file_names_the_artifact() {
        let mut paths = ArtifactPaths::in_dir(fixture_dir());
        paths.classifier = fixture_dir().join("does_not_exist.json");

        match InferencePipeline::load(&paths) {
            Err(error @ ArtifactLoadError::Io { .. }) => {
                assert_eq!(error.artifact(), ArtifactKind::Classifier);
                assert!(error.to_string().contains("does_not_exist.json"));
            }
            other => panic!("expected io failure, got {other:?}"),
        }
    }

    #[test]
    fn wrong_file_for_encoders_is_rejected() {
        let mut paths = ArtifactPaths::in_dir(fixture_dir());
        paths.encoders = paths.scaler.clone();

        let error = InferencePipeline::load(&paths).expect_err("scaler is not an encoder map");
        assert_eq!(error.artifact(), ArtifactKind::Encoders);
    }
}
