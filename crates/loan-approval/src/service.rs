use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::batch::{BatchError, BatchReport, BatchScorer, BatchSettings};
use crate::feedback::{self, FeedbackAcknowledgement, FeedbackError, FeedbackSubmission};
use crate::inference::{
    ApplicantRecord, Feature, FeatureKind, InferencePipeline, LoanDecision, PipelineError,
    RangeAdvisory, SuggestedRange,
};

/// Facade over the loaded pipeline shared by the HTTP router and the CLI.
pub struct PredictionService {
    pipeline: Arc<InferencePipeline>,
    settings: BatchSettings,
}

/// Outcome of scoring one applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub label: LoanDecision,
    pub probability: f32,
    pub approved: bool,
    pub summary: &'static str,
    pub advisories: Vec<AdvisoryView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryView {
    #[serde(flatten)]
    pub advisory: RangeAdvisory,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaView {
    pub fields: Vec<FieldView>,
    pub model_columns: Vec<Feature>,
    pub decision_threshold: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: Feature,
    pub kind: FeatureKind,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_range: Option<SuggestedRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

impl PredictionService {
    pub fn new(pipeline: Arc<InferencePipeline>, settings: BatchSettings) -> Self {
        Self { pipeline, settings }
    }

    pub fn pipeline(&self) -> &InferencePipeline {
        &self.pipeline
    }

    pub fn settings(&self) -> BatchSettings {
        self.settings
    }

    /// Scores the record first; advisories are only reviewed for records that score.
    pub fn predict(&self, record: &ApplicantRecord) -> Result<PredictionResponse, PipelineError> {
        let result = self.pipeline.predict_record(record)?;
        let advisories = self
            .pipeline
            .advisories(record)
            .into_iter()
            .map(|advisory| AdvisoryView {
                message: advisory.message(),
                advisory,
            })
            .collect();

        Ok(PredictionResponse {
            label: result.label,
            probability: result.probability,
            approved: result.is_approved(),
            summary: result.label.summary(),
            advisories,
        })
    }

    pub fn score_batch<R: Read>(&self, upload: R) -> Result<BatchReport, BatchError> {
        BatchScorer::new(&self.pipeline, self.settings.policy).score_reader(upload)
    }

    pub fn feedback(
        &self,
        submission: FeedbackSubmission,
    ) -> Result<FeedbackAcknowledgement, FeedbackError> {
        feedback::acknowledge(submission, Utc::now())
    }

    pub fn schema(&self) -> SchemaView {
        let fields = self
            .pipeline
            .schema()
            .fields()
            .iter()
            .map(|spec| FieldView {
                name: spec.feature,
                kind: spec.kind,
                description: spec.description,
                suggested_range: spec.suggested_range,
                classes: self
                    .pipeline
                    .classes(spec.feature)
                    .map(<[String]>::to_vec)
                    .unwrap_or_default(),
            })
            .collect();

        SchemaView {
            fields,
            model_columns: self.pipeline.columns().to_vec(),
            decision_threshold: crate::inference::DECISION_THRESHOLD,
        }
    }
}
