use std::collections::HashSet;

use tracing::{debug, warn};

use super::advisory::{self, RangeAdvisory};
use super::artifacts::{ArtifactBundle, ArtifactKind, ArtifactLoadError, ArtifactPaths};
use super::classifier::GradientBoostedClassifier;
use super::domain::{ApplicantRecord, EncodedRecord, FeatureVector, PredictionResult};
use super::encoding::EncoderSet;
use super::error::{PipelineError, SchemaMismatch};
use super::schema::{Feature, FeatureSchema};
use super::scaling::ColumnTransform;

/// Immutable encode, scale and classify pipeline built once at startup.
///
/// The classifier's declared feature order is resolved against the schema and
/// the scaler is aligned to it while loading, so scoring never re-derives the
/// column layout.
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    schema: FeatureSchema,
    classifier: GradientBoostedClassifier,
    encoders: EncoderSet,
    columns: Vec<Feature>,
    transforms: Vec<Option<ColumnTransform>>,
}

impl InferencePipeline {
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        Self::new(ArtifactBundle::load(paths)?)
    }

    pub fn new(bundle: ArtifactBundle) -> Result<Self, ArtifactLoadError> {
        let ArtifactBundle {
            classifier,
            scaler,
            encoders,
        } = bundle;

        let mut seen = HashSet::new();
        let columns = classifier
            .feature_names()
            .iter()
            .map(|name| -> Result<Feature, ArtifactLoadError> {
                let feature = Feature::from_name(name).ok_or_else(|| {
                    ArtifactLoadError::invalid(
                        ArtifactKind::Classifier,
                        format!("feature '{name}' is not part of the applicant schema"),
                    )
                })?;
                if !seen.insert(feature) {
                    return Err(ArtifactLoadError::invalid(
                        ArtifactKind::Classifier,
                        format!("feature '{name}' is declared twice"),
                    ));
                }
                Ok(feature)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let transforms = scaler.align(&columns)?;

        Ok(Self {
            schema: FeatureSchema::standard(),
            classifier,
            encoders,
            columns,
            transforms,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Feature order the classifier consumes.
    pub fn columns(&self) -> &[Feature] {
        &self.columns
    }

    pub fn classifier(&self) -> &GradientBoostedClassifier {
        &self.classifier
    }

    /// Fitted classes for a categorical feature.
    pub fn classes(&self, feature: Feature) -> Option<&[String]> {
        self.encoders.table(feature).map(|table| table.classes())
    }

    /// Replaces every categorical label with its encoder code.
    pub fn encode(&self, record: &ApplicantRecord) -> Result<EncodedRecord, PipelineError> {
        let mut encoded = EncodedRecord::new();

        for feature in Feature::ALL {
            let value = match record.label(feature) {
                Some(label) => {
                    let code = self
                        .encoders
                        .table(feature)
                        .and_then(|table| table.code(label))
                        .ok_or_else(|| {
                            warn!(%feature, label, "rejecting unknown category");
                            PipelineError::UnknownCategory {
                                feature,
                                value: label.to_string(),
                            }
                        })?;
                    f64::from(code)
                }
                None => record
                    .numeric(feature)
                    .ok_or_else(|| SchemaMismatch::MissingFeature(feature.name().to_string()))?,
            };
            encoded.insert(feature, value);
        }

        Ok(encoded)
    }

    /// Selects features in classifier order and applies the fitted scaler.
    pub fn reorder_and_scale(
        &self,
        encoded: &EncodedRecord,
    ) -> Result<FeatureVector, PipelineError> {
        let values = self
            .columns
            .iter()
            .zip(&self.transforms)
            .map(|(feature, transform)| -> Result<f32, PipelineError> {
                let raw = encoded
                    .get(*feature)
                    .ok_or_else(|| SchemaMismatch::MissingFeature(feature.name().to_string()))?;
                let scaled = match transform {
                    Some(transform) => transform.apply(raw),
                    None => raw,
                };
                Ok(scaled as f32)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector::new(values))
    }

    pub fn predict(&self, features: &FeatureVector) -> PredictionResult {
        self.classifier.predict(features)
    }

    /// Runs encode, reorder_and_scale and predict for one applicant.
    pub fn predict_record(
        &self,
        record: &ApplicantRecord,
    ) -> Result<PredictionResult, PipelineError> {
        let encoded = self.encode(record)?;
        let features = self.reorder_and_scale(&encoded)?;
        let result = self.predict(&features);
        debug!(
            label = result.label.label(),
            probability = result.probability,
            "scored applicant"
        );
        Ok(result)
    }

    /// Scores every record independently, preserving input order.
    pub fn predict_batch(
        &self,
        records: &[ApplicantRecord],
    ) -> Vec<Result<PredictionResult, PipelineError>> {
        records
            .iter()
            .map(|record| self.predict_record(record))
            .collect()
    }

    pub fn advisories(&self, record: &ApplicantRecord) -> Vec<RangeAdvisory> {
        let advisories = advisory::review(record, &self.schema);
        for note in &advisories {
            warn!(advisory = %note.message(), "input outside suggested range");
        }
        advisories
    }
}
