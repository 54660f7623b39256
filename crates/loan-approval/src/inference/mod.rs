//! Applicant encoding, scaling and classification over frozen training artifacts.

pub mod advisory;
pub mod artifacts;
pub mod classifier;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod pipeline;
pub mod scaling;
pub mod schema;

#[cfg(test)]
pub(crate) mod tests;

pub use advisory::{suggested_loan_percent_income, RangeAdvisory};
pub use artifacts::{ArtifactBundle, ArtifactKind, ArtifactLoadError, ArtifactPaths};
pub use classifier::{GradientBoostedClassifier, DECISION_THRESHOLD};
pub use domain::{ApplicantRecord, EncodedRecord, FeatureVector, LoanDecision, PredictionResult};
pub use encoding::{EncoderSet, EncoderTable};
pub use error::{PipelineError, SchemaMismatch};
pub use pipeline::InferencePipeline;
pub use scaling::{ColumnTransform, ScalerParameters};
pub use schema::{Feature, FeatureKind, FeatureSchema, FeatureSpec, SuggestedRange};
