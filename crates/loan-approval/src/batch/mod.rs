//! Scoring an uploaded CSV of applicants.

mod export;
mod parser;
pub mod views;

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::inference::{InferencePipeline, PipelineError, PredictionResult, SchemaMismatch};

pub use export::{APPROVAL_PROB_COLUMN, PREDICTION_COLUMN};

/// How row-level failures affect the rest of an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Failed rows are reported and every other row is still scored.
    #[default]
    Isolate,
    /// The first failing row rejects the whole upload.
    AbortOnError,
}

impl BatchPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "isolate" | "per_row" | "per-row" => Some(Self::Isolate),
            "abort" | "abort_on_error" | "all_or_nothing" => Some(Self::AbortOnError),
            _ => None,
        }
    }
}

/// Upload handling knobs sourced from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSettings {
    pub policy: BatchPolicy,
    pub preview_threshold: f32,
    pub preview_limit: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            policy: BatchPolicy::Isolate,
            preview_threshold: 0.5,
            preview_limit: 10,
        }
    }
}

/// Failure of one data row (1-based, header excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub error: PipelineError,
}

impl RowError {
    pub fn column(&self) -> Option<&str> {
        self.error.field()
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.error)
    }
}

impl std::error::Error for RowError {}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
    #[error("batch rejected at {0}")]
    Row(RowError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub row: usize,
    /// Cells as uploaded, in the upload's column order.
    pub values: Vec<String>,
    pub outcome: Result<PredictionResult, RowError>,
}

impl BatchRow {
    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.outcome.as_ref().ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    pub approved: usize,
}

/// The uploaded table together with one outcome per row.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub headers: Vec<String>,
    pub rows: Vec<BatchRow>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        self.rows
            .iter()
            .fold(BatchSummary::default(), |mut summary, row| {
                summary.total += 1;
                match &row.outcome {
                    Ok(prediction) => {
                        summary.scored += 1;
                        if prediction.is_approved() {
                            summary.approved += 1;
                        }
                    }
                    Err(_) => summary.failed += 1,
                }
                summary
            })
    }

    /// First `limit` scored rows whose approval probability is at least `min_probability`.
    pub fn preview(&self, min_probability: f32, limit: usize) -> Vec<&BatchRow> {
        self.rows
            .iter()
            .filter(|row| {
                row.prediction()
                    .map(|prediction| prediction.probability >= min_probability)
                    .unwrap_or(false)
            })
            .take(limit)
            .collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = &RowError> {
        self.rows.iter().filter_map(|row| row.outcome.as_ref().err())
    }

    pub fn predictions(&self) -> impl Iterator<Item = Option<&PredictionResult>> {
        self.rows.iter().map(BatchRow::prediction)
    }

    pub fn to_csv(&self) -> Result<String, BatchError> {
        export::write_csv(self)
    }
}

/// Scores CSV uploads against a loaded pipeline.
pub struct BatchScorer<'a> {
    pipeline: &'a InferencePipeline,
    policy: BatchPolicy,
}

impl<'a> BatchScorer<'a> {
    pub fn new(pipeline: &'a InferencePipeline, policy: BatchPolicy) -> Self {
        Self { pipeline, policy }
    }

    pub fn score_path<P: AsRef<Path>>(&self, path: P) -> Result<BatchReport, BatchError> {
        let file = std::fs::File::open(path)?;
        self.score_reader(file)
    }

    pub fn score_reader<R: Read>(&self, reader: R) -> Result<BatchReport, BatchError> {
        let table = parser::read_table(reader)?;

        let mut rows = Vec::with_capacity(table.rows.len());
        for (idx, values) in table.rows.iter().enumerate() {
            let row = idx + 1;
            let outcome = table
                .record(values)
                .map_err(PipelineError::from)
                .and_then(|record| self.pipeline.predict_record(&record))
                .map_err(|error| RowError { row, error });

            if let Err(error) = &outcome {
                if self.policy == BatchPolicy::AbortOnError {
                    warn!(%error, "rejecting batch upload");
                    return Err(BatchError::Row(error.clone()));
                }
                warn!(%error, "skipping batch row");
            }

            rows.push(BatchRow {
                row,
                values: values.clone(),
                outcome,
            });
        }

        let report = BatchReport {
            headers: table.headers,
            rows,
        };
        let summary = report.summary();
        info!(
            total = summary.total,
            scored = summary.scored,
            failed = summary.failed,
            approved = summary.approved,
            "scored batch upload"
        );

        Ok(report)
    }
}
