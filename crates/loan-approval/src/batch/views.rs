use std::collections::BTreeMap;

use serde::Serialize;

use super::{BatchReport, BatchRow, BatchSummary, RowError};
use crate::inference::LoanDecision;

/// JSON rendering of a scored upload.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReportView {
    pub summary: BatchSummary,
    pub min_probability: f32,
    pub preview: Vec<PreviewRowView>,
    pub errors: Vec<RowErrorView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewRowView {
    pub row: usize,
    pub values: BTreeMap<String, String>,
    pub label: LoanDecision,
    pub approval_prob: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowErrorView {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub error: String,
}

impl From<&RowError> for RowErrorView {
    fn from(error: &RowError) -> Self {
        Self {
            row: error.row,
            column: error.column().map(str::to_string),
            error: error.error.to_string(),
        }
    }
}

impl BatchReportView {
    pub fn build(report: &BatchReport, min_probability: f32, limit: usize) -> Self {
        let preview = report
            .preview(min_probability, limit)
            .into_iter()
            .filter_map(|row| preview_row(&report.headers, row))
            .collect();

        Self {
            summary: report.summary(),
            min_probability,
            preview,
            errors: report.errors().map(RowErrorView::from).collect(),
        }
    }
}

fn preview_row(headers: &[String], row: &BatchRow) -> Option<PreviewRowView> {
    let prediction = row.prediction()?;
    let values = headers
        .iter()
        .cloned()
        .zip(row.values.iter().cloned())
        .collect();

    Some(PreviewRowView {
        row: row.row,
        values,
        label: prediction.label,
        approval_prob: prediction.probability,
    })
}
