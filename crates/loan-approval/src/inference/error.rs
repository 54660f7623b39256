use super::schema::Feature;

/// Per-request failure raised while turning an applicant into a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown category '{value}' for {feature}")]
    UnknownCategory { feature: Feature, value: String },
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),
}

impl PipelineError {
    /// Column the failure points at, when there is a single one.
    pub fn field(&self) -> Option<&str> {
        match self {
            PipelineError::UnknownCategory { feature, .. } => Some(feature.name()),
            PipelineError::SchemaMismatch(mismatch) => mismatch.column(),
        }
    }
}

/// Input that does not line up with the feature schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaMismatch {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("record is missing feature '{0}'")]
    MissingFeature(String),
    #[error("column {column} has unparseable value '{value}'")]
    UnparseableValue { column: String, value: String },
    #[error("column {column} is empty")]
    EmptyValue { column: String },
    #[error("row {row} has {found} cells but the header has {expected}")]
    ExtraCells {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid applicant record: {0}")]
    InvalidRecord(String),
}

impl SchemaMismatch {
    pub fn column(&self) -> Option<&str> {
        match self {
            SchemaMismatch::MissingColumns(columns) if columns.len() == 1 => {
                columns.first().map(String::as_str)
            }
            SchemaMismatch::MissingColumns(_) => None,
            SchemaMismatch::MissingFeature(feature) => Some(feature),
            SchemaMismatch::UnparseableValue { column, .. } => Some(column),
            SchemaMismatch::EmptyValue { column } => Some(column),
            SchemaMismatch::ExtraCells { .. } | SchemaMismatch::InvalidRecord(_) => None,
        }
    }
}
