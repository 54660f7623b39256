use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::artifacts::{ArtifactKind, ArtifactLoadError};
use super::schema::Feature;

/// Fitted per-column numeric transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnTransform {
    /// `(x - mean) / scale`
    Standardize { mean: f64, scale: f64 },
    /// `x * scale + min`
    MinMax { min: f64, scale: f64 },
}

impl ColumnTransform {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            ColumnTransform::Standardize { mean, scale } => (value - mean) / scale,
            ColumnTransform::MinMax { min, scale } => value * scale + min,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScalerDocument {
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
    },
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
    },
}

/// Fitted scaler: one transform per fitted column, optionally named.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerParameters {
    columns: Option<Vec<String>>,
    transforms: Vec<ColumnTransform>,
}

impl ScalerParameters {
    pub fn new(
        columns: Option<Vec<String>>,
        transforms: Vec<ColumnTransform>,
    ) -> Result<Self, ArtifactLoadError> {
        if transforms.is_empty() {
            return Err(ArtifactLoadError::invalid(
                ArtifactKind::Scaler,
                "scaler has no fitted columns",
            ));
        }
        if let Some(names) = &columns {
            if names.len() != transforms.len() {
                return Err(ArtifactLoadError::invalid(
                    ArtifactKind::Scaler,
                    format!(
                        "{} column names for {} fitted columns",
                        names.len(),
                        transforms.len()
                    ),
                ));
            }
        }

        let transforms = transforms
            .into_iter()
            .map(sanitize)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns,
            transforms,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactLoadError> {
        let file = ArtifactLoadError::open(ArtifactKind::Scaler, path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactLoadError> {
        let document: ScalerDocument =
            serde_json::from_reader(reader).map_err(|source| ArtifactLoadError::Json {
                artifact: ArtifactKind::Scaler,
                source,
            })?;

        let (columns, transforms) = match document {
            ScalerDocument::Standard {
                mean,
                scale,
                feature_names_in,
            } => (
                feature_names_in,
                pair_up(mean, scale, |mean, scale| ColumnTransform::Standardize {
                    mean,
                    scale,
                })?,
            ),
            ScalerDocument::MinMax {
                min,
                scale,
                feature_names_in,
            } => (
                feature_names_in,
                pair_up(min, scale, |min, scale| ColumnTransform::MinMax { min, scale })?,
            ),
        };

        Self::new(columns, transforms)
    }

    pub fn column_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Lines the fitted transforms up with the classifier's column order.
    ///
    /// Named scalers may cover a subset of the model's columns; the rest pass
    /// through unchanged. Unnamed scalers must cover every column positionally.
    pub fn align(
        &self,
        model_columns: &[Feature],
    ) -> Result<Vec<Option<ColumnTransform>>, ArtifactLoadError> {
        let mut aligned = vec![None; model_columns.len()];

        match &self.columns {
            Some(names) => {
                for (name, transform) in names.iter().zip(&self.transforms) {
                    let position = Feature::from_name(name)
                        .and_then(|feature| model_columns.iter().position(|col| *col == feature))
                        .ok_or_else(|| {
                            ArtifactLoadError::invalid(
                                ArtifactKind::Scaler,
                                format!("scaled column '{name}' is not a classifier feature"),
                            )
                        })?;
                    aligned[position] = Some(*transform);
                }
            }
            None => {
                if self.transforms.len() != model_columns.len() {
                    return Err(ArtifactLoadError::invalid(
                        ArtifactKind::Scaler,
                        format!(
                            "scaler fitted on {} columns but the classifier expects {}",
                            self.transforms.len(),
                            model_columns.len()
                        ),
                    ));
                }
                for (slot, transform) in aligned.iter_mut().zip(&self.transforms) {
                    *slot = Some(*transform);
                }
            }
        }

        Ok(aligned)
    }
}

fn pair_up<F>(
    offsets: Vec<f64>,
    scales: Vec<f64>,
    build: F,
) -> Result<Vec<ColumnTransform>, ArtifactLoadError>
where
    F: Fn(f64, f64) -> ColumnTransform,
{
    if offsets.len() != scales.len() {
        return Err(ArtifactLoadError::invalid(
            ArtifactKind::Scaler,
            format!(
                "{} offsets but {} scale factors",
                offsets.len(),
                scales.len()
            ),
        ));
    }

    Ok(offsets
        .into_iter()
        .zip(scales)
        .map(|(offset, scale)| build(offset, scale))
        .collect())
}

fn sanitize(transform: ColumnTransform) -> Result<ColumnTransform, ArtifactLoadError> {
    let (offset, scale) = match transform {
        ColumnTransform::Standardize { mean, scale } => (mean, scale),
        ColumnTransform::MinMax { min, scale } => (min, scale),
    };
    if !offset.is_finite() || !scale.is_finite() {
        return Err(ArtifactLoadError::invalid(
            ArtifactKind::Scaler,
            "scaler parameters must be finite",
        ));
    }

    // Constant columns are fitted with a unit scale.
    Ok(match transform {
        ColumnTransform::Standardize { mean, scale } if scale == 0.0 => {
            ColumnTransform::Standardize { mean, scale: 1.0 }
        }
        other => other,
    })
}
