//! Startup loading of the three frozen artifacts.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use super::classifier::GradientBoostedClassifier;
use super::encoding::EncoderSet;
use super::scaling::ScalerParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Classifier,
    Scaler,
    Encoders,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArtifactKind::Classifier => "classifier",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Encoders => "label encoders",
        };
        f.write_str(label)
    }
}

/// Fatal startup failure; the service cannot score anything without all artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("failed to read {artifact} artifact at {}: {source}", .path.display())]
    Io {
        artifact: ArtifactKind,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid {artifact} JSON: {source}")]
    Json {
        artifact: ArtifactKind,
        source: serde_json::Error,
    },
    #[error("invalid {artifact} artifact: {reason}")]
    Invalid {
        artifact: ArtifactKind,
        reason: String,
    },
}

impl ArtifactLoadError {
    pub(crate) fn invalid(artifact: ArtifactKind, reason: impl Into<String>) -> Self {
        Self::Invalid {
            artifact,
            reason: reason.into(),
        }
    }

    pub(crate) fn open(artifact: ArtifactKind, path: &Path) -> Result<std::fs::File, Self> {
        std::fs::File::open(path).map_err(|source| Self::Io {
            artifact,
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn artifact(&self) -> ArtifactKind {
        match self {
            ArtifactLoadError::Io { artifact, .. }
            | ArtifactLoadError::Json { artifact, .. }
            | ArtifactLoadError::Invalid { artifact, .. } => *artifact,
        }
    }
}

/// Locations of the serialized artifacts produced by offline training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub scaler: PathBuf,
    pub encoders: PathBuf,
}

impl ArtifactPaths {
    /// Conventional file names inside one artifact directory.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            classifier: dir.join("xgb_model.json"),
            scaler: dir.join("scaler.json"),
            encoders: dir.join("label_encoders.json"),
        }
    }
}

/// The loaded classifier, scaler and encoders, not yet cross-validated.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub classifier: GradientBoostedClassifier,
    pub scaler: ScalerParameters,
    pub encoders: EncoderSet,
}

impl ArtifactBundle {
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let classifier = GradientBoostedClassifier::from_path(&paths.classifier)?;
        let scaler = ScalerParameters::from_path(&paths.scaler)?;
        let encoders = EncoderSet::from_path(&paths.encoders)?;

        info!(
            trees = classifier.tree_count(),
            features = classifier.feature_names().len(),
            encoders = encoders.len(),
            "loaded inference artifacts"
        );

        Ok(Self {
            classifier,
            scaler,
            encoders,
        })
    }
}
