use crate::cli::ArtifactArgs;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::inference::InferencePipeline;
use loan_approval::PredictionService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Environment configuration with command line artifact paths layered on top.
pub(crate) fn load_config(artifacts: ArtifactArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    apply_artifact_overrides(&mut config, artifacts);
    Ok(config)
}

fn apply_artifact_overrides(config: &mut AppConfig, artifacts: ArtifactArgs) {
    let ArtifactArgs {
        model,
        scaler,
        encoders,
    } = artifacts;

    if let Some(model) = model {
        config.artifacts.classifier = model;
    }
    if let Some(scaler) = scaler {
        config.artifacts.scaler = scaler;
    }
    if let Some(encoders) = encoders {
        config.artifacts.encoders = encoders;
    }
}

/// Loads every artifact once; any failure stops startup.
pub(crate) fn load_service(config: &AppConfig) -> Result<PredictionService, AppError> {
    let pipeline = InferencePipeline::load(&config.artifacts)?;
    Ok(PredictionService::new(Arc::new(pipeline), config.batch))
}
