use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::batch::{BatchPolicy, BatchSettings};
use crate::inference::ArtifactPaths;

const DEFAULT_MODEL_PATH: &str = "artifacts/xgb_model.json";
const DEFAULT_SCALER_PATH: &str = "artifacts/scaler.json";
const DEFAULT_ENCODERS_PATH: &str = "artifacts/label_encoders.json";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub artifacts: ArtifactPaths,
    pub batch: BatchSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let artifacts = ArtifactPaths {
            classifier: path_var("APP_MODEL_PATH", DEFAULT_MODEL_PATH),
            scaler: path_var("APP_SCALER_PATH", DEFAULT_SCALER_PATH),
            encoders: path_var("APP_ENCODERS_PATH", DEFAULT_ENCODERS_PATH),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            artifacts,
            batch: batch_settings()?,
        })
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn batch_settings() -> Result<BatchSettings, ConfigError> {
    let defaults = BatchSettings::default();

    let policy = match env::var("APP_BATCH_POLICY") {
        Ok(value) => BatchPolicy::parse(&value).ok_or(ConfigError::InvalidBatchPolicy(value))?,
        Err(_) => defaults.policy,
    };

    let preview_threshold = match env::var("APP_PREVIEW_THRESHOLD") {
        Ok(value) => value
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|threshold| (0.0..=1.0).contains(threshold))
            .ok_or(ConfigError::InvalidPreviewThreshold)?,
        Err(_) => defaults.preview_threshold,
    };

    let preview_limit = match env::var("APP_PREVIEW_LIMIT") {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidPreviewLimit)?,
        Err(_) => defaults.preview_limit,
    };

    Ok(BatchSettings {
        policy,
        preview_threshold,
        preview_limit,
    })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBatchPolicy(String),
    InvalidPreviewThreshold,
    InvalidPreviewLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBatchPolicy(value) => write!(
                f,
                "APP_BATCH_POLICY must be 'isolate' or 'abort', got '{value}'"
            ),
            ConfigError::InvalidPreviewThreshold => {
                write!(f, "APP_PREVIEW_THRESHOLD must be a number between 0 and 1")
            }
            ConfigError::InvalidPreviewLimit => {
                write!(f, "APP_PREVIEW_LIMIT must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBatchPolicy(_)
            | ConfigError::InvalidPreviewThreshold
            | ConfigError::InvalidPreviewLimit => None,
        }
    }
}
