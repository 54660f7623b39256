//! Loan approval scoring over frozen training artifacts, with batch CSV
//! scoring, an HTTP router and the ambient config and telemetry bootstrap.

pub mod batch;
pub mod config;
pub mod error;
pub mod feedback;
pub mod inference;
pub mod router;
pub mod service;
pub mod telemetry;

pub use router::prediction_router;
pub use service::PredictionService;
