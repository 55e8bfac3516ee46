//! # cardiorisk
//!
//! Screening pipeline for cardiovascular risk.
//!
//! This crate provides:
//! - Feature normalization from raw clinical inputs
//! - Inference against an externally trained classifier artifact
//! - A threshold decision plus an ordinal risk-zone label
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientInput, feature vectors, RiskZone, ScoreResult)
//! - `ports`: Trait definitions for the external classifier
//! - `adapters`: Concrete implementations (JSON model artifacts, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Startup configuration and tool presets

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{AssessmentService, RiskScorer};
pub use config::{PipelineConfig, ToolVariant};
pub use domain::{NormalizedFeatureVector, PatientInput, RiskZone, ScoreResult};

/// Result type for screening operations
pub type Result<T> = std::result::Result<T, RiskError>;

/// Main error type for the screening pipeline
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] ports::ModelError),

    #[error("Inference failed: {0}")]
    InferenceFailure(#[from] ports::InferenceError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RiskError {
    pub(crate) fn validation(errors: Vec<String>) -> Self {
        Self::Validation(errors.join("; "))
    }
}
