//! Predictor port: Traits for the pre-trained classifier.
//!
//! The classifier is an external artifact. The pipeline only needs two
//! capabilities from it: load once, then map a feature vector to a
//! probability.

use std::path::PathBuf;
use std::sync::Arc;

/// Failure to obtain a usable predictor.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Model artifact digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Model features {model:?} do not match input features {input:?}")]
    FeatureMismatch {
        model: Vec<String>,
        input: Vec<String>,
    },
}

/// Failure while scoring one feature vector.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Feature count mismatch: got {got}, expected {expected}")]
    ShapeMismatch { got: usize, expected: usize },

    #[error("Non-finite value for feature {0}")]
    NonFiniteInput(String),

    #[error("Model produced invalid probability {0}")]
    InvalidOutput(f64),

    #[error("Inference backend failed: {0}")]
    Backend(String),
}

/// A loaded classifier.
///
/// Implementations must be safe for concurrent read-only use.
pub trait Predictor: Send + Sync {
    /// Feature names the model was trained on, in input order.
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class for one ordered feature vector.
    ///
    /// # Errors
    /// Returns `InferenceError` if the vector is rejected or the output is
    /// not a probability.
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

/// Source of a predictor with an explicit load boundary.
pub trait ModelProvider: Send + Sync {
    type Model: Predictor;

    /// Load the model, or return the cached one.
    ///
    /// # Errors
    /// Returns `ModelError` if the artifact cannot be loaded.
    fn load(&self) -> Result<Arc<Self::Model>, ModelError>;
}

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn feature_names(&self) -> &[String] {
        (**self).feature_names()
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        (**self).predict_probability(features)
    }
}
