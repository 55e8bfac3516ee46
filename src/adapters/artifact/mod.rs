//! Model artifact adapter: JSON-exported classifiers loaded from disk.
//!
//! Two artifact kinds are understood:
//! - `logistic`: standardized linear model with a sigmoid link
//! - `gradient_boosting`: additive regression trees over log-odds
//!
//! # Loading
//!
//! `FileModelProvider` reads the artifact on the first `load()` and caches
//! the parsed model for the provider's lifetime. Later calls hand out the
//! same `Arc`. The parsed model is immutable, so concurrent inference needs
//! no locking.
//!
//! # Integrity
//!
//! When an expected SHA-256 digest is configured the raw artifact bytes are
//! hashed before parsing and a mismatch is reported as `ModelError`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ports::{InferenceError, ModelError, ModelProvider, Predictor};

/// Upper bound on model width; the screening tools use 12 and 15 columns.
const MAX_FEATURES: usize = 64;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sha256_hex_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Logistic regression parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Standard-scaler means; omitted when the model was fitted on raw features
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler_mean: Option<Vec<f64>>,
    /// Standard-scaler deviations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler_scale: Option<Vec<f64>>,
}

impl LogisticModel {
    fn check(&self) -> Result<(), String> {
        let n = self.feature_names.len();
        if self.coefficients.len() != n {
            return Err(format!(
                "coefficients has {} entries for {n} features",
                self.coefficients.len()
            ));
        }
        match (&self.scaler_mean, &self.scaler_scale) {
            (None, None) => {}
            (Some(mean), Some(scale)) => {
                if mean.len() != n || scale.len() != n {
                    return Err("scaler lengths do not match feature_names length".into());
                }
                if scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                    return Err("scaler_scale entries must be finite and non-zero".into());
                }
            }
            _ => return Err("scaler_mean and scaler_scale must be given together".into()),
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("model parameters must be finite".into());
        }
        Ok(())
    }

    fn log_odds(&self, features: &[f64]) -> f64 {
        let mut z = self.intercept;
        for (i, (x, w)) in features.iter().zip(&self.coefficients).enumerate() {
            let x = match (&self.scaler_mean, &self.scaler_scale) {
                (Some(mean), Some(scale)) => (x - mean[i]) / scale[i],
                _ => *x,
            };
            z += w * x;
        }
        z
    }
}

/// Flat-array regression tree. `x[feature] <= threshold` goes left; a
/// negative feature index marks a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub feature: Vec<i32>,
    pub threshold: Vec<f64>,
    pub left: Vec<i32>,
    pub right: Vec<i32>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    /// Children must point strictly forward, which rules out cycles.
    fn check(&self, n_features: usize) -> Result<(), String> {
        let n = self.feature.len();
        if n == 0 {
            return Err("empty tree".into());
        }
        if self.threshold.len() != n
            || self.left.len() != n
            || self.right.len() != n
            || self.value.len() != n
        {
            return Err("inconsistent tree array lengths".into());
        }
        for idx in 0..n {
            let feature = self.feature[idx];
            if feature < 0 {
                continue;
            }
            if feature as usize >= n_features {
                return Err(format!("node {idx} splits on unknown feature {feature}"));
            }
            for child in [self.left[idx], self.right[idx]] {
                if child <= idx as i32 || child as usize >= n {
                    return Err(format!("node {idx} has invalid child {child}"));
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_sign_loss)]
    fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let feature = self.feature[idx];
            if feature < 0 {
                return self.value[idx];
            }
            idx = if features[feature as usize] <= self.threshold[idx] {
                self.left[idx] as usize
            } else {
                self.right[idx] as usize
            };
        }
    }
}

/// Gradient-boosted trees for binary classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingModel {
    pub feature_names: Vec<String>,
    /// Baseline log-odds
    pub init_score: f64,
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

impl GradientBoostingModel {
    fn check(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("gradient boosting model has no trees".into());
        }
        if !self.init_score.is_finite() || !self.learning_rate.is_finite() {
            return Err("model parameters must be finite".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check(self.feature_names.len())
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    fn log_odds(&self, features: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        self.init_score + self.learning_rate * boost
    }
}

/// A classifier exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportedModel {
    Logistic(LogisticModel),
    GradientBoosting(GradientBoostingModel),
}

impl ExportedModel {
    /// Parse and sanity-check an artifact.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidArtifact` on malformed JSON or
    /// inconsistent parameters.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_slice(bytes)
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?;

        let n = model.feature_names().len();
        if n == 0 || n > MAX_FEATURES {
            return Err(ModelError::InvalidArtifact(format!(
                "Invalid feature count in model: got {n}, max {MAX_FEATURES}"
            )));
        }

        match &model {
            Self::Logistic(m) => m.check(),
            Self::GradientBoosting(m) => m.check(),
        }
        .map_err(ModelError::InvalidArtifact)?;

        Ok(model)
    }

    /// Short name of the artifact kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Logistic(_) => "logistic",
            Self::GradientBoosting(_) => "gradient_boosting",
        }
    }
}

impl Predictor for ExportedModel {
    fn feature_names(&self) -> &[String] {
        match self {
            Self::Logistic(m) => &m.feature_names,
            Self::GradientBoosting(m) => &m.feature_names,
        }
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let names = self.feature_names();
        if features.len() != names.len() {
            return Err(InferenceError::ShapeMismatch {
                got: features.len(),
                expected: names.len(),
            });
        }
        if let Some(i) = features.iter().position(|x| !x.is_finite()) {
            return Err(InferenceError::NonFiniteInput(names[i].clone()));
        }

        let z = match self {
            Self::Logistic(m) => m.log_odds(features),
            Self::GradientBoosting(m) => m.log_odds(features),
        };
        let probability = sigmoid(z);

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::InvalidOutput(probability));
        }
        Ok(probability)
    }
}

/// Loads an `ExportedModel` from a file path, once.
pub struct FileModelProvider {
    path: PathBuf,
    expected_sha256: Option<String>,
    cached: Mutex<Option<Arc<ExportedModel>>>,
}

impl FileModelProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expected_sha256: None,
            cached: Mutex::new(None),
        }
    }

    /// Require the artifact bytes to hash to `digest` (hex SHA-256).
    #[must_use]
    pub fn with_expected_sha256(mut self, digest: impl Into<String>) -> Self {
        self.expected_sha256 = Some(digest.into().to_ascii_lowercase());
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the artifact has already been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn read_artifact(&self) -> Result<ExportedModel, ModelError> {
        if !self.path.is_file() {
            return Err(ModelError::NotFound(self.path.clone()));
        }
        let bytes = std::fs::read(&self.path).map_err(|source| ModelError::Io {
            path: self.path.clone(),
            source,
        })?;

        if let Some(expected) = &self.expected_sha256 {
            let actual = sha256_hex_bytes(&bytes);
            if &actual != expected {
                return Err(ModelError::DigestMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let model = ExportedModel::from_json(&bytes)?;
        tracing::info!(
            "Loaded {} model from {:?} (n_features={})",
            model.kind(),
            self.path,
            model.feature_names().len()
        );
        Ok(model)
    }
}

impl ModelProvider for FileModelProvider {
    type Model = ExportedModel;

    fn load(&self) -> Result<Arc<ExportedModel>, ModelError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = cached.as_ref() {
            return Ok(Arc::clone(model));
        }
        let model = Arc::new(self.read_artifact()?);
        *cached = Some(Arc::clone(&model));
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn logistic(n: usize) -> LogisticModel {
        LogisticModel {
            feature_names: (0..n).map(|i| format!("x{i}")).collect(),
            coefficients: vec![0.0; n],
            intercept: 0.0,
            scaler_mean: None,
            scaler_scale: None,
        }
    }

    fn stump() -> RegressionTree {
        RegressionTree {
            feature: vec![0, -1, -1],
            threshold: vec![0.5, 0.0, 0.0],
            left: vec![1, -1, -1],
            right: vec![2, -1, -1],
            value: vec![0.0, -2.0, 2.0],
        }
    }

    fn write_model(path: &Path, model: &ExportedModel) -> Vec<u8> {
        let bytes = serde_json::to_vec(model).expect("serialize model");
        std::fs::write(path, &bytes).expect("write model");
        bytes
    }

    #[test]
    fn test_logistic_zero_weights_is_one_half() {
        let model = ExportedModel::Logistic(logistic(3));
        let p = model
            .predict_probability(&[1.0, 2.0, 3.0])
            .expect("Should predict");
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_with_scaler() {
        let model = ExportedModel::Logistic(LogisticModel {
            coefficients: vec![1.0, 0.0],
            scaler_mean: Some(vec![10.0, 0.0]),
            scaler_scale: Some(vec![2.0, 1.0]),
            ..logistic(2)
        });
        // (12 - 10) / 2 = 1 -> sigmoid(1)
        let p = model.predict_probability(&[12.0, 5.0]).expect("Should predict");
        assert!((p - sigmoid(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_boosting_stump() {
        let model = ExportedModel::GradientBoosting(GradientBoostingModel {
            feature_names: vec!["x".into()],
            init_score: 0.0,
            learning_rate: 0.5,
            trees: vec![stump()],
        });
        let low = model.predict_probability(&[0.2]).expect("Should predict");
        let high = model.predict_probability(&[0.9]).expect("Should predict");
        assert!((low - sigmoid(-1.0)).abs() < 1e-12);
        assert!((high - sigmoid(1.0)).abs() < 1e-12);
        // Split is inclusive on the left.
        let edge = model.predict_probability(&[0.5]).expect("Should predict");
        assert!((edge - low).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = ExportedModel::Logistic(logistic(12));
        let err = model.predict_probability(&[0.0; 11]).expect_err("Should reject");
        assert!(matches!(
            err,
            InferenceError::ShapeMismatch {
                got: 11,
                expected: 12
            }
        ));
    }

    #[test]
    fn test_non_finite_input() {
        let model = ExportedModel::Logistic(logistic(2));
        let err = model
            .predict_probability(&[0.0, f64::NAN])
            .expect_err("Should reject");
        assert!(matches!(err, InferenceError::NonFiniteInput(name) if name == "x1"));
    }

    #[test]
    fn test_rejects_inconsistent_artifacts() {
        let mut bad = logistic(3);
        bad.coefficients.pop();
        let bytes = serde_json::to_vec(&ExportedModel::Logistic(bad)).expect("serialize");
        assert!(matches!(
            ExportedModel::from_json(&bytes),
            Err(ModelError::InvalidArtifact(_))
        ));

        let mut cyclic = stump();
        cyclic.left[0] = 0;
        let gbm = ExportedModel::GradientBoosting(GradientBoostingModel {
            feature_names: vec!["x".into()],
            init_score: 0.0,
            learning_rate: 0.1,
            trees: vec![cyclic],
        });
        let bytes = serde_json::to_vec(&gbm).expect("serialize");
        assert!(ExportedModel::from_json(&bytes).is_err());

        assert!(ExportedModel::from_json(b"{\"kind\":\"svm\"}").is_err());
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let temp = tempdir().expect("tempdir");
        let provider = FileModelProvider::new(temp.path().join("missing.json"));
        assert!(matches!(provider.load(), Err(ModelError::NotFound(_))));
        assert!(!provider.is_loaded());
    }

    #[test]
    fn test_load_is_cached() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        write_model(&path, &ExportedModel::Logistic(logistic(12)));

        let provider = FileModelProvider::new(&path);
        let first = provider.load().expect("Should load");

        // Removing the file must not matter once loaded.
        std::fs::remove_file(&path).expect("remove");
        let second = provider.load().expect("Should reuse cache");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(provider.is_loaded());
    }

    #[test]
    fn test_digest_check() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        let bytes = write_model(&path, &ExportedModel::Logistic(logistic(2)));

        let good = FileModelProvider::new(&path)
            .with_expected_sha256(sha256_hex_bytes(&bytes).to_uppercase());
        assert!(good.load().is_ok());

        let bad = FileModelProvider::new(&path).with_expected_sha256("00".repeat(32));
        assert!(matches!(bad.load(), Err(ModelError::DigestMismatch { .. })));
    }
}
