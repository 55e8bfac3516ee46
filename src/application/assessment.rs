//! Assessment service: Orchestrates one screening request.
//!
//! This service coordinates:
//! - Input validation
//! - Feature normalization
//! - Model loading (through the provider's cache)
//! - Scoring and zone bucketing

use std::sync::Arc;

use crate::application::RiskScorer;
use crate::domain::{ClinicalInput, ModelFeatures, ScoreResult};
use crate::ports::{ModelError, ModelProvider, Predictor};
use crate::{Result, RiskError};

/// Service running the screening pipeline against an injected model provider.
pub struct AssessmentService<P>
where
    P: ModelProvider,
{
    provider: Arc<P>,
    scorer: RiskScorer,
}

impl<P> AssessmentService<P>
where
    P: ModelProvider,
{
    /// Create a new assessment service.
    pub fn new(provider: Arc<P>, scorer: RiskScorer) -> Self {
        Self { provider, scorer }
    }

    #[must_use]
    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Load the model up front and check it was trained on `I`'s features.
    ///
    /// Callers that require scoring should treat an error here as fatal.
    ///
    /// # Errors
    /// Returns `RiskError::ModelUnavailable` if the artifact cannot be
    /// loaded or its feature list differs.
    pub fn initialize<I: ClinicalInput>(&self) -> Result<()> {
        tracing::info!("Initializing assessment service...");
        let model = self.load_checked::<I::Features>()?;
        tracing::info!(
            "Model ready: {} features, threshold={:.2}",
            model.feature_names().len(),
            self.scorer.threshold()
        );
        Ok(())
    }

    fn load_checked<V: ModelFeatures>(&self) -> std::result::Result<Arc<P::Model>, ModelError> {
        let model = self.provider.load()?;
        let names = model.feature_names();
        let expected = V::feature_names();
        if names.len() != expected.len() || names.iter().zip(expected).any(|(a, b)| a != b) {
            return Err(ModelError::FeatureMismatch {
                model: names.to_vec(),
                input: expected.iter().map(|s| (*s).to_string()).collect(),
            });
        }
        Ok(model)
    }

    /// Run the full pipeline on one input.
    ///
    /// Performs:
    /// 1. Validate the input against its collection domains
    /// 2. Normalize into the model's feature vector
    /// 3. Obtain the (cached) model
    /// 4. Score, round, threshold and bucket
    ///
    /// # Errors
    /// Returns `Validation`, `ModelUnavailable` or `InferenceFailure`. The
    /// model is never called when validation or loading fails.
    pub fn assess<I: ClinicalInput>(&self, input: I) -> Result<ScoreResult<I>> {
        tracing::debug!("Step 1: Validating input...");
        ClinicalInput::validate(&input).map_err(RiskError::validation)?;

        tracing::debug!("Step 2: Normalizing features...");
        let features = input.normalize();

        tracing::debug!("Step 3: Loading model...");
        let model = self.load_checked::<I::Features>()?;

        tracing::debug!("Step 4: Scoring...");
        let result = self.scorer.score(&features, &*model, input)?;

        tracing::info!(
            "Assessment complete: probability={:.4}, zone={}, positive={}",
            result.probability,
            result.risk_zone,
            result.screening_prediction
        );

        Ok(result)
    }

    /// Assess each input independently; one failure does not stop the rest.
    pub fn assess_batch<I: ClinicalInput>(&self, inputs: Vec<I>) -> Vec<Result<ScoreResult<I>>> {
        let total = inputs.len();
        let results: Vec<_> = inputs.into_iter().map(|input| self.assess(input)).collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!("Batch finished with {failed} of {total} assessments failing");
        } else {
            tracing::info!("Batch finished: {total} assessments");
        }
        results
    }
}
