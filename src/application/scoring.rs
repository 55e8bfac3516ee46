//! Risk scorer: predictor call, rounding, threshold decision, zone lookup.

use crate::config::ConfigError;
use crate::domain::{round_probability, ModelFeatures, ScoreResult, ZoneTable};
use crate::ports::{InferenceError, Predictor};

/// Stateless scorer at a fixed operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScorer {
    threshold: f64,
    zones: ZoneTable,
}

impl RiskScorer {
    /// # Errors
    /// Returns error unless `threshold` is finite and in [0, 1].
    pub fn new(threshold: f64, zones: ZoneTable) -> Result<Self, ConfigError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold, zones })
    }

    /// For values already checked by `PipelineConfig`.
    pub(crate) fn from_checked(threshold: f64, zones: ZoneTable) -> Self {
        Self { threshold, zones }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    /// Score one feature vector, echoing `input` into the result.
    ///
    /// The probability is rounded to 4 decimals first; the threshold and the
    /// zone lookup both see the rounded value.
    ///
    /// # Errors
    /// Propagates the predictor's `InferenceError` unchanged.
    pub fn score<V, P, I>(
        &self,
        vector: &V,
        predictor: &P,
        input: I,
    ) -> Result<ScoreResult<I>, InferenceError>
    where
        V: ModelFeatures,
        P: Predictor + ?Sized,
    {
        let raw = predictor.predict_probability(&vector.to_vec())?;
        if !raw.is_finite() || !(0.0..=1.0).contains(&raw) {
            return Err(InferenceError::InvalidOutput(raw));
        }

        let probability = round_probability(raw);
        let screening_prediction = probability >= self.threshold;
        let risk_zone = self.zones.classify(probability);

        tracing::debug!(
            "Scored: raw={:.6}, rounded={:.4}, threshold={:.2}, zone={}",
            raw,
            probability,
            self.threshold,
            risk_zone
        );

        Ok(ScoreResult {
            probability,
            screening_prediction,
            risk_zone,
            threshold: self.threshold,
            input,
            assessed_at: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{normalize, sample_patient, RiskZone};
    use proptest::prelude::*;

    /// Always answers the same probability.
    struct Fixed(f64);

    impl Predictor for Fixed {
        fn feature_names(&self) -> &[String] {
            &[]
        }

        fn predict_probability(&self, _features: &[f64]) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl Predictor for Broken {
        fn feature_names(&self) -> &[String] {
            &[]
        }

        fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
            Err(InferenceError::ShapeMismatch {
                got: features.len(),
                expected: 11,
            })
        }
    }

    fn scorer(threshold: f64) -> RiskScorer {
        RiskScorer::new(threshold, ZoneTable::default()).expect("valid threshold")
    }

    #[test]
    fn test_low_probability_scenario() {
        let vector = normalize(&sample_patient());
        let result = scorer(0.35)
            .score(&vector, &Fixed(0.28), ())
            .expect("Should score");
        assert_eq!(result.risk_zone, RiskZone::Low);
        assert!(!result.screening_prediction);
        assert!((result.probability - 0.28).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let vector = normalize(&sample_patient());
        let result = scorer(0.35)
            .score(&vector, &Fixed(0.35), ())
            .expect("Should score");
        assert_eq!(result.risk_zone, RiskZone::Moderate);
        assert!(result.screening_prediction);
    }

    #[test]
    fn test_very_high_scenario() {
        let vector = normalize(&sample_patient());
        for threshold in [0.0, 0.30, 0.35, 0.72] {
            let result = scorer(threshold)
                .score(&vector, &Fixed(0.72), ())
                .expect("Should score");
            assert_eq!(result.risk_zone, RiskZone::VeryHigh);
            assert!(result.screening_prediction);
        }
    }

    #[test]
    fn test_rounds_before_deciding() {
        let vector = normalize(&sample_patient());
        let result = scorer(0.35)
            .score(&vector, &Fixed(0.349_96), ())
            .expect("Should score");
        assert!((result.probability - 0.35).abs() < 1e-12);
        assert!(result.screening_prediction);
        assert_eq!(result.risk_zone, RiskZone::Moderate);
    }

    #[test]
    fn test_value_just_below_tie_stays_negative() {
        let vector = normalize(&sample_patient());
        let result = scorer(0.35)
            .score(&vector, &Fixed(0.349_95), ())
            .expect("Should score");
        assert_eq!(result.probability, 0.3499);
        assert!(!result.screening_prediction);
        assert_eq!(result.risk_zone, RiskZone::Low);
    }

    #[test]
    fn test_predictor_failure_propagates() {
        let vector = normalize(&sample_patient());
        let err = scorer(0.35)
            .score(&vector, &Broken, ())
            .expect_err("Should fail");
        assert!(matches!(
            err,
            InferenceError::ShapeMismatch {
                got: 12,
                expected: 11
            }
        ));
    }

    #[test]
    fn test_out_of_range_output_is_rejected() {
        let vector = normalize(&sample_patient());
        for bad in [1.2, -0.1, f64::NAN] {
            let err = scorer(0.35)
                .score(&vector, &Fixed(bad), ())
                .expect_err("Should reject");
            assert!(matches!(err, InferenceError::InvalidOutput(_)));
        }
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(RiskScorer::new(-0.1, ZoneTable::default()).is_err());
        assert!(RiskScorer::new(f64::INFINITY, ZoneTable::default()).is_err());
    }

    proptest! {
        #[test]
        fn zone_ignores_threshold(p in 0.0f64..=1.0, t1 in 0.0f64..=1.0, t2 in 0.0f64..=1.0) {
            let vector = normalize(&sample_patient());
            let a = scorer(t1).score(&vector, &Fixed(p), ()).expect("score");
            let b = scorer(t2).score(&vector, &Fixed(p), ()).expect("score");
            prop_assert_eq!(a.risk_zone, b.risk_zone);
            prop_assert_eq!(a.probability, b.probability);
            prop_assert_eq!(a.screening_prediction, a.probability >= t1);
            prop_assert_eq!(b.screening_prediction, b.probability >= t2);
        }
    }
}
