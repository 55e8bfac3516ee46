//! Feature normalization for the cardiac failure model.
//!
//! The model was trained on a rescaled age, a 0/1 gender code, a 0..1
//! cholesterol scale and a derived BMI column. Everything else passes through.

use serde::{Deserialize, Serialize};

use super::patient::PatientInput;

/// A fixed-order numeric vector consumed by a predictor.
pub trait ModelFeatures {
    /// Column names in the order `to_vec` emits them.
    fn feature_names() -> &'static [&'static str];

    /// Flatten into the model's wire shape.
    fn to_vec(&self) -> Vec<f64>;
}

/// Raw input that can be checked and turned into model features.
pub trait ClinicalInput {
    type Features: ModelFeatures;

    /// Check collection domains.
    ///
    /// # Errors
    /// Returns every field message that failed.
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Derive the feature vector. Total for validated input.
    fn normalize(&self) -> Self::Features;
}

/// Column order of the cardiac failure model (cardio dataset names).
pub const FEATURE_NAMES: [&str; 12] = [
    "age",
    "gender",
    "height",
    "weight",
    "bmi",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
];

/// Normalized features for the cardiac failure model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFeatureVector {
    /// age / 100
    pub age: f64,
    /// gender code - 1 (female 0, male 1)
    pub gender: f64,
    pub height: f64,
    pub weight: f64,
    /// Always recomputed from height and weight
    pub bmi: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    /// (cholesterol code - 1) / 2
    pub cholesterol: f64,
    /// glucose code, unscaled
    pub glucose: f64,
    pub smoker: f64,
    pub alcohol_user: f64,
    pub physically_active: f64,
}

/// Map a patient to the model's feature space.
///
/// No range clamping happens here; out-of-domain values propagate unchanged
/// if the caller skipped `PatientInput::validate`.
#[must_use]
pub fn normalize(input: &PatientInput) -> NormalizedFeatureVector {
    NormalizedFeatureVector {
        age: f64::from(input.age) / 100.0,
        gender: f64::from(input.gender.code()) - 1.0,
        height: input.height,
        weight: input.weight,
        bmi: input.bmi(),
        systolic_bp: f64::from(input.systolic_bp),
        diastolic_bp: f64::from(input.diastolic_bp),
        cholesterol: (f64::from(input.cholesterol.code()) - 1.0) / 2.0,
        glucose: f64::from(input.glucose.code()),
        smoker: flag(input.smoker),
        alcohol_user: flag(input.alcohol_user),
        physically_active: flag(input.physically_active),
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl NormalizedFeatureVector {
    /// Rebuild from the wire shape.
    ///
    /// # Errors
    /// Returns error if the slice does not hold exactly 12 values.
    pub fn from_vec(v: &[f64]) -> Result<Self, String> {
        if v.len() != FEATURE_NAMES.len() {
            return Err(format!(
                "Expected {} features, got {}",
                FEATURE_NAMES.len(),
                v.len()
            ));
        }

        Ok(Self {
            age: v[0],
            gender: v[1],
            height: v[2],
            weight: v[3],
            bmi: v[4],
            systolic_bp: v[5],
            diastolic_bp: v[6],
            cholesterol: v[7],
            glucose: v[8],
            smoker: v[9],
            alcohol_user: v[10],
            physically_active: v[11],
        })
    }
}

impl ModelFeatures for NormalizedFeatureVector {
    fn feature_names() -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    fn to_vec(&self) -> Vec<f64> {
        vec![
            self.age,
            self.gender,
            self.height,
            self.weight,
            self.bmi,
            self.systolic_bp,
            self.diastolic_bp,
            self.cholesterol,
            self.glucose,
            self.smoker,
            self.alcohol_user,
            self.physically_active,
        ]
    }
}

impl ClinicalInput for PatientInput {
    type Features = NormalizedFeatureVector;

    fn validate(&self) -> Result<(), Vec<String>> {
        PatientInput::validate(self)
    }

    fn normalize(&self) -> NormalizedFeatureVector {
        normalize(self)
    }
}
