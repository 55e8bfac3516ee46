//! Heart-attack screening input and its one-hot encoding.
//!
//! The heart-attack model was trained on a dummy-encoded table with the first
//! category of each column dropped, so ASY, LVH, Down and Female encode as
//! all zeros.

use serde::{Deserialize, Serialize};

use super::features::{ClinicalInput, ModelFeatures};
use super::patient::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChestPainType {
    /// Atypical angina
    Ata,
    /// Non-anginal pain
    Nap,
    /// Typical angina
    Ta,
    /// Asymptomatic
    Asy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestingEcg {
    Normal,
    #[serde(rename = "ST")]
    St,
    #[serde(rename = "LVH")]
    Lvh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StSlope {
    Up,
    Flat,
    Down,
}

/// Raw heart-attack screening values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartAttackInput {
    /// Age in years, [1, 120]
    pub age: u32,
    /// Resting blood pressure in mmHg, [80, 250]
    pub resting_bp: u32,
    /// Serum cholesterol in mg/dL, [100, 600]
    pub cholesterol: u32,
    /// Maximum heart rate achieved, [60, 220]
    pub max_hr: u32,
    /// ST depression induced by exercise, [0, 10]
    pub oldpeak: f64,
    pub sex: Gender,
    /// Fasting blood sugar > 120 mg/dL
    pub fasting_blood_sugar_high: bool,
    pub exercise_angina: bool,
    pub chest_pain: ChestPainType,
    pub resting_ecg: RestingEcg,
    pub st_slope: StSlope,
}

pub const HEART_ATTACK_FEATURE_NAMES: [&str; 15] = [
    "Age",
    "RestingBP",
    "Cholesterol",
    "MaxHR",
    "Oldpeak",
    "FastingBS",
    "Sex_M",
    "ChestPainType_ATA",
    "ChestPainType_NAP",
    "ChestPainType_TA",
    "RestingECG_Normal",
    "RestingECG_ST",
    "ExerciseAngina_Y",
    "ST_Slope_Flat",
    "ST_Slope_Up",
];

/// Encoded heart-attack features, in `HEART_ATTACK_FEATURE_NAMES` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartAttackFeatures(pub [f64; 15]);

fn one_hot(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

impl HeartAttackInput {
    /// # Errors
    /// Returns all out-of-domain messages at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(1..=120).contains(&self.age) {
            errors.push(format!("Age {} out of range [1, 120]", self.age));
        }
        if !(80..=250).contains(&self.resting_bp) {
            errors.push(format!(
                "Resting BP {} out of range [80, 250]",
                self.resting_bp
            ));
        }
        if !(100..=600).contains(&self.cholesterol) {
            errors.push(format!(
                "Cholesterol {} out of range [100, 600]",
                self.cholesterol
            ));
        }
        if !(60..=220).contains(&self.max_hr) {
            errors.push(format!("Max HR {} out of range [60, 220]", self.max_hr));
        }
        if !self.oldpeak.is_finite() || !(0.0..=10.0).contains(&self.oldpeak) {
            errors.push(format!("Oldpeak {} out of range [0, 10]", self.oldpeak));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    #[must_use]
    pub fn encode(&self) -> HeartAttackFeatures {
        HeartAttackFeatures([
            f64::from(self.age),
            f64::from(self.resting_bp),
            f64::from(self.cholesterol),
            f64::from(self.max_hr),
            self.oldpeak,
            one_hot(self.fasting_blood_sugar_high),
            one_hot(self.sex == Gender::Male),
            one_hot(self.chest_pain == ChestPainType::Ata),
            one_hot(self.chest_pain == ChestPainType::Nap),
            one_hot(self.chest_pain == ChestPainType::Ta),
            one_hot(self.resting_ecg == RestingEcg::Normal),
            one_hot(self.resting_ecg == RestingEcg::St),
            one_hot(self.exercise_angina),
            one_hot(self.st_slope == StSlope::Flat),
            one_hot(self.st_slope == StSlope::Up),
        ])
    }
}

impl ModelFeatures for HeartAttackFeatures {
    fn feature_names() -> &'static [&'static str] {
        &HEART_ATTACK_FEATURE_NAMES
    }

    fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl ClinicalInput for HeartAttackInput {
    type Features = HeartAttackFeatures;

    fn validate(&self) -> Result<(), Vec<String>> {
        HeartAttackInput::validate(self)
    }

    fn normalize(&self) -> HeartAttackFeatures {
        self.encode()
    }
}

#[cfg(test)]
pub(crate) fn sample_heart_attack() -> HeartAttackInput {
    HeartAttackInput {
        age: 55,
        resting_bp: 120,
        cholesterol: 250,
        max_hr: 150,
        oldpeak: 1.0,
        sex: Gender::Male,
        fasting_blood_sugar_high: false,
        exercise_angina: true,
        chest_pain: ChestPainType::Nap,
        resting_ecg: RestingEcg::St,
        st_slope: StSlope::Flat,
    }
}
