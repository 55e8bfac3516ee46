//! Patient input for cardiac failure screening.
//!
//! Field domains mirror the collection forms the screening tools present.
//! Validation is the collector's job: `normalize` trusts what it is given.

use serde::{Deserialize, Serialize};

/// Biological sex as encoded by the training data (1 = female, 2 = male).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Dataset code: Female = 1, Male = 2.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Female => 1,
            Self::Male => 2,
        }
    }

    /// Parse a dataset code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Female),
            2 => Some(Self::Male),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
        }
    }
}

/// Ordinal lab level shared by cholesterol and glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl Level {
    /// Dataset code: 1, 2 or 3.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::AboveNormal => 2,
            Self::WellAboveNormal => 3,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::AboveNormal),
            3 => Some(Self::WellAboveNormal),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::AboveNormal => write!(f, "Above Normal"),
            Self::WellAboveNormal => write!(f, "Well Above Normal"),
        }
    }
}

/// Raw clinical values from a single form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Age in years, [1, 120]
    pub age: u32,

    pub gender: Gender,

    /// Height in centimeters, [100, 250]
    pub height: f64,

    /// Weight in kilograms, [30, 300]
    pub weight: f64,

    /// Systolic blood pressure in mmHg (ap_hi), [80, 250]
    pub systolic_bp: i32,

    /// Diastolic blood pressure in mmHg (ap_lo), [40, 150]
    pub diastolic_bp: i32,

    pub cholesterol: Level,

    pub glucose: Level,

    pub smoker: bool,

    pub alcohol_user: bool,

    pub physically_active: bool,
}

impl PatientInput {
    /// Check every field against its collection domain.
    ///
    /// # Errors
    /// Returns all out-of-domain messages at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(1..=120).contains(&self.age) {
            errors.push(format!("Age {} out of range [1, 120]", self.age));
        }
        if !self.height.is_finite() || !(100.0..=250.0).contains(&self.height) {
            errors.push(format!("Height {} out of range [100, 250]", self.height));
        }
        if !self.weight.is_finite() || !(30.0..=300.0).contains(&self.weight) {
            errors.push(format!("Weight {} out of range [30, 300]", self.weight));
        }
        if !(80..=250).contains(&self.systolic_bp) {
            errors.push(format!(
                "Systolic BP {} out of range [80, 250]",
                self.systolic_bp
            ));
        }
        if !(40..=150).contains(&self.diastolic_bp) {
            errors.push(format!(
                "Diastolic BP {} out of range [40, 150]",
                self.diastolic_bp
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Body mass index from height and weight.
    #[must_use]
    pub fn bmi(&self) -> f64 {
        let meters = self.height / 100.0;
        self.weight / (meters * meters)
    }

    /// WHO adult BMI band.
    #[must_use]
    pub fn bmi_category(&self) -> &'static str {
        match self.bmi() {
            b if b < 18.5 => "Underweight",
            b if b < 25.0 => "Normal",
            b if b < 30.0 => "Overweight",
            _ => "Obese",
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_patient() -> PatientInput {
    PatientInput {
        age: 55,
        gender: Gender::Female,
        height: 165.0,
        weight: 65.0,
        systolic_bp: 120,
        diastolic_bp: 80,
        cholesterol: Level::Normal,
        glucose: Level::Normal,
        smoker: false,
        alcohol_user: false,
        physically_active: true,
    }
}
