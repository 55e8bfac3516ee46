//! Domain layer: Core screening types and logic.
//!
//! Pure Rust types with no I/O. Normalization and bucketing are total
//! functions; every fallible step lives behind the ports.

mod assessment;
mod features;
mod heart_attack;
mod patient;

pub use assessment::{round_probability, RiskZone, ScoreResult, ZoneTable, PROBABILITY_DECIMALS};
pub use features::{normalize, ClinicalInput, ModelFeatures, NormalizedFeatureVector, FEATURE_NAMES};
pub use heart_attack::{
    ChestPainType, HeartAttackFeatures, HeartAttackInput, RestingEcg, StSlope,
    HEART_ATTACK_FEATURE_NAMES,
};
pub use patient::{Gender, Level, PatientInput};

#[cfg(test)]
pub(crate) use heart_attack::sample_heart_attack;
#[cfg(test)]
pub(crate) use patient::sample_patient;
