//! Screening result types.
//!
//! Represents the output of a scored assessment: a rounded probability, the
//! thresholded screening decision and the ordinal risk zone.

use serde::{Deserialize, Serialize};

/// Decimal places kept on a reported probability.
pub const PROBABILITY_DECIMALS: usize = 4;

/// Ordinal risk label derived from probability alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskZone {
    #[serde(rename = "Very Low Risk")]
    VeryLow,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Very High Risk")]
    VeryHigh,
}

impl RiskZone {
    /// All zones, lowest first.
    pub const ALL: [RiskZone; 5] = [
        Self::VeryLow,
        Self::Low,
        Self::Moderate,
        Self::High,
        Self::VeryHigh,
    ];

    /// Display label as shown to clinicians.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low Risk",
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
            Self::VeryHigh => "Very High Risk",
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::VeryLow => "No significant indicators",
            Self::Low => "Minor indicators, routine monitoring",
            Self::Moderate => "Follow-up recommended",
            Self::High => "Clinical evaluation recommended",
            Self::VeryHigh => "Prompt cardiology consultation advised",
        }
    }
}

impl std::fmt::Display for RiskZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Inner bin edges separating the five risk zones.
///
/// Bins are `[0, e0)`, `[e0, e1)`, `[e1, e2)`, `[e2, e3)`, `[e3, 1]`: a value
/// sitting on an edge belongs to the upper zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct ZoneTable {
    edges: [f64; 4],
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            edges: [0.20, 0.35, 0.50, 0.70],
        }
    }
}

impl ZoneTable {
    /// Build a table from four inner edges.
    ///
    /// # Errors
    /// Returns error unless the edges are finite, strictly increasing and
    /// strictly inside (0, 1).
    pub fn new(edges: [f64; 4]) -> Result<Self, String> {
        if edges.iter().any(|e| !e.is_finite() || *e <= 0.0 || *e >= 1.0) {
            return Err(format!("Zone edges {edges:?} must lie strictly inside (0, 1)"));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(format!("Zone edges {edges:?} must be strictly increasing"));
        }
        Ok(Self { edges })
    }

    #[must_use]
    pub fn edges(&self) -> [f64; 4] {
        self.edges
    }

    /// Bucket a probability. Total: values below 0 fall in the lowest zone,
    /// values above 1 in the highest.
    #[must_use]
    pub fn classify(&self, probability: f64) -> RiskZone {
        let idx = self.edges.iter().filter(|&&e| probability >= e).count();
        RiskZone::ALL[idx]
    }

    /// Probability range `[lower, upper)` covered by a zone.
    #[must_use]
    pub fn range(&self, zone: RiskZone) -> (f64, f64) {
        let idx = RiskZone::ALL.iter().position(|z| *z == zone).unwrap_or(0);
        let lower = if idx == 0 { 0.0 } else { self.edges[idx - 1] };
        let upper = if idx == 4 { 1.0 } else { self.edges[idx] };
        (lower, upper)
    }
}

impl TryFrom<[f64; 4]> for ZoneTable {
    type Error = String;

    fn try_from(edges: [f64; 4]) -> Result<Self, String> {
        Self::new(edges)
    }
}

impl From<ZoneTable> for [f64; 4] {
    fn from(table: ZoneTable) -> Self {
        table.edges
    }
}

/// Round to `PROBABILITY_DECIMALS` places from the exact binary value.
///
/// Float formatting is correctly rounded, so 0.34995 (stored just below the
/// tie) gives 0.3499.
#[must_use]
pub fn round_probability(p: f64) -> f64 {
    format!("{:.*}", PROBABILITY_DECIMALS, p).parse().unwrap_or(p)
}

/// Outcome of one scored assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult<I> {
    /// Model probability, rounded to 4 decimal places
    pub probability: f64,

    /// `probability >= threshold`
    pub screening_prediction: bool,

    pub risk_zone: RiskZone,

    /// Operating threshold this result was decided at
    pub threshold: f64,

    /// Echo of the submitted input
    pub input: I,

    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

impl<I> ScoreResult<I> {
    /// Probability as a percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.probability * 100.0
    }

    /// Follow-up advice for the screening outcome.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        if self.screening_prediction {
            "POSITIVE SCREENING: further cardiac evaluation advised, consult a cardiologist"
        } else {
            "NEGATIVE SCREENING: lower risk, continue regular health monitoring"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zone_boundaries() {
        let table = ZoneTable::default();
        assert_eq!(table.classify(0.0), RiskZone::VeryLow);
        assert_eq!(table.classify(0.1999), RiskZone::VeryLow);
        assert_eq!(table.classify(0.20), RiskZone::Low);
        assert_eq!(table.classify(0.34999), RiskZone::Low);
        assert_eq!(table.classify(0.35), RiskZone::Moderate);
        assert_eq!(table.classify(0.50), RiskZone::High);
        assert_eq!(table.classify(0.6999), RiskZone::High);
        assert_eq!(table.classify(0.70), RiskZone::VeryHigh);
        assert_eq!(table.classify(1.0), RiskZone::VeryHigh);
    }

    #[test]
    fn test_zone_table_validation() {
        assert!(ZoneTable::new([0.1, 0.3, 0.6, 0.9]).is_ok());
        assert!(ZoneTable::new([0.3, 0.2, 0.5, 0.7]).is_err());
        assert!(ZoneTable::new([0.0, 0.2, 0.5, 0.7]).is_err());
        assert!(ZoneTable::new([0.2, 0.35, 0.5, f64::NAN]).is_err());
        assert!(ZoneTable::new([0.2, 0.2, 0.5, 0.7]).is_err());
    }

    #[test]
    fn test_zone_range() {
        let table = ZoneTable::default();
        assert_eq!(table.range(RiskZone::VeryLow), (0.0, 0.20));
        assert_eq!(table.range(RiskZone::Moderate), (0.35, 0.50));
        assert_eq!(table.range(RiskZone::VeryHigh), (0.70, 1.0));
    }

    #[test]
    fn test_rounding() {
        assert!((round_probability(0.123_44) - 0.1234).abs() < 1e-12);
        assert!((round_probability(0.349_96) - 0.35).abs() < 1e-12);
        assert!((round_probability(0.999_96) - 1.0).abs() < 1e-12);
        assert!(round_probability(0.000_04).abs() < 1e-12);
    }

    #[test]
    fn test_rounding_uses_exact_value_below_a_tie() {
        // Each literal is stored just under its 5th-decimal tie.
        assert_eq!(round_probability(0.349_95), 0.3499);
        assert_eq!(round_probability(0.199_95), 0.1999);
        assert_eq!(round_probability(0.699_95), 0.6999);

        let table = ZoneTable::default();
        assert_eq!(table.classify(round_probability(0.349_95)), RiskZone::Low);
        assert_eq!(table.classify(round_probability(0.199_95)), RiskZone::VeryLow);
        assert_eq!(table.classify(round_probability(0.699_95)), RiskZone::High);
    }

    #[test]
    fn test_zone_table_deserialize_is_validated() {
        let table: ZoneTable = serde_json::from_str("[0.1, 0.3, 0.6, 0.9]").expect("valid edges");
        assert_eq!(table.edges(), [0.1, 0.3, 0.6, 0.9]);
        assert!(serde_json::from_str::<ZoneTable>("[0.3, 0.2, 0.5, 0.7]").is_err());
        assert!(serde_json::from_str::<ZoneTable>("[0.2, 0.35, 0.5, 1.5]").is_err());

        let json = serde_json::to_string(&ZoneTable::default()).expect("serialize");
        assert_eq!(json, "[0.2,0.35,0.5,0.7]");
    }

    #[test]
    fn test_rounding_can_cross_an_edge() {
        let table = ZoneTable::default();
        assert_eq!(table.classify(0.199_97), RiskZone::VeryLow);
        assert_eq!(table.classify(round_probability(0.199_97)), RiskZone::Low);
    }

    #[test]
    fn test_labels_serialize_as_display_text() {
        let json = serde_json::to_string(&RiskZone::VeryHigh).expect("serialize");
        assert_eq!(json, "\"Very High Risk\"");
        assert_eq!(RiskZone::Moderate.to_string(), "Moderate Risk");
    }

    proptest! {
        #[test]
        fn classify_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let table = ZoneTable::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.classify(lo) <= table.classify(hi));
        }

        #[test]
        fn classified_value_lies_in_zone_range(p in 0.0f64..=1.0) {
            let table = ZoneTable::default();
            let zone = table.classify(p);
            let (lower, upper) = table.range(zone);
            prop_assert!(p >= lower);
            prop_assert!(p < upper || (zone == RiskZone::VeryHigh && p <= upper));
        }

        #[test]
        fn rounding_stays_in_unit_interval(p in 0.0f64..=1.0) {
            let r = round_probability(p);
            prop_assert!((0.0..=1.0).contains(&r));
            prop_assert!((r - p).abs() <= 0.5e-4 + 1e-12);
        }
    }
}
