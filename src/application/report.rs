//! Plain-text rendering of a scored assessment.

use std::fmt::Write as _;

use crate::domain::{HeartAttackInput, PatientInput, ScoreResult};

/// Width of the text gauge, in columns.
pub const GAUGE_WIDTH: usize = 40;

/// Human-readable echo of the submitted values.
pub trait InputSummary {
    fn summary(&self) -> Vec<(&'static str, String)>;
}

fn yes_no(b: bool) -> String {
    String::from(if b { "Yes" } else { "No" })
}

impl InputSummary for PatientInput {
    fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Age", format!("{} years", self.age)),
            ("Gender", self.gender.to_string()),
            (
                "BMI",
                format!("{:.1} ({})", self.bmi(), self.bmi_category()),
            ),
            (
                "Blood Pressure",
                format!("{}/{} mmHg", self.systolic_bp, self.diastolic_bp),
            ),
            ("Cholesterol", self.cholesterol.to_string()),
            ("Glucose", self.glucose.to_string()),
            ("Smoker", yes_no(self.smoker)),
            ("Alcohol", yes_no(self.alcohol_user)),
            ("Physical Activity", yes_no(self.physically_active)),
        ]
    }
}

impl InputSummary for HeartAttackInput {
    fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Age", format!("{} years", self.age)),
            ("Sex", self.sex.to_string()),
            ("Resting BP", format!("{} mmHg", self.resting_bp)),
            ("Cholesterol", format!("{} mg/dL", self.cholesterol)),
            ("Max Heart Rate", self.max_hr.to_string()),
            ("Oldpeak", format!("{:.1}", self.oldpeak)),
            ("Fasting BS > 120", yes_no(self.fasting_blood_sugar_high)),
            ("Exercise Angina", yes_no(self.exercise_angina)),
            ("Chest Pain Type", format!("{:?}", self.chest_pain).to_uppercase()),
            ("Resting ECG", format!("{:?}", self.resting_ecg)),
            ("ST Slope", format!("{:?}", self.st_slope)),
        ]
    }
}

/// A bar filled up to `probability` with `|` at the threshold.
#[must_use]
pub fn gauge(probability: f64, threshold: f64) -> String {
    let cells = |v: f64| ((v.clamp(0.0, 1.0) * GAUGE_WIDTH as f64).round() as usize).min(GAUGE_WIDTH);
    let filled = cells(probability);
    let marker = cells(threshold).min(GAUGE_WIDTH - 1);

    let bar: String = (0..GAUGE_WIDTH)
        .map(|i| {
            if i == marker {
                '|'
            } else if i < filled {
                '#'
            } else {
                '.'
            }
        })
        .collect();
    format!("[{bar}]")
}

/// Full text report for one result.
#[must_use]
pub fn render<I: InputSummary>(title: &str, result: &ScoreResult<I>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
    let _ = writeln!(out, "Risk Probability: {:.2}%", result.percentage());
    let _ = writeln!(
        out,
        "{} threshold {:.0}%",
        gauge(result.probability, result.threshold),
        result.threshold * 100.0
    );
    let _ = writeln!(
        out,
        "Risk Zone: {} ({})",
        result.risk_zone,
        result.risk_zone.description()
    );
    let _ = writeln!(out, "{}", result.recommendation());
    let _ = writeln!(out);
    let _ = writeln!(out, "Patient Summary");
    for (label, value) in result.input.summary() {
        let _ = writeln!(out, "  {label:<18} {value}");
    }
    out
}
